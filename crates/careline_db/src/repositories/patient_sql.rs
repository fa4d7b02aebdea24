//! SQL implementation of the patient repository

use crate::error::DbError;
use crate::repositories::patient::{NewPatient, Patient, PatientRepository, PatientUpdate};
use crate::DbClient;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error, info};

/// Dates are stored as `YYYY-MM-DD` text.
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone)]
pub struct SqlPatientRepository {
    db_client: DbClient,
}

impl SqlPatientRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

fn patient_from_row(row: &AnyRow) -> Result<Patient, DbError> {
    let raw_date: String = row.try_get("date_of_birth")?;
    let date_of_birth = NaiveDate::parse_from_str(&raw_date, DATE_FORMAT)
        .map_err(|e| DbError::DecodeError(format!("date_of_birth {:?}: {}", raw_date, e)))?;

    Ok(Patient {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        date_of_birth,
    })
}

#[async_trait]
impl PatientRepository for SqlPatientRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing patient schema");

        let query = r#"
            CREATE TABLE IF NOT EXISTS patients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                date_of_birth TEXT NOT NULL
            )
        "#;
        self.db_client.execute(query).await?;

        info!("Patient schema initialized successfully");
        Ok(())
    }

    async fn create(&self, patient: NewPatient) -> Result<Patient, DbError> {
        debug!("Creating patient");

        let query = r#"
            INSERT INTO patients (name, date_of_birth)
            VALUES ($1, $2)
            RETURNING id, name, date_of_birth
        "#;

        let row = sqlx::query(query)
            .bind(&patient.name)
            .bind(patient.date_of_birth.format(DATE_FORMAT).to_string())
            .fetch_one(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to insert patient: {}", e);
                DbError::from_write(e)
            })?;

        patient_from_row(&row)
    }

    async fn find(&self, id: i64) -> Result<Option<Patient>, DbError> {
        debug!("Finding patient {}", id);

        let query = r#"
            SELECT id, name, date_of_birth
            FROM patients
            WHERE id = $1
        "#;

        let result = sqlx::query(query)
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to find patient: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        result.as_ref().map(patient_from_row).transpose()
    }

    async fn list(&self) -> Result<Vec<Patient>, DbError> {
        let query = r#"
            SELECT id, name, date_of_birth
            FROM patients
            ORDER BY id
        "#;

        let rows = sqlx::query(query)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to list patients: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        rows.iter().map(patient_from_row).collect()
    }

    async fn update(&self, id: i64, update: PatientUpdate) -> Result<Option<Patient>, DbError> {
        debug!("Updating patient {}", id);

        let Some(current) = self.find(id).await? else {
            return Ok(None);
        };
        if update.is_empty() {
            return Ok(Some(current));
        }

        let name = update.name.unwrap_or(current.name);
        let date_of_birth = update.date_of_birth.unwrap_or(current.date_of_birth);

        let query = r#"
            UPDATE patients
            SET name = $1, date_of_birth = $2
            WHERE id = $3
            RETURNING id, name, date_of_birth
        "#;

        let row = sqlx::query(query)
            .bind(&name)
            .bind(date_of_birth.format(DATE_FORMAT).to_string())
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to update patient: {}", e);
                DbError::from_write(e)
            })?;

        row.as_ref().map(patient_from_row).transpose()
    }
}
