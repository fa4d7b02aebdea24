//! SQL implementation of the appointment repository

use crate::error::DbError;
use crate::repositories::appointment::{Appointment, AppointmentRepository, NewAppointment};
use crate::DbClient;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error, info};

#[derive(Debug, Clone)]
pub struct SqlAppointmentRepository {
    db_client: DbClient,
}

impl SqlAppointmentRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

// RFC 3339 in UTC, e.g. 2024-01-01T10:00:00Z
fn encode_date_time(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn appointment_from_row(row: &AnyRow) -> Result<Appointment, DbError> {
    let raw: String = row.try_get("date_time")?;
    let date_time = DateTime::parse_from_rfc3339(&raw)
        .map_err(|e| DbError::DecodeError(format!("date_time {:?}: {}", raw, e)))?
        .with_timezone(&Utc);

    Ok(Appointment {
        id: row.try_get("id")?,
        patient_id: row.try_get("patient_id")?,
        date_time,
        description: row.try_get("description")?,
    })
}

#[async_trait]
impl AppointmentRepository for SqlAppointmentRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing appointment schema");

        let query = r#"
            CREATE TABLE IF NOT EXISTS appointments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                patient_id INTEGER NOT NULL REFERENCES patients(id),
                date_time TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT ''
            )
        "#;
        self.db_client.execute(query).await?;

        info!("Appointment schema initialized successfully");
        Ok(())
    }

    async fn create(&self, appointment: NewAppointment) -> Result<Appointment, DbError> {
        debug!("Creating appointment for patient {}", appointment.patient_id);

        let query = r#"
            INSERT INTO appointments (patient_id, date_time, description)
            VALUES ($1, $2, $3)
            RETURNING id, patient_id, date_time, description
        "#;

        let row = sqlx::query(query)
            .bind(appointment.patient_id)
            .bind(encode_date_time(&appointment.date_time))
            .bind(&appointment.description)
            .fetch_one(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to insert appointment: {}", e);
                DbError::from_write(e)
            })?;

        appointment_from_row(&row)
    }

    async fn find(&self, id: i64) -> Result<Option<Appointment>, DbError> {
        debug!("Finding appointment {}", id);

        let query = r#"
            SELECT id, patient_id, date_time, description
            FROM appointments
            WHERE id = $1
        "#;

        let result = sqlx::query(query)
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to find appointment: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        result.as_ref().map(appointment_from_row).transpose()
    }
}
