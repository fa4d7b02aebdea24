//! Repository for patients

use crate::error::DbError;
use async_trait::async_trait;

pub use careline_common::models::{NewPatient, Patient, PatientUpdate};

#[async_trait]
pub trait PatientRepository: Send + Sync {
    /// Create the `patients` table if it doesn't exist.
    async fn init_schema(&self) -> Result<(), DbError>;

    async fn create(&self, patient: NewPatient) -> Result<Patient, DbError>;

    async fn find(&self, id: i64) -> Result<Option<Patient>, DbError>;

    /// All patients ordered by id.
    async fn list(&self) -> Result<Vec<Patient>, DbError>;

    /// Apply the supplied fields. Returns `None` if no patient has this id.
    async fn update(&self, id: i64, update: PatientUpdate) -> Result<Option<Patient>, DbError>;
}
