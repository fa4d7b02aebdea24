//! Repository for appointments

use crate::error::DbError;
use async_trait::async_trait;

pub use careline_common::models::{Appointment, NewAppointment};

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Create the `appointments` table if it doesn't exist.
    ///
    /// The table references `patients`, so that schema has to exist first.
    async fn init_schema(&self) -> Result<(), DbError>;

    /// Insert an appointment. The caller checks that the patient exists.
    async fn create(&self, appointment: NewAppointment) -> Result<Appointment, DbError>;

    async fn find(&self, id: i64) -> Result<Option<Appointment>, DbError>;
}
