//! Relational persistence for Careline
//!
//! [`DbClient`] wraps a `sqlx` `Any` pool (SQLite by default). Users, patients
//! and appointments each have an async repository trait and a SQL
//! implementation.
//!
//! # Example
//!
//! ```rust,no_run
//! use careline_db::{DbClient, PatientRepository, SqlPatientRepository};
//!
//! async fn setup() -> Result<(), careline_db::DbError> {
//!     let client = DbClient::from_url("sqlite::memory:").await?;
//!     let patients = SqlPatientRepository::new(client);
//!     patients.init_schema().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod repositories;
pub mod repository;

pub use client::DbClient;
pub use error::DbError;
pub use repository::{RepositoryFactory, SqlRepositoryFactory};

pub use repositories::{
    AppointmentRepository, PatientRepository, SqlAppointmentRepository, SqlPatientRepository,
    SqlUserRepository, UserRepository,
};
