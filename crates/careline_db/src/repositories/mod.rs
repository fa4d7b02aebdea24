//! Repositories for the clinic records
//!
//! Each record has an async trait (what the backend depends on) and a SQL
//! implementation over [`DbClient`](crate::DbClient).

pub mod appointment;
pub mod appointment_sql;
pub mod patient;
pub mod patient_sql;
pub mod user;
pub mod user_sql;

pub use appointment::AppointmentRepository;
pub use appointment_sql::SqlAppointmentRepository;
pub use patient::PatientRepository;
pub use patient_sql::SqlPatientRepository;
pub use user::UserRepository;
pub use user_sql::SqlUserRepository;
