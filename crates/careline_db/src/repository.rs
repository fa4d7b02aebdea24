//! Repository construction
//!
//! The backend builds its repositories through [`RepositoryFactory`] so tests
//! and production share one wiring path.

use crate::repositories::{SqlAppointmentRepository, SqlPatientRepository, SqlUserRepository};
use crate::DbClient;

/// Creates a repository of type `R` from a client of type `C`.
pub trait RepositoryFactory<R, C> {
    fn create_repository(&self, client: C) -> R;
}

/// Builds the SQL repositories over a shared [`DbClient`].
#[derive(Debug, Clone, Default)]
pub struct SqlRepositoryFactory;

impl SqlRepositoryFactory {
    pub fn new() -> Self {
        Self
    }
}

impl RepositoryFactory<SqlUserRepository, DbClient> for SqlRepositoryFactory {
    fn create_repository(&self, client: DbClient) -> SqlUserRepository {
        SqlUserRepository::new(client)
    }
}

impl RepositoryFactory<SqlPatientRepository, DbClient> for SqlRepositoryFactory {
    fn create_repository(&self, client: DbClient) -> SqlPatientRepository {
        SqlPatientRepository::new(client)
    }
}

impl RepositoryFactory<SqlAppointmentRepository, DbClient> for SqlRepositoryFactory {
    fn create_repository(&self, client: DbClient) -> SqlAppointmentRepository {
        SqlAppointmentRepository::new(client)
    }
}
