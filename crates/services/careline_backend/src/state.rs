// --- File: crates/services/careline_backend/src/state.rs ---
use std::sync::Arc;
use std::time::Duration;

use careline_common::models::UserProfile;
use careline_common::{config_error, ClinicError};
use careline_config::{AppConfig, DEFAULT_BCRYPT_COST};
use careline_db::{
    AppointmentRepository, DbClient, DbError, PatientRepository, RepositoryFactory,
    SqlAppointmentRepository, SqlPatientRepository, SqlRepositoryFactory, SqlUserRepository,
    UserRepository,
};
use tracing::info;

use crate::auth::{JwtTokenService, TokenService};
use crate::cache::{InMemoryCache, KeyValueCache};

/// Application state shared across all routes.
///
/// Every collaborator sits behind a narrow trait so tests can swap it.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepository>,
    pub patients: Arc<dyn PatientRepository>,
    pub appointments: Arc<dyn AppointmentRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub user_cache: Arc<dyn KeyValueCache<UserProfile>>,
    /// Present when the repositories are SQL-backed; used by `/health`.
    pub db: Option<DbClient>,
    pub bcrypt_cost: u32,
}

impl AppState {
    /// Connect to the configured database and wire the SQL repositories.
    pub async fn from_config(config: Arc<AppConfig>) -> Result<Self, ClinicError> {
        let db = DbClient::new(&config).await?;
        let state = AppStateBuilder::new(config).with_db(db).build()?;
        state.init_schema().await?;
        Ok(state)
    }

    /// Create the tables if needed. Patients go before appointments (foreign key).
    pub async fn init_schema(&self) -> Result<(), DbError> {
        self.users.init_schema().await?;
        self.patients.init_schema().await?;
        self.appointments.init_schema().await?;
        info!("Database schema ready");
        Ok(())
    }
}

/// Builder for [`AppState`].
///
/// `with_db` wires all three SQL repositories; the individual setters
/// override single collaborators afterwards.
pub struct AppStateBuilder {
    config: Arc<AppConfig>,
    db: Option<DbClient>,
    users: Option<Arc<dyn UserRepository>>,
    patients: Option<Arc<dyn PatientRepository>>,
    appointments: Option<Arc<dyn AppointmentRepository>>,
    tokens: Option<Arc<dyn TokenService>>,
    user_cache: Option<Arc<dyn KeyValueCache<UserProfile>>>,
}

impl AppStateBuilder {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            db: None,
            users: None,
            patients: None,
            appointments: None,
            tokens: None,
            user_cache: None,
        }
    }

    pub fn with_db(mut self, db: DbClient) -> Self {
        let factory = SqlRepositoryFactory::new();
        let users: SqlUserRepository = factory.create_repository(db.clone());
        let patients: SqlPatientRepository = factory.create_repository(db.clone());
        let appointments: SqlAppointmentRepository = factory.create_repository(db.clone());
        self.users = Some(Arc::new(users));
        self.patients = Some(Arc::new(patients));
        self.appointments = Some(Arc::new(appointments));
        self.db = Some(db);
        self
    }

    pub fn with_users(mut self, users: Arc<dyn UserRepository>) -> Self {
        self.users = Some(users);
        self
    }

    pub fn with_patients(mut self, patients: Arc<dyn PatientRepository>) -> Self {
        self.patients = Some(patients);
        self
    }

    pub fn with_appointments(mut self, appointments: Arc<dyn AppointmentRepository>) -> Self {
        self.appointments = Some(appointments);
        self
    }

    pub fn with_token_service(mut self, tokens: Arc<dyn TokenService>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn with_user_cache(mut self, cache: Arc<dyn KeyValueCache<UserProfile>>) -> Self {
        self.user_cache = Some(cache);
        self
    }

    /// Fails if a repository is missing, or if no token service was given and
    /// `auth.jwt_secret` is not configured.
    pub fn build(self) -> Result<AppState, ClinicError> {
        let tokens = match self.tokens {
            Some(tokens) => tokens,
            None => {
                let auth = self
                    .config
                    .auth
                    .as_ref()
                    .ok_or_else(|| config_error("auth section is missing"))?;
                Arc::new(JwtTokenService::from_config(auth)?) as Arc<dyn TokenService>
            }
        };

        let user_cache = self.user_cache.unwrap_or_else(|| {
            Arc::new(InMemoryCache::new(Duration::from_secs(
                self.config.cache.user_ttl_seconds(),
            )))
        });

        let bcrypt_cost = self
            .config
            .auth
            .as_ref()
            .map(|auth| auth.bcrypt_cost())
            .unwrap_or(DEFAULT_BCRYPT_COST);

        Ok(AppState {
            users: self
                .users
                .ok_or_else(|| config_error("user repository is not configured"))?,
            patients: self
                .patients
                .ok_or_else(|| config_error("patient repository is not configured"))?,
            appointments: self
                .appointments
                .ok_or_else(|| config_error("appointment repository is not configured"))?,
            tokens,
            user_cache,
            db: self.db,
            bcrypt_cost,
            config: self.config,
        })
    }
}
