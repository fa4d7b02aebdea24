// --- File: crates/services/careline_backend/src/handlers.rs ---
use axum::{extract::State, http::StatusCode, response::Json, Extension};
use careline_common::models::{
    Appointment, NewAppointment, NewPatient, NewUser, Patient, PatientUpdate, UserProfile,
};
use careline_common::{
    already_exists, not_found, validation_error, ApiJson, ApiPath, ClinicError,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::auth::{hash_password, verify_login, Claims};
use crate::error::AuthError;
use crate::state::AppState;

// --- Request / response bodies ---

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserProfile,
}

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the token expires.
    pub expires_in: i64,
}

/// Body of `POST /patients`. Dates are `YYYY-MM-DD`.
#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreatePatientRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub date_of_birth: String,
}

/// Body of `PUT /patients/{id}`; absent fields are left unchanged.
#[derive(Deserialize, Debug, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdatePatientRequest {
    pub name: Option<String>,
    pub date_of_birth: Option<String>,
}

/// Body of `POST /appointments`. `date_time` is RFC 3339.
#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateAppointmentRequest {
    pub patient_id: i64,
    #[serde(default)]
    pub date_time: String,
    #[serde(default)]
    pub description: String,
}

fn parse_date_of_birth(raw: &str) -> Result<NaiveDate, ClinicError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| validation_error("date_of_birth must be a date in YYYY-MM-DD format"))
}

fn parse_date_time(raw: &str) -> Result<DateTime<Utc>, ClinicError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| validation_error("date_time must be an RFC 3339 timestamp"))
}

fn require_name(name: &str) -> Result<String, ClinicError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(validation_error("name is required"));
    }
    Ok(name.to_string())
}

// --- Accounts ---

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/register",
    request_body = Credentials,
    responses(
        (status = 201, description = "User created", body = RegisterResponse),
        (status = 400, description = "Missing fields or username already exists")
    ),
    tag = "Accounts"
))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> Result<(StatusCode, Json<RegisterResponse>), ClinicError> {
    let username = credentials.username.trim().to_string();
    if username.is_empty() || credentials.password.is_empty() {
        return Err(validation_error("username and password are required"));
    }

    if state.users.find_by_username(&username).await?.is_some() {
        return Err(already_exists("Username already exists"));
    }

    let password_hash = hash_password(credentials.password, state.bcrypt_cost).await?;
    let user = state
        .users
        .create(NewUser {
            username,
            password_hash,
        })
        .await
        .map_err(|e| match ClinicError::from(e) {
            // lost a race with a concurrent registration
            ClinicError::AlreadyExists(_) => already_exists("Username already exists"),
            other => other,
        })?;

    info!("Registered user {}", user.username);
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user: user.into(),
        }),
    ))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/login",
    request_body = Credentials,
    responses(
        (status = 200, description = "Access token", body = TokenResponse),
        (status = 401, description = "Invalid username or password")
    ),
    tag = "Accounts"
))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> Result<Json<TokenResponse>, ClinicError> {
    let username = credentials.username.trim();
    let user = state.users.find_by_username(username).await?;

    let stored_hash = user.as_ref().map(|user| user.password_hash.clone());
    if !verify_login(credentials.password, stored_hash, state.bcrypt_cost).await {
        debug!("Rejected login for {}", username);
        return Err(AuthError::InvalidCredentials.into());
    }
    let user = user.ok_or(AuthError::InvalidCredentials)?;

    let issued = state.tokens.issue(&user.username)?;
    Ok(Json(TokenResponse {
        access_token: issued.access_token,
        token_type: "Bearer".to_string(),
        expires_in: issued.expires_in,
    }))
}

/// Cached profile lookup.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/user/{username}",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "User profile", body = UserProfile),
        (status = 404, description = "User not found")
    ),
    security(("bearer" = [])),
    tag = "Accounts"
))]
pub async fn get_user_profile(
    State(state): State<AppState>,
    ApiPath(username): ApiPath<String>,
) -> Result<Json<UserProfile>, ClinicError> {
    if let Some(profile) = state.user_cache.get(&username).await {
        debug!("User cache hit for {}", username);
        return Ok(Json(profile));
    }

    let profile: UserProfile = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| not_found("User not found"))?
        .into();

    state
        .user_cache
        .insert(username, profile.clone())
        .await;
    Ok(Json(profile))
}

// --- Patients ---

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/patients",
    request_body = CreatePatientRequest,
    responses(
        (status = 201, description = "Patient created", body = Patient),
        (status = 400, description = "Invalid name or date")
    ),
    security(("bearer" = [])),
    tag = "Patients"
))]
pub async fn create_patient(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(payload): ApiJson<CreatePatientRequest>,
) -> Result<(StatusCode, Json<Patient>), ClinicError> {
    let patient = NewPatient {
        name: require_name(&payload.name)?,
        date_of_birth: parse_date_of_birth(&payload.date_of_birth)?,
    };

    let created = state.patients.create(patient).await?;
    info!("Patient {} created by {}", created.id, claims.sub);
    Ok((StatusCode::CREATED, Json(created)))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/patients",
    responses((status = 200, description = "All patients", body = [Patient])),
    security(("bearer" = [])),
    tag = "Patients"
))]
pub async fn list_patients(State(state): State<AppState>) -> Result<Json<Vec<Patient>>, ClinicError> {
    Ok(Json(state.patients.list().await?))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/patients/{id}",
    params(("id" = i64, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Patient", body = Patient),
        (status = 404, description = "Patient not found")
    ),
    security(("bearer" = [])),
    tag = "Patients"
))]
pub async fn get_patient(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Patient>, ClinicError> {
    state
        .patients
        .find(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("Patient not found"))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/patients/{id}",
    params(("id" = i64, Path, description = "Patient id")),
    request_body = UpdatePatientRequest,
    responses(
        (status = 200, description = "Updated patient", body = Patient),
        (status = 400, description = "Invalid name or date"),
        (status = 404, description = "Patient not found")
    ),
    security(("bearer" = [])),
    tag = "Patients"
))]
pub async fn update_patient(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<UpdatePatientRequest>,
) -> Result<Json<Patient>, ClinicError> {
    let update = PatientUpdate {
        name: payload.name.as_deref().map(require_name).transpose()?,
        date_of_birth: payload
            .date_of_birth
            .as_deref()
            .map(parse_date_of_birth)
            .transpose()?,
    };

    state
        .patients
        .update(id, update)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("Patient not found"))
}

// --- Appointments ---

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/appointments",
    request_body = CreateAppointmentRequest,
    responses(
        (status = 201, description = "Appointment created", body = Appointment),
        (status = 400, description = "Invalid date_time"),
        (status = 404, description = "Patient not found")
    ),
    security(("bearer" = [])),
    tag = "Appointments"
))]
pub async fn create_appointment(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), ClinicError> {
    let date_time = parse_date_time(&payload.date_time)?;

    if state.patients.find(payload.patient_id).await?.is_none() {
        return Err(not_found("Patient not found"));
    }

    let created = state
        .appointments
        .create(NewAppointment {
            patient_id: payload.patient_id,
            date_time,
            description: payload.description,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/appointments/{id}",
    params(("id" = i64, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Appointment", body = Appointment),
        (status = 404, description = "Appointment not found")
    ),
    security(("bearer" = [])),
    tag = "Appointments"
))]
pub async fn get_appointment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Appointment>, ClinicError> {
    state
        .appointments
        .find(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("Appointment not found"))
}

// --- Misc ---

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let database = match &state.db {
        Some(db) => db.is_healthy().await,
        None => true,
    };
    Json(json!({
        "status": if database { "ok" } else { "degraded" },
        "database": database,
    }))
}
