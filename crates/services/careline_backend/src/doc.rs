// File: crates/services/careline_backend/src/doc.rs
#![cfg(feature = "openapi")]

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers::{
    CreateAppointmentRequest, CreatePatientRequest, Credentials, RegisterResponse, TokenResponse,
    UpdatePatientRequest,
};
use careline_common::models::{Appointment, Patient, UserProfile};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Careline API",
        version = "0.1.0",
        description = "Clinic accounts, patients and appointments"
    ),
    paths(
        crate::handlers::register,
        crate::handlers::login,
        crate::handlers::get_user_profile,
        crate::handlers::create_patient,
        crate::handlers::list_patients,
        crate::handlers::get_patient,
        crate::handlers::update_patient,
        crate::handlers::create_appointment,
        crate::handlers::get_appointment
    ),
    components(schemas(
        Credentials,
        RegisterResponse,
        TokenResponse,
        CreatePatientRequest,
        UpdatePatientRequest,
        CreateAppointmentRequest,
        Patient,
        Appointment,
        UserProfile
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "Accounts", description = "Registration, login and profiles"),
        (name = "Patients", description = "Patient records"),
        (name = "Appointments", description = "Clinic appointments")
    )
)]
pub struct BackendApiDoc;
