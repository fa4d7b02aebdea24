// File: crates/careline_gcal/src/handlers.rs
use crate::error::GcalError;
use crate::logic::{
    cancel_appointment, list_appointments, modify_appointment, schedule_appointment,
    AppointmentListResponse, AppointmentListing, AppointmentResponse, AppointmentsQuery,
    ScheduleRequest,
};
use axum::{extract::State, http::StatusCode, response::Json};
use careline_common::services::{CalendarService, EventPatch};
use careline_common::{ApiJson, ApiPath, ApiQuery};
use std::sync::Arc;
use tracing::info;

pub type DynCalendarService = dyn CalendarService<Error = GcalError>;

// Shared state needed by the calendar handlers
#[derive(Clone)]
pub struct GcalState {
    pub calendar: Arc<DynCalendarService>,
}

fn respond(response: AppointmentResponse) -> (StatusCode, Json<AppointmentResponse>) {
    let status = if response.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    (status, Json(response))
}

/// Handler to schedule an appointment.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/gcal/appointments",
    request_body = ScheduleRequest,
    responses(
        (status = 200, description = "Appointment scheduled", body = AppointmentResponse),
        (status = 502, description = "Calendar provider rejected the request", body = AppointmentResponse)
    ),
    tag = "GCal"
))]
pub async fn schedule_handler(
    State(state): State<Arc<GcalState>>,
    ApiJson(payload): ApiJson<ScheduleRequest>,
) -> (StatusCode, Json<AppointmentResponse>) {
    info!("Scheduling appointment '{}'", payload.summary);
    respond(schedule_appointment(state.calendar.as_ref(), payload.into()).await)
}

/// Handler to patch an appointment. Only supplied fields change.
#[cfg_attr(feature = "openapi", utoipa::path(
    patch,
    path = "/gcal/appointments/{event_id}",
    params(("event_id" = String, Path, description = "Provider event id")),
    request_body = EventPatch,
    responses(
        (status = 200, description = "Appointment modified", body = AppointmentResponse),
        (status = 502, description = "Calendar provider rejected the request", body = AppointmentResponse)
    ),
    tag = "GCal"
))]
pub async fn modify_handler(
    State(state): State<Arc<GcalState>>,
    ApiPath(event_id): ApiPath<String>,
    ApiJson(patch): ApiJson<EventPatch>,
) -> (StatusCode, Json<AppointmentResponse>) {
    respond(modify_appointment(state.calendar.as_ref(), &event_id, patch).await)
}

#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/gcal/appointments/{event_id}",
    params(("event_id" = String, Path, description = "Provider event id")),
    responses(
        (status = 200, description = "Appointment cancelled", body = AppointmentResponse),
        (status = 502, description = "Failed to cancel appointment", body = AppointmentResponse)
    ),
    tag = "GCal"
))]
pub async fn cancel_handler(
    State(state): State<Arc<GcalState>>,
    ApiPath(event_id): ApiPath<String>,
) -> (StatusCode, Json<AppointmentResponse>) {
    respond(cancel_appointment(state.calendar.as_ref(), &event_id).await)
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/gcal/appointments",
    params(AppointmentsQuery),
    responses(
        (status = 200, description = "Appointments, or a message when there are none", body = AppointmentListResponse),
        (status = 502, description = "Calendar provider rejected the request", body = AppointmentListResponse)
    ),
    tag = "GCal"
))]
pub async fn list_handler(
    State(state): State<Arc<GcalState>>,
    ApiQuery(query): ApiQuery<AppointmentsQuery>,
) -> (StatusCode, Json<AppointmentListResponse>) {
    let listing = list_appointments(state.calendar.as_ref(), query.time_min, query.time_max).await;
    let status = match listing {
        AppointmentListing::Failed(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::OK,
    };
    (status, Json(listing.into()))
}
