// --- File: crates/careline_gcal/src/logic.rs ---
//! Appointment operations phrased as the messages shown to clinic staff.
//!
//! Each function performs exactly one provider call through a
//! [`CalendarService`] and turns the outcome into a response with a
//! human-readable message. No retries.

use careline_common::services::{BookedEvent, CalendarEvent, CalendarService, EventPatch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

pub const SCHEDULED: &str = "Appointment scheduled successfully.";
pub const MODIFIED: &str = "Appointment modified successfully.";
pub const CANCELLED: &str = "Appointment cancelled successfully.";
pub const CANCEL_FAILED: &str = "Failed to cancel appointment.";
pub const NO_APPOINTMENTS_FOUND: &str = "No appointments found.";

// --- Data Structures ---

/// Body of `POST /gcal/appointments`.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ScheduleRequest {
    pub summary: String,
    /// RFC 3339, passed to the provider as-is
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<ScheduleRequest> for CalendarEvent {
    fn from(req: ScheduleRequest) -> Self {
        CalendarEvent {
            summary: req.summary,
            start_time: req.start_time,
            end_time: req.end_time,
            description: req.description,
        }
    }
}

/// Query of `GET /gcal/appointments`.
#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct AppointmentsQuery {
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
}

/// Outcome of schedule / modify / cancel.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AppointmentResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    pub message: String,
}

impl AppointmentResponse {
    fn ok(message: impl Into<String>, event_id: Option<String>) -> Self {
        Self {
            success: true,
            event_id,
            message: message.into(),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            event_id: None,
            message: message.into(),
        }
    }
}

/// Outcome of a listing.
#[derive(Debug, Clone, PartialEq)]
pub enum AppointmentListing {
    Found(Vec<BookedEvent>),
    NoneFound,
    Failed(String),
}

impl AppointmentListing {
    /// The message for this outcome; `None` when appointments were found.
    pub fn message(&self) -> Option<&str> {
        match self {
            AppointmentListing::Found(_) => None,
            AppointmentListing::NoneFound => Some(NO_APPOINTMENTS_FOUND),
            AppointmentListing::Failed(msg) => Some(msg),
        }
    }
}

/// JSON shape of a listing: either `appointments` or `message`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AppointmentListResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointments: Option<Vec<BookedEvent>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<AppointmentListing> for AppointmentListResponse {
    fn from(listing: AppointmentListing) -> Self {
        match listing {
            AppointmentListing::Found(events) => Self {
                appointments: Some(events),
                message: None,
            },
            other => Self {
                appointments: None,
                message: other.message().map(str::to_string),
            },
        }
    }
}

// --- Operations ---

pub async fn schedule_appointment<S>(service: &S, event: CalendarEvent) -> AppointmentResponse
where
    S: CalendarService + ?Sized,
{
    match service.create_event(event).await {
        Ok(event_id) => {
            info!("Scheduled appointment {:?}", event_id);
            AppointmentResponse::ok(SCHEDULED, event_id)
        }
        Err(e) => {
            error!("Failed to schedule appointment: {}", e);
            AppointmentResponse::failed(format!("Failed to schedule appointment: {}", e))
        }
    }
}

pub async fn modify_appointment<S>(
    service: &S,
    event_id: &str,
    patch: EventPatch,
) -> AppointmentResponse
where
    S: CalendarService + ?Sized,
{
    match service.update_event(event_id, patch).await {
        Ok(()) => AppointmentResponse::ok(MODIFIED, Some(event_id.to_string())),
        Err(e) => {
            error!("Failed to modify appointment {}: {}", event_id, e);
            AppointmentResponse::failed(format!("Failed to modify appointment: {}", e))
        }
    }
}

/// Cancel an appointment. Failures are reported with a generic message.
pub async fn cancel_appointment<S>(service: &S, event_id: &str) -> AppointmentResponse
where
    S: CalendarService + ?Sized,
{
    match service.delete_event(event_id).await {
        Ok(()) => AppointmentResponse::ok(CANCELLED, Some(event_id.to_string())),
        Err(e) => {
            error!("Failed to cancel appointment {}: {}", event_id, e);
            AppointmentResponse::failed(CANCEL_FAILED)
        }
    }
}

pub async fn list_appointments<S>(
    service: &S,
    time_min: DateTime<Utc>,
    time_max: DateTime<Utc>,
) -> AppointmentListing
where
    S: CalendarService + ?Sized,
{
    match service.list_events(time_min, time_max).await {
        Ok(events) if events.is_empty() => AppointmentListing::NoneFound,
        Ok(events) => AppointmentListing::Found(events),
        Err(e) => {
            error!("Failed to list appointments: {}", e);
            AppointmentListing::Failed(format!("Failed to list appointments: {}", e))
        }
    }
}
