// File: crates/careline_gcal/src/doc.rs
#![cfg(feature = "openapi")]

use utoipa::OpenApi;

use crate::logic::{AppointmentListResponse, AppointmentResponse, ScheduleRequest};
use careline_common::services::{BookedEvent, EventPatch};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::schedule_handler,
        crate::handlers::modify_handler,
        crate::handlers::cancel_handler,
        crate::handlers::list_handler
    ),
    components(schemas(
        ScheduleRequest,
        EventPatch,
        AppointmentResponse,
        AppointmentListResponse,
        BookedEvent
    )),
    tags((name = "GCal", description = "Calendar appointment endpoints"))
)]
pub struct GcalApiDoc;
