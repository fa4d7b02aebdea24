// --- File: crates/careline_gcal/src/routes.rs ---

use crate::client::GoogleCalendarClient;
use crate::error::GcalError;
use crate::handlers::{
    cancel_handler, list_handler, modify_handler, schedule_handler, DynCalendarService,
    GcalState,
};
use axum::{
    routing::{get, patch},
    Router,
};
use careline_config::AppConfig;
use std::sync::Arc;
use tracing::info;

/// Router for the calendar appointment endpoints, backed by `calendar`.
pub fn routes(calendar: Arc<DynCalendarService>) -> Router {
    let state = Arc::new(GcalState { calendar });

    Router::new()
        .route(
            "/gcal/appointments",
            get(list_handler).post(schedule_handler),
        )
        .route(
            "/gcal/appointments/{event_id}",
            patch(modify_handler).delete(cancel_handler),
        )
        .with_state(state)
}

/// Builds the Google Calendar client from `config.gcal` and returns its routes.
pub fn routes_from_config(config: &AppConfig) -> Result<Router, GcalError> {
    let gcal_config = config
        .gcal
        .as_ref()
        .ok_or_else(|| GcalError::Config("gcal section is missing".to_string()))?;
    let client = GoogleCalendarClient::from_config(gcal_config)?;
    info!("Calendar routes enabled for calendar {}", client.calendar_id());
    Ok(routes(Arc::new(client)))
}
