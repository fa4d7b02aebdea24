// --- File: crates/careline_common/src/services.rs ---
//! Service abstractions for external services.
//!
//! The backend talks to the calendar provider only through [`CalendarService`],
//! so handlers and message logic can be tested against an in-process fake.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Calendar operations on a single, preconfigured calendar.
pub trait CalendarService: Send + Sync {
    /// Error type returned by calendar service operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Create an event. Resolves to the provider's event id when it returns one.
    fn create_event(&self, event: CalendarEvent) -> BoxFuture<'_, Option<String>, Self::Error>;

    /// Patch an existing event.
    fn update_event(&self, event_id: &str, patch: EventPatch) -> BoxFuture<'_, (), Self::Error>;

    /// Delete an event.
    fn delete_event(&self, event_id: &str) -> BoxFuture<'_, (), Self::Error>;

    /// Events overlapping `[time_min, time_max)`, ordered by start time.
    fn list_events(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<BookedEvent>, Self::Error>;
}

/// An event to create.
///
/// Times are passed to the provider verbatim with `timeZone: "UTC"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CalendarEvent {
    /// The summary or title of the event.
    pub summary: String,
    /// The start time of the event.
    pub start_time: String,
    /// The end time of the event.
    pub end_time: String,
    /// An optional description of the event.
    #[serde(default)]
    pub description: Option<String>,
}

/// Fields to change on an existing event. `None` means "not supplied".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EventPatch {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A simplified view of a provider event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookedEvent {
    /// The ID of the event.
    pub id: String,
    pub summary: Option<String>,
    /// Start as returned by the provider (`dateTime`, or `date` for all-day events).
    pub start: Option<String>,
    pub end: Option<String>,
    pub description: Option<String>,
}
