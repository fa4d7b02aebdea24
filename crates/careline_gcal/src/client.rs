// --- File: crates/careline_gcal/src/client.rs ---
//! REST client for the Google Calendar events API.
//!
//! One request per call against `{base_url}/calendars/{calendarId}/events`,
//! authenticated with a static bearer token. The status codes that count as
//! success are strict: 200 for create and update, 204 for delete.

use careline_common::http::client::default_client;
use careline_common::services::{
    BookedEvent, BoxFuture, CalendarEvent, CalendarService, EventPatch,
};
use careline_config::{GcalConfig, UpdateMode, DEFAULT_GCAL_API_BASE_URL};
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, instrument, warn};

use crate::error::GcalError;

/// Every event time is sent in this zone.
const EVENT_TIME_ZONE: &str = "UTC";

pub struct GoogleCalendarClient {
    client: reqwest::Client,
    api_key: String,
    calendar_id: String,
    base_url: String,
    update_mode: UpdateMode,
}

impl GoogleCalendarClient {
    pub fn new(api_key: &str, calendar_id: &str) -> Result<Self, GcalError> {
        Ok(Self {
            client: default_client()?,
            api_key: api_key.to_string(),
            calendar_id: calendar_id.to_string(),
            base_url: DEFAULT_GCAL_API_BASE_URL.to_string(),
            update_mode: UpdateMode::default(),
        })
    }

    /// Build a client from the `gcal` config section.
    ///
    /// `api_key` and `calendar_id` are required.
    pub fn from_config(config: &GcalConfig) -> Result<Self, GcalError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| GcalError::Config("gcal.api_key is missing".to_string()))?;
        let calendar_id = config
            .calendar_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| GcalError::Config("gcal.calendar_id is missing".to_string()))?;

        Ok(Self::new(api_key, calendar_id)?
            .with_base_url(config.base_url())
            .with_update_mode(config.update_mode))
    }

    /// Point the client at another API root, e.g. a mock server.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_update_mode(mut self, update_mode: UpdateMode) -> Self {
        self.update_mode = update_mode;
        self
    }

    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.api_key)
    }

    fn events_url(&self) -> String {
        format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(&self.calendar_id)
        )
    }

    fn event_url(&self, event_id: &str) -> String {
        format!("{}/{}", self.events_url(), urlencoding::encode(event_id))
    }

    /// Create an event. Returns the provider's event id if the body carried one.
    #[instrument(skip(self), level = "info")]
    pub async fn create(&self, event: &CalendarEvent) -> Result<Option<String>, GcalError> {
        let mut body = json!({
            "summary": event.summary,
            "start": event_time(&event.start_time),
            "end": event_time(&event.end_time),
        });
        if let Some(description) = &event.description {
            body["description"] = Value::String(description.clone());
        }

        let response = self
            .client
            .post(self.events_url())
            .header("Authorization", self.auth_header())
            .json(&body)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(api_error(response).await);
        }

        let created: Value = response.json().await.unwrap_or(Value::Null);
        let event_id = created
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string);
        debug!("Created event {:?}", event_id);
        Ok(event_id)
    }

    /// Patch an event. The body depends on the configured [`UpdateMode`].
    #[instrument(skip(self), level = "info")]
    pub async fn update(&self, event_id: &str, patch: &EventPatch) -> Result<(), GcalError> {
        let body = patch_body(patch, self.update_mode);

        let response = self
            .client
            .patch(self.event_url(event_id))
            .header("Authorization", self.auth_header())
            .json(&body)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(api_error(response).await);
        }
        Ok(())
    }

    /// Delete an event. Only 204 No Content counts as success.
    #[instrument(skip(self), level = "info")]
    pub async fn delete(&self, event_id: &str) -> Result<(), GcalError> {
        let response = self
            .client
            .delete(self.event_url(event_id))
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        if response.status() != StatusCode::NO_CONTENT {
            return Err(api_error(response).await);
        }
        Ok(())
    }

    /// Single events between `time_min` and `time_max`, in the provider's
    /// start-time order.
    #[instrument(skip(self), level = "info")]
    pub async fn list(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<BookedEvent>, GcalError> {
        let url = format!(
            "{}?timeMin={}&timeMax={}&singleEvents=true&orderBy=startTime",
            self.events_url(),
            urlencoding::encode(&time_min.to_rfc3339()),
            urlencoding::encode(&time_max.to_rfc3339()),
        );

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let page: EventList = response
            .json()
            .await
            .map_err(|e| GcalError::Parse(e.to_string()))?;
        Ok(page.items.into_iter().map(BookedEvent::from).collect())
    }
}

impl CalendarService for GoogleCalendarClient {
    type Error = GcalError;

    fn create_event(&self, event: CalendarEvent) -> BoxFuture<'_, Option<String>, Self::Error> {
        Box::pin(async move { self.create(&event).await })
    }

    fn update_event(&self, event_id: &str, patch: EventPatch) -> BoxFuture<'_, (), Self::Error> {
        let event_id = event_id.to_string();
        Box::pin(async move { self.update(&event_id, &patch).await })
    }

    fn delete_event(&self, event_id: &str) -> BoxFuture<'_, (), Self::Error> {
        let event_id = event_id.to_string();
        Box::pin(async move { self.delete(&event_id).await })
    }

    fn list_events(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<BookedEvent>, Self::Error> {
        Box::pin(async move { self.list(time_min, time_max).await })
    }
}

fn event_time(date_time: &str) -> Value {
    json!({ "dateTime": date_time, "timeZone": EVENT_TIME_ZONE })
}

/// JSON body for a PATCH request.
///
/// `OmitUnset` sends only the supplied fields. `CoerceEmpty` sends all four,
/// with missing ones as empty strings.
pub(crate) fn patch_body(patch: &EventPatch, mode: UpdateMode) -> Value {
    let mut body = Map::new();
    let coerce = mode == UpdateMode::CoerceEmpty;

    let text = |value: &Option<String>| -> Option<String> {
        match value {
            Some(v) => Some(v.clone()),
            None if coerce => Some(String::new()),
            None => None,
        }
    };

    if let Some(summary) = text(&patch.summary) {
        body.insert("summary".to_string(), Value::String(summary));
    }
    if let Some(description) = text(&patch.description) {
        body.insert("description".to_string(), Value::String(description));
    }
    if let Some(start) = text(&patch.start_time) {
        body.insert("start".to_string(), event_time(&start));
    }
    if let Some(end) = text(&patch.end_time) {
        body.insert("end".to_string(), event_time(&end));
    }

    Value::Object(body)
}

/// Turn a non-success response into [`GcalError::Api`].
///
/// The message is `error.message` from the provider's JSON body when present,
/// otherwise the raw body, otherwise the status reason.
async fn api_error(response: reqwest::Response) -> GcalError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = provider_message(&text).unwrap_or_else(|| {
        if text.trim().is_empty() {
            status.canonical_reason().unwrap_or("unknown error").to_string()
        } else {
            text
        }
    });
    warn!("Google Calendar returned {}: {}", status.as_u16(), message);
    GcalError::Api {
        status: status.as_u16(),
        message,
    }
}

fn provider_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

#[derive(Debug, Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<ApiEvent>,
}

#[derive(Debug, Deserialize)]
struct ApiEvent {
    id: String,
    summary: Option<String>,
    description: Option<String>,
    start: Option<ApiEventTime>,
    end: Option<ApiEventTime>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEventTime {
    date_time: Option<String>,
    date: Option<String>,
}

impl ApiEventTime {
    // All-day events only carry `date`.
    fn into_string(self) -> Option<String> {
        self.date_time.or(self.date)
    }
}

impl From<ApiEvent> for BookedEvent {
    fn from(event: ApiEvent) -> Self {
        BookedEvent {
            id: event.id,
            summary: event.summary,
            start: event.start.and_then(ApiEventTime::into_string),
            end: event.end.and_then(ApiEventTime::into_string),
            description: event.description,
        }
    }
}
