// --- File: crates/careline_gcal/src/mock.rs ---
//! In-memory calendar for unit tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use careline_common::services::{
    BookedEvent, BoxFuture, CalendarEvent, CalendarService, EventPatch,
};
use chrono::{DateTime, Utc};

use crate::error::GcalError;

/// Stores events in a map; `fail_with` makes every call answer with that status.
#[derive(Default)]
pub struct MockCalendarService {
    events: Mutex<BTreeMap<String, BookedEvent>>,
    next_id: Mutex<u32>,
    fail_with: Option<(u16, String)>,
}

impl MockCalendarService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(status: u16, message: &str) -> Self {
        Self {
            fail_with: Some((status, message.to_string())),
            ..Self::default()
        }
    }

    pub fn get(&self, event_id: &str) -> Option<BookedEvent> {
        self.events.lock().unwrap().get(event_id).cloned()
    }

    fn check(&self) -> Result<(), GcalError> {
        match &self.fail_with {
            Some((status, message)) => Err(GcalError::Api {
                status: *status,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl CalendarService for MockCalendarService {
    type Error = GcalError;

    fn create_event(&self, event: CalendarEvent) -> BoxFuture<'_, Option<String>, Self::Error> {
        Box::pin(async move {
            self.check()?;
            let id = {
                let mut next = self.next_id.lock().unwrap();
                *next += 1;
                format!("evt{}", *next)
            };
            self.events.lock().unwrap().insert(
                id.clone(),
                BookedEvent {
                    id: id.clone(),
                    summary: Some(event.summary),
                    start: Some(event.start_time),
                    end: Some(event.end_time),
                    description: event.description,
                },
            );
            Ok(Some(id))
        })
    }

    fn update_event(&self, event_id: &str, patch: EventPatch) -> BoxFuture<'_, (), Self::Error> {
        let event_id = event_id.to_string();
        Box::pin(async move {
            self.check()?;
            let mut events = self.events.lock().unwrap();
            let event = events.get_mut(&event_id).ok_or_else(|| GcalError::Api {
                status: 404,
                message: "Not Found".to_string(),
            })?;
            if patch.summary.is_some() {
                event.summary = patch.summary;
            }
            if patch.start_time.is_some() {
                event.start = patch.start_time;
            }
            if patch.end_time.is_some() {
                event.end = patch.end_time;
            }
            if patch.description.is_some() {
                event.description = patch.description;
            }
            Ok(())
        })
    }

    fn delete_event(&self, event_id: &str) -> BoxFuture<'_, (), Self::Error> {
        let event_id = event_id.to_string();
        Box::pin(async move {
            self.check()?;
            self.events
                .lock()
                .unwrap()
                .remove(&event_id)
                .map(|_| ())
                .ok_or_else(|| GcalError::Api {
                    status: 410,
                    message: "Resource has been deleted".to_string(),
                })
        })
    }

    fn list_events(
        &self,
        _time_min: DateTime<Utc>,
        _time_max: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<BookedEvent>, Self::Error> {
        Box::pin(async move {
            self.check()?;
            let mut events: Vec<BookedEvent> =
                self.events.lock().unwrap().values().cloned().collect();
            events.sort_by(|a, b| a.start.cmp(&b.start));
            Ok(events)
        })
    }
}
