// --- File: crates/careline_gcal/src/lib.rs ---
//! Google Calendar appointment client for Careline.

pub mod client;
pub mod doc;
pub mod error;
pub mod handlers;
pub mod logic;
#[cfg(test)]
pub mod mock;
pub mod routes;

pub use client::GoogleCalendarClient;
pub use error::GcalError;
pub use routes::{routes, routes_from_config};
