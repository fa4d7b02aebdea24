// --- File: crates/services/careline_backend/src/lib.rs ---
//! Careline clinic backend: accounts, patients and appointments over axum.

pub mod auth;
pub mod cache;
pub mod doc;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::app;
pub use state::{AppState, AppStateBuilder};
