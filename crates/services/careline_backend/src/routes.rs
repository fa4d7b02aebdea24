// --- File: crates/services/careline_backend/src/routes.rs ---
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::auth::require_bearer;
use crate::handlers::{
    create_appointment, create_patient, get_appointment, get_patient, get_user_profile, health,
    list_patients, login, register, update_patient,
};
use crate::state::AppState;

/// The full HTTP surface.
///
/// `/register` and `/login` are public. Everything else, including the
/// calendar routes when given, sits behind [`require_bearer`].
pub fn app(state: AppState, calendar_routes: Option<Router>) -> Router {
    let public = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .with_state(state.clone());

    let mut protected = Router::new()
        .route("/patients", post(create_patient).get(list_patients))
        .route("/patients/{id}", get(get_patient).put(update_patient))
        .route("/appointments", post(create_appointment))
        .route("/appointments/{id}", get(get_appointment))
        .route("/api/user/{username}", get(get_user_profile))
        .route("/health", get(health))
        .with_state(state.clone());

    if let Some(calendar) = calendar_routes {
        protected = protected.merge(calendar);
    }

    let protected =
        protected.route_layer(middleware::from_fn_with_state(state, require_bearer));

    public.merge(protected).layer(TraceLayer::new_for_http())
}
