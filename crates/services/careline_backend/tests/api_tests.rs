use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use async_trait::async_trait;
use careline_backend::auth::{Claims, JwtTokenService, TokenService};
use careline_backend::cache::InMemoryCache;
use careline_backend::{app, AppState, AppStateBuilder};
use careline_common::services::CalendarService;
use careline_config::{AppConfig, AuthConfig, CacheConfig, GcalConfig, UpdateMode};
use careline_common::models::{NewUser, User};
use careline_db::{DbClient, DbError, UserRepository};
use careline_gcal::GoogleCalendarClient;
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SECRET: &str = "integration-secret";

fn test_config() -> AppConfig {
    AppConfig {
        auth: Some(AuthConfig {
            jwt_secret: SECRET.to_string(),
            token_ttl_minutes: Some(60),
            bcrypt_cost: Some(4),
        }),
        cache: CacheConfig {
            user_ttl_seconds: Some(60),
        },
        ..AppConfig::default()
    }
}

async fn test_state() -> AppState {
    let db = DbClient::from_url("sqlite::memory:").await.unwrap();
    let state = AppStateBuilder::new(Arc::new(test_config()))
        .with_db(db)
        .build()
        .unwrap();
    state.init_schema().await.unwrap();
    state
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn register_and_login(router: &Router, username: &str) -> String {
    let credentials = json!({ "username": username, "password": "s3cret!" });
    let (status, _) = send(router, Method::POST, "/register", None, Some(credentials.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(router, Method::POST, "/login", None, Some(credentials)).await;
    assert_eq!(status, StatusCode::OK);
    body["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_register_then_login_issues_bearer_token() {
    let router = app(test_state().await, None);
    let credentials = json!({ "username": "alice", "password": "s3cret!" });

    let (status, body) = send(&router, Method::POST, "/register", None, Some(credentials.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["username"], "alice");
    assert!(body["user"].get("password_hash").is_none());

    let (status, body) = send(&router, Method::POST, "/login", None, Some(credentials)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 3600);
    assert!(body["access_token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn test_duplicate_registration_is_rejected_without_new_row() {
    let state = test_state().await;
    let router = app(state.clone(), None);
    let credentials = json!({ "username": "alice", "password": "first" });
    send(&router, Method::POST, "/register", None, Some(credentials)).await;

    let (status, body) = send(
        &router,
        Method::POST,
        "/register",
        None,
        Some(json!({ "username": "alice", "password": "second" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Username already exists");

    // The original password still works, so the first row was untouched.
    let (status, _) = send(
        &router,
        Method::POST,
        "/login",
        None,
        Some(json!({ "username": "alice", "password": "first" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_requires_both_fields() {
    let router = app(test_state().await, None);
    let (status, _) = send(
        &router,
        Method::POST,
        "/register",
        None,
        Some(json!({ "username": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_with_wrong_password_returns_401_without_token() {
    let router = app(test_state().await, None);
    register_and_login(&router, "alice").await;

    let (status, body) = send(
        &router,
        Method::POST,
        "/login",
        None,
        Some(json!({ "username": "alice", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.get("access_token").is_none());

    let (status, _) = send(
        &router,
        Method::POST,
        "/login",
        None,
        Some(json!({ "username": "nobody", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_reject_missing_or_bad_tokens_without_mutation() {
    let state = test_state().await;
    let router = app(state.clone(), None);
    let patient = json!({ "name": "Ada", "date_of_birth": "1980-05-17" });

    let (status, body) = send(&router, Method::POST, "/patients", None, Some(patient.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Missing or invalid bearer token");

    let (status, _) = send(
        &router,
        Method::POST,
        "/patients",
        Some("not.a.jwt"),
        Some(patient.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let expired = JwtTokenService::new(SECRET, 60)
        .encode_claims(&Claims {
            sub: "alice".into(),
            iat: Utc::now().timestamp() - 7200,
            exp: Utc::now().timestamp() - 3600,
        })
        .unwrap();
    let (status, _) = send(&router, Method::POST, "/patients", Some(&expired), Some(patient)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert!(state.patients.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_patient_lifecycle() {
    let router = app(test_state().await, None);
    let token = register_and_login(&router, "alice").await;

    let (status, created) = send(
        &router,
        Method::POST,
        "/patients",
        Some(&token),
        Some(json!({ "name": "Ada", "date_of_birth": "1980-05-17" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["date_of_birth"], "1980-05-17");

    let (status, fetched) = send(&router, Method::GET, &format!("/patients/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, updated) = send(
        &router,
        Method::PUT,
        &format!("/patients/{id}"),
        Some(&token),
        Some(json!({ "name": "Ada Lovelace" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Ada Lovelace");
    assert_eq!(updated["date_of_birth"], "1980-05-17");

    let (status, listed) = send(&router, Method::GET, "/patients", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, _) = send(&router, Method::GET, "/patients/999", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_patient_with_bad_date_is_400() {
    let router = app(test_state().await, None);
    let token = register_and_login(&router, "alice").await;

    let (status, _) = send(
        &router,
        Method::POST,
        "/patients",
        Some(&token),
        Some(json!({ "name": "Ada", "date_of_birth": "17/05/1980" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_appointments_require_existing_patient() {
    let router = app(test_state().await, None);
    let token = register_and_login(&router, "alice").await;

    let (status, body) = send(
        &router,
        Method::POST,
        "/appointments",
        Some(&token),
        Some(json!({ "patient_id": 42, "date_time": "2024-01-01T10:00:00Z", "description": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Patient not found");

    let (_, patient) = send(
        &router,
        Method::POST,
        "/patients",
        Some(&token),
        Some(json!({ "name": "Ada", "date_of_birth": "1980-05-17" })),
    )
    .await;
    let (status, created) = send(
        &router,
        Method::POST,
        "/appointments",
        Some(&token),
        Some(json!({
            "patient_id": patient["id"],
            "date_time": "2024-01-01T12:00:00+02:00",
            "description": "annual checkup"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["date_time"], "2024-01-01T10:00:00Z");

    let id = created["id"].as_i64().unwrap();
    let (status, fetched) =
        send(&router, Method::GET, &format!("/appointments/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, _) = send(&router, Method::GET, "/appointments/999", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_profile_lookup_is_cached() {
    let state = test_state().await;
    let router = app(state.clone(), None);
    let token = register_and_login(&router, "alice").await;

    assert!(state.user_cache.get("alice").await.is_none());

    let (status, body) = send(&router, Method::GET, "/api/user/alice", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert!(body.get("password_hash").is_none());

    let cached = state.user_cache.get("alice").await.unwrap();
    assert_eq!(cached.username, "alice");

    let (status, _) = send(&router, Method::GET, "/api/user/bob", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_reports_database() {
    let router = app(test_state().await, None);
    let token = register_and_login(&router, "alice").await;

    let (status, body) = send(&router, Method::GET, "/health", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "database": true }));
}

#[tokio::test]
async fn test_calendar_routes_are_guarded_and_proxied() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "evt1" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = GoogleCalendarClient::from_config(&GcalConfig {
        api_base_url: Some(server.uri()),
        api_key: Some("gcal-token".into()),
        calendar_id: Some("primary".into()),
        update_mode: UpdateMode::OmitUnset,
    })
    .unwrap();
    let calendar: Arc<dyn CalendarService<Error = careline_gcal::GcalError>> = Arc::new(client);
    let router = app(test_state().await, Some(careline_gcal::routes(calendar)));

    let booking = json!({
        "summary": "Checkup",
        "start_time": "2024-01-01T10:00:00Z",
        "end_time": "2024-01-01T11:00:00Z",
        "description": "annual"
    });

    let (status, _) = send(&router, Method::POST, "/gcal/appointments", None, Some(booking.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = register_and_login(&router, "alice").await;
    let (status, body) = send(&router, Method::POST, "/gcal/appointments", Some(&token), Some(booking)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Appointment scheduled successfully.");
    assert_eq!(body["event_id"], "evt1");
}

#[tokio::test]
async fn test_malformed_bodies_get_json_validation_errors() {
    let router = app(test_state().await, None);

    let (status, body) = send(
        &router,
        Method::POST,
        "/register",
        None,
        Some(json!({ "username": 5, "password": "s3cret!" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 400);

    let token = register_and_login(&router, "alice").await;
    let (status, body) = send(
        &router,
        Method::POST,
        "/appointments",
        Some(&token),
        Some(json!({ "date_time": "2024-01-01T10:00:00Z", "description": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 400);
    assert!(body["error"]["message"]
        .as_str()
        .is_some_and(|m| m.contains("patient_id")));

    let (status, body) = send(&router, Method::GET, "/patients/abc", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 400);
}

/// A single-user repository that counts lookups.
struct CountingUsers {
    user: User,
    lookups: AtomicUsize,
}

#[async_trait]
impl UserRepository for CountingUsers {
    async fn init_schema(&self) -> Result<(), DbError> {
        Ok(())
    }

    async fn create(&self, _user: NewUser) -> Result<User, DbError> {
        Err(DbError::QueryError("read-only".into()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok((username == self.user.username).then(|| self.user.clone()))
    }
}

#[tokio::test]
async fn test_profile_is_served_from_cache_without_repository_lookup() {
    let users = Arc::new(CountingUsers {
        user: User {
            id: 7,
            username: "alice".into(),
            password_hash: "unused".into(),
        },
        lookups: AtomicUsize::new(0),
    });
    let tokens = Arc::new(JwtTokenService::new(SECRET, 60));
    let token = tokens.issue("alice").unwrap().access_token;

    let db = DbClient::from_url("sqlite::memory:").await.unwrap();
    let state = AppStateBuilder::new(Arc::new(test_config()))
        .with_db(db)
        .with_users(users.clone())
        .with_token_service(tokens)
        .with_user_cache(Arc::new(InMemoryCache::new(Duration::from_secs(60))))
        .build()
        .unwrap();
    let router = app(state, None);

    let (status, first) = send(&router, Method::GET, "/api/user/alice", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, json!({ "id": 7, "username": "alice" }));
    assert_eq!(users.lookups.load(Ordering::SeqCst), 1);

    let (status, second) = send(&router, Method::GET, "/api/user/alice", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second, first);
    assert_eq!(users.lookups.load(Ordering::SeqCst), 1);

    // Misses are not cached.
    send(&router, Method::GET, "/api/user/bob", Some(&token), None).await;
    send(&router, Method::GET, "/api/user/bob", Some(&token), None).await;
    assert_eq!(users.lookups.load(Ordering::SeqCst), 3);
}
