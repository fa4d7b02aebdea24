// --- File: crates/careline_common/src/http/extract.rs ---
//! Extractors whose rejections render as [`ClinicError`].
//!
//! axum's own `Json`, `Path` and `Query` answer bad input with plain-text
//! 400/415/422 responses. These wrappers turn every rejection into a
//! `ValidationError`, so clients always get the `{"error":{...}}` shape.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ClinicError;

/// JSON request body.
#[derive(FromRequest, Debug)]
#[from_request(via(axum::Json), rejection(ClinicError))]
pub struct ApiJson<T>(pub T);

/// Path parameters.
#[derive(FromRequestParts, Debug)]
#[from_request(via(axum::extract::Path), rejection(ClinicError))]
pub struct ApiPath<T>(pub T);

/// Query string parameters.
#[derive(FromRequestParts, Debug)]
#[from_request(via(axum::extract::Query), rejection(ClinicError))]
pub struct ApiQuery<T>(pub T);

impl From<JsonRejection> for ClinicError {
    fn from(rejection: JsonRejection) -> Self {
        ClinicError::ValidationError(rejection.body_text())
    }
}

impl From<PathRejection> for ClinicError {
    fn from(rejection: PathRejection) -> Self {
        ClinicError::ValidationError(rejection.body_text())
    }
}

impl From<QueryRejection> for ClinicError {
    fn from(rejection: QueryRejection) -> Self {
        ClinicError::ValidationError(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::IntoResponse,
        routing::{get, post},
        Router,
    };
    use serde::Deserialize;
    use serde_json::Value;
    use tower::ServiceExt;

    #[derive(Deserialize)]
    struct Visit {
        patient_id: i64,
    }

    #[derive(Deserialize)]
    struct Window {
        days: u32,
    }

    async fn visit(ApiJson(visit): ApiJson<Visit>) -> String {
        visit.patient_id.to_string()
    }

    async fn by_id(ApiPath(id): ApiPath<i64>) -> String {
        id.to_string()
    }

    async fn window(ApiQuery(window): ApiQuery<Window>) -> String {
        window.days.to_string()
    }

    fn router() -> Router {
        Router::new()
            .route("/visits", post(visit))
            .route("/visits/{id}", get(by_id))
            .route("/window", get(window))
    }

    async fn call(request: Request<Body>) -> (StatusCode, Value) {
        let response = router().oneshot(request).await.unwrap().into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn assert_validation_error(status: StatusCode, body: &Value) {
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], 400);
        assert!(body["error"]["message"]
            .as_str()
            .is_some_and(|m| m.starts_with("Validation error")));
    }

    #[tokio::test]
    async fn missing_json_field_is_validation_error() {
        let request = Request::builder()
            .method("POST")
            .uri("/visits")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"description":"checkup"}"#))
            .unwrap();
        let (status, body) = call(request).await;
        assert_validation_error(status, &body);
    }

    #[tokio::test]
    async fn malformed_json_and_missing_content_type_are_validation_errors() {
        let request = Request::builder()
            .method("POST")
            .uri("/visits")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = call(request).await;
        assert_validation_error(status, &body);

        let request = Request::builder()
            .method("POST")
            .uri("/visits")
            .body(Body::from(r#"{"patient_id":1}"#))
            .unwrap();
        let (status, body) = call(request).await;
        assert_validation_error(status, &body);
    }

    #[tokio::test]
    async fn bad_path_and_query_are_validation_errors() {
        let request = Request::builder()
            .uri("/visits/abc")
            .body(Body::empty())
            .unwrap();
        let (status, body) = call(request).await;
        assert_validation_error(status, &body);

        let request = Request::builder()
            .uri("/window?days=soon")
            .body(Body::empty())
            .unwrap();
        let (status, body) = call(request).await;
        assert_validation_error(status, &body);
    }

    #[tokio::test]
    async fn valid_input_passes_through() {
        let request = Request::builder()
            .uri("/visits/42")
            .body(Body::empty())
            .unwrap();
        let response = router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
