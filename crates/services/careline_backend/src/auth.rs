// --- File: crates/services/careline_backend/src/auth.rs ---
//! Password hashing, access tokens and the bearer-token guard.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use careline_config::AuthConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::AuthError;
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// JWT claims. `sub` is the username.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly issued access token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    /// Lifetime in seconds.
    pub expires_in: i64,
}

/// Issues and validates access tokens.
pub trait TokenService: Send + Sync {
    fn issue(&self, username: &str) -> Result<IssuedToken, AuthError>;

    /// Decode and check a token, including its expiry.
    fn validate(&self, token: &str) -> Result<Claims, AuthError>;
}

/// HS256 tokens signed with a shared secret.
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtTokenService {
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    /// Rejects an empty secret or one still set to the env marker.
    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        let secret = config.jwt_secret.trim();
        if secret.is_empty() || secret == careline_config::env_vars::SECRET_MARKER {
            return Err(AuthError::Config(
                "auth.jwt_secret is not set (JWT_SECRET_KEY)".to_string(),
            ));
        }
        Ok(Self::new(secret, config.token_ttl_minutes()))
    }

    /// Encode arbitrary claims with this service's key.
    pub fn encode_claims(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, username: &str) -> Result<IssuedToken, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: username.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        Ok(IssuedToken {
            access_token: self.encode_claims(&claims)?,
            expires_in: self.ttl.num_seconds(),
        })
    }

    fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Rejected token: {}", e);
                AuthError::MissingOrInvalidToken
            })
    }
}

/// Hash a password with bcrypt on the blocking pool.
pub async fn hash_password(password: String, cost: u32) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Check a password against a bcrypt hash. A malformed hash counts as a mismatch.
pub async fn verify_password(password: String, hash: String) -> bool {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
        .await
        .unwrap_or(false)
}

/// Check a login attempt.
///
/// Unknown users (`stored_hash` is `None`) still pay for one bcrypt hash at
/// `cost`, so the response time does not reveal whether the username exists.
pub async fn verify_login(password: String, stored_hash: Option<String>, cost: u32) -> bool {
    match stored_hash {
        Some(hash) => verify_password(password, hash).await,
        None => {
            let _ = hash_password(password, cost).await;
            false
        }
    }
}

/// The token part of an `Authorization: Bearer <token>` header value.
fn bearer_token(value: &str) -> Option<&str> {
    value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Axum middleware guarding every protected route.
///
/// On success the validated [`Claims`] are stored in the request extensions.
/// Otherwise the request is answered with 401 before any handler runs.
pub async fn require_bearer(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let claims = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .map(|token| state.tokens.validate(token));

    match claims {
        Some(Ok(claims)) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Some(Err(err)) => err.into_response(),
        None => {
            warn!("Request to {} without bearer token", req.uri().path());
            AuthError::MissingOrInvalidToken.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtTokenService {
        JwtTokenService::new("test-secret", 60)
    }

    #[test]
    fn issued_token_validates() {
        let tokens = service();
        let issued = tokens.issue("alice").unwrap();
        assert_eq!(issued.expires_in, 3600);

        let claims = tokens.validate(&issued.access_token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = service();
        let now = Utc::now().timestamp();
        let token = tokens
            .encode_claims(&Claims {
                sub: "alice".into(),
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();

        assert!(matches!(
            tokens.validate(&token),
            Err(AuthError::MissingOrInvalidToken)
        ));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let other = JwtTokenService::new("other-secret", 60);
        let token = other.issue("mallory").unwrap().access_token;
        assert!(service().validate(&token).is_err());
        assert!(service().validate("not-a-jwt").is_err());
    }

    #[test]
    fn bearer_header_parsing() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("Bearer    "), None);
        assert_eq!(bearer_token("Basic dXNlcg=="), None);
        assert_eq!(bearer_token("abc.def"), None);
    }

    #[test]
    fn unresolved_secret_marker_is_a_config_error() {
        let config = AuthConfig {
            jwt_secret: "secret_from_env".into(),
            token_ttl_minutes: None,
            bcrypt_cost: None,
        };
        assert!(matches!(
            JwtTokenService::from_config(&config),
            Err(AuthError::Config(_))
        ));
    }

    #[tokio::test]
    async fn password_hash_round_trip() {
        let hash = hash_password("hunter2".into(), 4).await.unwrap();
        assert_ne!(hash, "hunter2");
        assert!(verify_password("hunter2".into(), hash.clone()).await);
        assert!(!verify_password("hunter3".into(), hash).await);
        assert!(!verify_password("hunter2".into(), "not-a-hash".into()).await);
    }

    #[tokio::test]
    async fn login_check_rejects_unknown_user() {
        let hash = hash_password("hunter2".into(), 4).await.unwrap();
        assert!(verify_login("hunter2".into(), Some(hash.clone()), 4).await);
        assert!(!verify_login("hunter3".into(), Some(hash), 4).await);
        assert!(!verify_login("hunter2".into(), None, 4).await);
    }
}
