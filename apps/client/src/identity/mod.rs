//! Identity provider client. Register, log in, and resolve a bearer credential to a user.
//!
//! The rest of the crate only consumes "is authenticated" and a display name.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod handlers;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Identity provider rejected request (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// What the UI needs to know about the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthStatus {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn register(&self, credentials: &Credentials) -> Result<(), IdentityError>;
    async fn login(&self, credentials: &Credentials) -> Result<AccessToken, IdentityError>;
    /// Resolves a bearer credential to the user identifier it was issued for.
    async fn whoami(&self, token: &str) -> Result<String, IdentityError>;
}

#[derive(Debug, Deserialize)]
struct WhoAmI {
    user: String,
}

#[derive(Debug, Deserialize)]
struct RejectionBody {
    detail: String,
}

#[derive(Clone)]
pub struct HttpIdentityProvider {
    client: Client,
    base_url: String,
}

impl HttpIdentityProvider {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, IdentityError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

/// Reads a response body, turning non-success statuses into `Rejected`.
async fn checked_body(response: Response) -> Result<String, IdentityError> {
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        return Ok(body);
    }
    warn!("Identity provider returned {}: {}", status, body);
    let message = serde_json::from_str::<RejectionBody>(&body)
        .map(|b| b.detail)
        .unwrap_or(body);
    Err(IdentityError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn register(&self, credentials: &Credentials) -> Result<(), IdentityError> {
        let response = self
            .client
            .post(self.endpoint("register"))
            .json(credentials)
            .send()
            .await?;
        checked_body(response).await?;
        debug!("Registered {}", credentials.email);
        Ok(())
    }

    async fn login(&self, credentials: &Credentials) -> Result<AccessToken, IdentityError> {
        let response = self
            .client
            .post(self.endpoint("login"))
            .json(credentials)
            .send()
            .await?;
        let body = checked_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn whoami(&self, token: &str) -> Result<String, IdentityError> {
        let response = self
            .client
            .get(self.endpoint("protected"))
            .bearer_auth(token)
            .send()
            .await?;
        let body = checked_body(response).await?;
        let who: WhoAmI = serde_json::from_str(&body)?;
        Ok(who.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{header::AUTHORIZATION, HeaderMap, StatusCode},
        response::IntoResponse,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;

    use crate::errors::AppError;

    fn rejection(status: StatusCode, detail: &str) -> axum::response::Response {
        (status, Json(json!({ "detail": detail }))).into_response()
    }

    /// Identity provider stand-in with the same paths and bodies as the real one.
    fn provider_routes() -> Router {
        Router::new()
            .route(
                "/register",
                post(|Json(c): Json<Credentials>| async move {
                    if c.email == "taken@example.com" {
                        rejection(StatusCode::BAD_REQUEST, "Email already registered")
                    } else {
                        Json(json!({ "msg": "User registered successfully" })).into_response()
                    }
                }),
            )
            .route(
                "/login",
                post(|Json(c): Json<Credentials>| async move {
                    if c.password == "secret" {
                        Json(json!({ "access_token": "abc", "token_type": "bearer" }))
                            .into_response()
                    } else {
                        rejection(StatusCode::UNAUTHORIZED, "Invalid credentials")
                    }
                }),
            )
            .route(
                "/protected",
                get(|headers: HeaderMap| async move {
                    match headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
                        Some("Bearer abc") => Json(json!({
                            "msg": "You are authenticated!",
                            "user": "ada@example.com"
                        }))
                        .into_response(),
                        _ => rejection(StatusCode::UNAUTHORIZED, "Invalid or expired token"),
                    }
                }),
            )
    }

    /// Serves the stand-in on a loopback port and returns a client pointed at it.
    async fn provider() -> HttpIdentityProvider {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, provider_routes()).await.unwrap() });
        HttpIdentityProvider::new(format!("http://{addr}/"), Duration::from_secs(5)).unwrap()
    }

    fn credentials(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_surfaces_detail_as_validation() {
        let provider = provider().await;
        provider
            .register(&credentials("new@example.com", "pw"))
            .await
            .unwrap();

        let err = provider
            .register(&credentials("taken@example.com", "pw"))
            .await
            .unwrap_err();
        match &err {
            IdentityError::Rejected { status, message } => {
                assert_eq!(*status, 400);
                assert_eq!(message, "Email already registered");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        assert!(matches!(AppError::from(err), AppError::Validation(m) if m == "Email already registered"));
    }

    #[tokio::test]
    async fn test_login_decodes_token_or_rejects() {
        let provider = provider().await;
        let token = provider
            .login(&credentials("ada@example.com", "secret"))
            .await
            .unwrap();
        assert_eq!(
            token,
            AccessToken {
                access_token: "abc".to_string(),
                token_type: "bearer".to_string(),
            }
        );

        let err = provider
            .login(&credentials("ada@example.com", "wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::Rejected { status: 401, .. }));
        assert!(matches!(AppError::from(err), AppError::Unauthorized));
    }

    #[tokio::test]
    async fn test_whoami_forwards_bearer() {
        let provider = provider().await;
        assert_eq!(provider.whoami("abc").await.unwrap(), "ada@example.com");

        let err = provider.whoami("forged").await.unwrap_err();
        match err {
            IdentityError::Rejected { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid or expired token");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_upstream() {
        let provider =
            HttpIdentityProvider::new("http://127.0.0.1:1".to_string(), Duration::from_secs(1))
                .unwrap();
        let err = provider.whoami("abc").await.unwrap_err();
        assert!(matches!(err, IdentityError::Http(_)));
        assert!(matches!(AppError::from(err), AppError::Upstream(_)));
    }

    #[test]
    fn test_access_token_defaults_type() {
        let token: AccessToken = serde_json::from_str(r#"{"access_token": "abc"}"#).unwrap();
        assert_eq!(token.token_type, "bearer");
    }

    #[test]
    fn test_whoami_body_shape() {
        let who: WhoAmI = serde_json::from_str(
            r#"{"msg": "You are authenticated!", "user": "ada@example.com", "session_id": "s1"}"#,
        )
        .unwrap();
        assert_eq!(who.user, "ada@example.com");
    }

    #[test]
    fn test_endpoint_joins_cleanly() {
        let provider =
            HttpIdentityProvider::new("http://auth.local/".to_string(), Duration::from_secs(1))
                .unwrap();
        assert_eq!(provider.endpoint("login"), "http://auth.local/login");
    }
}
