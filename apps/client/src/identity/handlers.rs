//! Axum route handlers for the Auth API. Thin proxies over the identity provider.

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::errors::AppError;
use crate::identity::{AccessToken, AuthStatus, Credentials, IdentityError};
use crate::state::AppState;

/// Extracts the credential from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

fn validate_credentials(credentials: &Credentials) -> Result<(), AppError> {
    if credentials.email.trim().is_empty() || credentials.password.is_empty() {
        return Err(AppError::Validation(
            "email and password are required".to_string(),
        ));
    }
    Ok(())
}

/// POST /api/v1/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    validate_credentials(&credentials)?;
    state.identity.register(&credentials).await?;
    info!("Registered new user");
    Ok((StatusCode::CREATED, Json(json!({ "status": "registered" }))))
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<AccessToken>, AppError> {
    validate_credentials(&credentials)?;
    let token = state.identity.login(&credentials).await?;
    Ok(Json(token))
}

/// GET /api/v1/auth/me
///
/// Missing or rejected credentials are reported as unauthenticated, not as an error.
pub async fn handle_me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AuthStatus>, AppError> {
    let unauthenticated = AuthStatus {
        authenticated: false,
        display_name: None,
    };
    let Some(token) = bearer_token(&headers) else {
        return Ok(Json(unauthenticated));
    };

    match state.identity.whoami(&token).await {
        Ok(user) => Ok(Json(AuthStatus {
            authenticated: true,
            display_name: Some(user),
        })),
        Err(IdentityError::Rejected { status: 401 | 403, .. }) => Ok(Json(unauthenticated)),
        Err(e) => Err(e.into()),
    }
}
