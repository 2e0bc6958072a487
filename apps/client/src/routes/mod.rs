pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::identity::handlers as auth;
use crate::interpret::handlers as sources;
use crate::session::handlers as sessions;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth API
        .route("/api/v1/auth/register", post(auth::handle_register))
        .route("/api/v1/auth/login", post(auth::handle_login))
        .route("/api/v1/auth/me", get(auth::handle_me))
        // Session API
        .route("/api/v1/sessions", post(sessions::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(sessions::handle_get_session).delete(sessions::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/questions",
            post(sessions::handle_submit_question),
        )
        .route(
            "/api/v1/sessions/:id/reset",
            post(sessions::handle_reset_session),
        )
        .route("/api/v1/sessions/:id/view", put(sessions::handle_set_view))
        .route(
            "/api/v1/sessions/:id/selection",
            axum::routing::delete(sessions::handle_clear_selection),
        )
        .route(
            "/api/v1/sessions/:id/selection/:index",
            post(sessions::handle_toggle_selection),
        )
        // Source snippets
        .route("/api/v1/sources/format", post(sources::handle_format_source))
        .with_state(state)
}
