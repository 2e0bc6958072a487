//! Axum route handlers for the Session API.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::backend_client::BackendError;
use crate::errors::AppError;
use crate::identity::handlers::bearer_token;
use crate::interpret::render::{render_turn, AnswerView, CompareView};
use crate::models::chat::ChatTurn;
use crate::session::selection::{ToggleOutcome, ViewMode};
use crate::session::store::{ConversationSession, SessionUser, SessionView};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct QuestionRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct QuestionResponse {
    pub user_turn: ChatTurn,
    pub assistant_turn: ChatTurn,
    pub answer: Option<AnswerView>,
    pub comparison: CompareView,
}

#[derive(Debug, Deserialize)]
pub struct ViewModeRequest {
    pub mode: ViewMode,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub outcome: ToggleOutcome,
    pub comparison: CompareView,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
///
/// Resolves the bearer credential once and opens an empty conversation.
pub async fn handle_create_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<CreateSessionResponse>), AppError> {
    let token = bearer_token(&headers).ok_or(AppError::Unauthorized)?;
    let display_name = state.identity.whoami(&token).await?;

    let session = ConversationSession::new(SessionUser {
        display_name: display_name.clone(),
        token,
    });
    let session_id = state.sessions.insert(session)?;
    info!(%session_id, "Session opened");

    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id,
            display_name,
        }),
    ))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<SessionView>, AppError> {
    let token = bearer_token(&headers);
    let view = state.sessions.with_session(id, |s| {
        s.authorize(token.as_deref())?;
        Ok(s.snapshot())
    })?;
    Ok(Json(view))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let token = bearer_token(&headers);
    state
        .sessions
        .with_session(id, |s| s.authorize(token.as_deref()))?;
    state.sessions.remove(id)?;
    info!(session_id = %id, "Session closed");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/questions
///
/// Appends the user turn, asks the backend, appends the assistant turn.
/// Backend failures, including a crashed backend call, become an error turn in a
/// 200 response.
pub async fn handle_submit_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<QuestionRequest>,
) -> Result<Json<QuestionResponse>, AppError> {
    let token = bearer_token(&headers);
    let pending = state.sessions.with_session(id, |s| {
        s.authorize(token.as_deref())?;
        s.begin_submit(&request.question)
    })?;
    info!(session_id = %id, "Question submitted");

    // Detached so the loading gate reopens even if the caller disconnects mid-answer.
    let task = {
        let state = state.clone();
        let (question, token) = (pending.question, pending.token);
        tokio::spawn(async move {
            let result = state.backend.ask(&question, &token).await;
            state
                .sessions
                .with_session(id, |s| Ok((s.complete_submit(result), s.compare_view())))
        })
    };
    let (assistant_turn, comparison) = match task.await {
        Ok(completed) => completed?,
        Err(e) => {
            error!(session_id = %id, "Question task did not finish: {e}");
            let aborted = BackendError::Aborted(e.to_string());
            state
                .sessions
                .with_session(id, |s| Ok((s.complete_submit(Err(aborted)), s.compare_view())))?
        }
    };

    Ok(Json(QuestionResponse {
        answer: render_turn(&assistant_turn),
        user_turn: pending.user_turn,
        assistant_turn,
        comparison,
    }))
}

/// POST /api/v1/sessions/:id/reset
pub async fn handle_reset_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<SessionView>, AppError> {
    let token = bearer_token(&headers);
    let view = state.sessions.with_session(id, |s| {
        s.authorize(token.as_deref())?;
        s.reset()?;
        Ok(s.snapshot())
    })?;
    Ok(Json(view))
}

/// PUT /api/v1/sessions/:id/view
pub async fn handle_set_view(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<ViewModeRequest>,
) -> Result<Json<CompareView>, AppError> {
    let token = bearer_token(&headers);
    let view = state.sessions.with_session(id, |s| {
        s.authorize(token.as_deref())?;
        s.set_view_mode(request.mode)
    })?;
    Ok(Json(view))
}

/// POST /api/v1/sessions/:id/selection/:index
pub async fn handle_toggle_selection(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
    headers: HeaderMap,
) -> Result<Json<ToggleResponse>, AppError> {
    let token = bearer_token(&headers);
    let (outcome, comparison) = state.sessions.with_session(id, |s| {
        s.authorize(token.as_deref())?;
        s.toggle_selection(index)
    })?;
    Ok(Json(ToggleResponse {
        outcome,
        comparison,
    }))
}

/// DELETE /api/v1/sessions/:id/selection
pub async fn handle_clear_selection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<CompareView>, AppError> {
    let token = bearer_token(&headers);
    let view = state.sessions.with_session(id, |s| {
        s.authorize(token.as_deref())?;
        Ok(s.clear_selection())
    })?;
    Ok(Json(view))
}
