//! Per-user conversation state and the in-memory store that holds it.
//!
//! A `ConversationSession` owns everything the UI renders: transcript, current candidate
//! list, comparison selection and view mode. A question is submitted in two steps so the
//! store lock is never held while the backend is working:
//! `begin_submit` (gate + user turn) → backend call → `complete_submit` (assistant turn).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::backend_client::BackendError;
use crate::errors::AppError;
use crate::interpret::classifier::classify;
use crate::interpret::render::{render_comparison, render_turn, AnswerView, CompareView};
use crate::models::answer::AnswerPayload;
use crate::models::candidate::CandidateRecord;
use crate::models::chat::ChatTurn;
use crate::session::conversation::ConversationLog;
use crate::session::selection::{ComparisonSelector, ToggleOutcome, ViewMode};

/// The authenticated caller a session belongs to.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub display_name: String,
    /// Forwarded to the query backend; never serialized.
    pub token: String,
}

/// Handed out by `begin_submit`; everything the backend call needs.
#[derive(Debug, Clone)]
pub struct PendingQuestion {
    pub question: String,
    pub token: String,
    pub user_turn: ChatTurn,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    pub pending: bool,
    pub turns: Vec<ChatTurn>,
    pub latest_answer: Option<AnswerView>,
    pub comparison: CompareView,
}

#[derive(Debug)]
pub struct ConversationSession {
    id: Uuid,
    user: SessionUser,
    created_at: DateTime<Utc>,
    /// Refreshed on every store access; drives idle eviction.
    last_active: Instant,
    log: ConversationLog,
    /// Candidates of the latest successful answer; selection indices point here.
    candidates: Vec<CandidateRecord>,
    selection: ComparisonSelector,
    view_mode: ViewMode,
    pending: bool,
}

impl ConversationSession {
    pub fn new(user: SessionUser) -> Self {
        Self {
            id: Uuid::new_v4(),
            user,
            created_at: Utc::now(),
            last_active: Instant::now(),
            log: ConversationLog::default(),
            candidates: Vec::new(),
            selection: ComparisonSelector::default(),
            view_mode: ViewMode::default(),
            pending: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Only the credential the session was opened with may use it.
    pub fn authorize(&self, token: Option<&str>) -> Result<(), AppError> {
        match token {
            Some(token) if token == self.user.token => Ok(()),
            _ => {
                warn!(session_id = %self.id, "Rejected session access with a foreign credential");
                Err(AppError::Unauthorized)
            }
        }
    }

    /// Appends the user turn and closes the loading gate.
    pub fn begin_submit(&mut self, question: &str) -> Result<PendingQuestion, AppError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::Validation("question cannot be empty".to_string()));
        }
        if self.pending {
            return Err(AppError::Conflict(
                "a question is already being answered".to_string(),
            ));
        }

        self.pending = true;
        let user_turn = self.log.push_user(question).clone();
        Ok(PendingQuestion {
            question: question.to_string(),
            token: self.user.token.clone(),
            user_turn,
        })
    }

    /// Appends exactly one assistant turn and reopens the loading gate.
    ///
    /// A successful answer replaces the candidate list, which clears the selection.
    /// A failed one leaves candidates and selection untouched.
    pub fn complete_submit(&mut self, result: Result<AnswerPayload, BackendError>) -> ChatTurn {
        if let Ok(payload) = &result {
            debug!(
                session_id = %self.id,
                mode = ?classify(payload).kind(),
                candidates = payload.structured_data.len(),
                "Candidate list replaced"
            );
            self.candidates = payload.structured_data.clone();
            self.selection.clear();
            self.view_mode = ViewMode::List;
        }
        self.pending = false;
        self.log.push_answer(result).clone()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) -> Result<CompareView, AppError> {
        self.require_multi_candidate()?;
        self.view_mode = mode;
        Ok(self.compare_view())
    }

    pub fn toggle_selection(&mut self, index: usize) -> Result<(ToggleOutcome, CompareView), AppError> {
        self.require_multi_candidate()?;
        if self.view_mode != ViewMode::Compare {
            return Err(AppError::Validation(
                "switch to compare view before selecting candidates".to_string(),
            ));
        }
        if index >= self.candidates.len() {
            return Err(AppError::Validation(format!(
                "candidate index {index} is out of range (0..{})",
                self.candidates.len()
            )));
        }
        let outcome = self.selection.toggle(index);
        debug!(
            session_id = %self.id,
            index,
            ?outcome,
            selected = self.selection.len(),
            "Selection toggled"
        );
        Ok((outcome, self.compare_view()))
    }

    pub fn clear_selection(&mut self) -> CompareView {
        self.selection.clear();
        self.compare_view()
    }

    /// Starts a new conversation in place.
    pub fn reset(&mut self) -> Result<(), AppError> {
        if self.pending {
            return Err(AppError::Conflict(
                "cannot reset while a question is being answered".to_string(),
            ));
        }
        let discarded = self.log.len();
        self.log = ConversationLog::default();
        self.candidates.clear();
        self.selection.clear();
        self.view_mode = ViewMode::List;
        info!(session_id = %self.id, discarded, "Conversation reset");
        Ok(())
    }

    pub fn compare_view(&self) -> CompareView {
        render_comparison(self.view_mode, &self.selection, &self.candidates)
    }

    pub fn snapshot(&self) -> SessionView {
        SessionView {
            session_id: self.id,
            display_name: self.user.display_name.clone(),
            created_at: self.created_at,
            pending: self.is_pending(),
            turns: self.log.turns().to_vec(),
            latest_answer: self.log.latest_answer().and_then(render_turn),
            comparison: self.compare_view(),
        }
    }

    fn require_multi_candidate(&self) -> Result<(), AppError> {
        if self.candidates.len() > 1 {
            Ok(())
        } else {
            Err(AppError::Validation(
                "comparison is only available when an answer has several candidates".to_string(),
            ))
        }
    }
}

/// Idle lifetime used when none is configured.
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

/// All live sessions, keyed by id. A session lives until it is deleted or has been idle
/// for longer than `idle_ttl`; sessions with a question in flight are never evicted.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<Uuid, ConversationSession>>>,
    idle_ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_TTL)
    }
}

impl SessionStore {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            inner: Arc::default(),
            idle_ttl,
        }
    }

    pub fn insert(&self, session: ConversationSession) -> Result<Uuid, AppError> {
        let id = session.id();
        let mut sessions = self.lock()?;
        evict_idle(&mut sessions, self.idle_ttl);
        sessions.insert(id, session);
        Ok(id)
    }

    pub fn remove(&self, id: Uuid) -> Result<(), AppError> {
        self.lock()?
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
    }

    /// Runs `f` against one session. Must not be called across an `.await`.
    pub fn with_session<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut ConversationSession) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut sessions = self.lock()?;
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;
        session.last_active = Instant::now();
        f(session)
    }

    /// Drops every idle session. Returns how many were removed.
    pub fn evict_idle(&self) -> Result<usize, AppError> {
        Ok(evict_idle(&mut *self.lock()?, self.idle_ttl))
    }

    /// Periodic eviction; runs for the life of the process.
    pub async fn sweep_idle(self, every: Duration) {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            match self.evict_idle() {
                Ok(0) => {}
                Ok(evicted) => info!(evicted, "Evicted idle sessions"),
                Err(e) => warn!("Session sweep failed: {e}"),
            }
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Uuid, ConversationSession>>, AppError> {
        self.inner
            .lock()
            .map_err(|_| AppError::Internal(anyhow!("session store lock poisoned")))
    }
}

fn evict_idle(sessions: &mut HashMap<Uuid, ConversationSession>, idle_ttl: Duration) -> usize {
    let before = sessions.len();
    sessions.retain(|_, s| s.pending || s.last_active.elapsed() < idle_ttl);
    before - sessions.len()
}
