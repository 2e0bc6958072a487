use tracing::warn;

use crate::backend_client::BackendError;
use crate::models::answer::AnswerPayload;
use crate::models::chat::ChatTurn;

/// Assistant text shown for any transport-level failure.
pub const GENERIC_ERROR_TEXT: &str = "Sorry, I encountered an error. Please try again.";

/// Append-only transcript. Turns are never reordered, edited or removed.
#[derive(Debug, Clone, Default)]
pub struct ConversationLog {
    turns: Vec<ChatTurn>,
}

impl ConversationLog {
    pub fn push_user(&mut self, question: &str) -> &ChatTurn {
        self.push(ChatTurn::user(question))
    }

    /// Appends the terminal assistant turn for a question.
    ///
    /// Backend-reported errors are shown verbatim; anything else collapses to
    /// [`GENERIC_ERROR_TEXT`].
    pub fn push_answer(&mut self, result: Result<AnswerPayload, BackendError>) -> &ChatTurn {
        let turn = match result {
            Ok(payload) => ChatTurn::assistant(payload),
            Err(BackendError::Reported(message)) => ChatTurn::error(message),
            Err(e) => {
                warn!("Question failed: {e}");
                ChatTurn::error(GENERIC_ERROR_TEXT)
            }
        };
        self.push(turn)
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Most recent assistant turn, if any.
    pub fn latest_answer(&self) -> Option<&ChatTurn> {
        self.turns.iter().rev().find(|t| !t.is_user)
    }

    fn push(&mut self, turn: ChatTurn) -> &ChatTurn {
        self.turns.push(turn);
        &self.turns[self.turns.len() - 1]
    }
}
