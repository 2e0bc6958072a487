// Conversation sessions: transcript, comparison selection, loading gate.
// Every mutation goes through `store::ConversationSession`.

pub mod conversation;
pub mod handlers;
pub mod selection;
pub mod store;
