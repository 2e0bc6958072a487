use std::sync::Arc;

use crate::backend_client::QueryBackend;
use crate::identity::IdentityProvider;
use crate::session::store::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    /// Pluggable query backend. Default: HttpQueryBackend.
    pub backend: Arc<dyn QueryBackend>,
    pub identity: Arc<dyn IdentityProvider>,
}
