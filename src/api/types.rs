//! Shared types for the HTTP layer.

use std::sync::Arc;

use crate::api::error::ApiError;
use crate::auth::SessionStore;
use crate::db::{AuthStore, ClinicalStore};
use crate::generation::TextGenerator;
use crate::prediction::ModelSet;

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
///
/// Stores hand out a fresh connection per call; models are read-only once
/// loaded; sessions are the only mutable shared state.
#[derive(Clone)]
pub struct ApiContext {
    pub clinical: ClinicalStore,
    pub auth: AuthStore,
    pub models: Arc<ModelSet>,
    pub generator: Arc<dyn TextGenerator>,
    pub sessions: Arc<SessionStore>,
}

impl ApiContext {
    pub fn new(
        clinical: ClinicalStore,
        auth: AuthStore,
        models: ModelSet,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            clinical,
            auth,
            models: Arc::new(models),
            generator,
            sessions: Arc::new(SessionStore::new()),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Session context: injected by auth middleware
// ═══════════════════════════════════════════════════════════

/// Logged-in caller, injected into request extensions by the auth
/// middleware after the bearer token matched a live session.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub username: String,
    pub token: String,
}

/// Run blocking work (SQLite, inference, generation) off the async runtime.
pub async fn run_blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}
