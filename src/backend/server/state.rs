/**
 * Application State Management
 *
 * `AppState` holds the repository and operator authentication shared by
 * every request. The `FromRef` implementations let handlers extract only
 * the part they need.
 *
 * # Example
 *
 * ```rust,ignore
 * use std::sync::Arc;
 * use axum::extract::State;
 * use supportdesk::backend::store::ChatRepository;
 *
 * async fn handler(State(repo): State<Arc<dyn ChatRepository>>) {
 *     let conversations = repo.conversations().await;
 * }
 * ```
 */

use axum::extract::FromRef;
use std::sync::Arc;

use crate::backend::auth::OperatorAuth;
use crate::backend::store::{ChatRepository, MemoryRepository};

#[derive(Clone)]
pub struct AppState {
    /// Conversation storage (Postgres or in-memory)
    pub repository: Arc<dyn ChatRepository>,

    /// Operator password check and token verification
    pub operator: Arc<OperatorAuth>,
}

impl AppState {
    pub fn new(repository: Arc<dyn ChatRepository>, operator: OperatorAuth) -> Self {
        Self {
            repository,
            operator: Arc::new(operator),
        }
    }

    /// State backed by a fresh in-memory repository
    pub fn in_memory(operator: OperatorAuth) -> Self {
        Self::new(Arc::new(MemoryRepository::new()), operator)
    }
}

impl FromRef<AppState> for Arc<dyn ChatRepository> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.repository.clone()
    }
}

impl FromRef<AppState> for Arc<OperatorAuth> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.operator.clone()
    }
}
