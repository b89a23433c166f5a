/**
 * Server Initialization
 *
 * Builds the application state from the environment and wires the router.
 *
 * # Initialization Process
 *
 * 1. Read `ServerConfig` from the environment
 * 2. Build operator authentication
 * 3. Connect to Postgres if configured, else use the in-memory repository
 * 4. Create the router
 */

use axum::Router;
use std::sync::Arc;

use crate::backend::error::BackendError;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, ServerConfig};
use crate::backend::server::state::AppState;
use crate::backend::store::{ChatRepository, MemoryRepository, PgRepository};

/// Create and configure the Axum application
///
/// Fails only when operator authentication cannot be set up; a missing
/// database downgrades to in-memory storage.
pub async fn create_app(config: &ServerConfig) -> Result<Router<()>, BackendError> {
    tracing::info!("Initializing Conversation Store");

    let operator = config.operator_auth()?;

    let repository: Arc<dyn ChatRepository> = match load_database().await {
        Some(pool) => {
            tracing::info!("Using Postgres repository");
            Arc::new(PgRepository::new(pool))
        }
        None => {
            tracing::info!("Using in-memory repository");
            Arc::new(MemoryRepository::new())
        }
    };

    let app = create_router(AppState::new(repository, operator));
    tracing::info!("Router configured");
    Ok(app)
}
