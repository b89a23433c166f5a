//! Backend Module
//!
//! Reference Conversation Store: the HTTP service the chat clients poll.
//! It keeps one append-only message log per registered customer, lists
//! conversations for operators and issues operator tokens.
//!
//! This module is only compiled when the `server` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Environment configuration, application state, app creation
//! - **`routes`** - Router assembly and CORS
//! - **`chat`** - The `?action=` handlers
//! - **`store`** - `ChatRepository` with Postgres and in-memory implementations
//! - **`auth`** - Operator password check and JWT tokens
//! - **`error`** - Backend-specific error types
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs     - Module exports and documentation
//! ├── main.rs    - supportdesk-server entry point
//! ├── server/    - Server initialization and state
//! ├── routes/    - Route configuration
//! ├── chat/      - Chat endpoint handlers
//! ├── store/     - Conversation persistence
//! ├── auth/      - Operator authentication
//! └── error/     - Error types
//! ```
//!
//! # Persistence
//!
//! With `DATABASE_URL` set the server connects to Postgres and applies the
//! migrations in `migrations/`. Without it, conversations live in memory
//! and are lost on restart.

/// Server initialization and state
pub mod server;

/// Route configuration
pub mod routes;

/// Chat endpoint handlers
pub mod chat;

/// Conversation persistence
pub mod store;

/// Operator authentication
pub mod auth;

/// Backend-specific error types
pub mod error;

pub use error::BackendError;
pub use server::{create_app, AppState, ServerConfig};
