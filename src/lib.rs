//! Supportdesk - Main Library
//!
//! Supportdesk is the customer-support chat of a storefront: a chat widget
//! for customers and a console for support operators, both reading and
//! writing one append-only message log per conversation held by a remote
//! Conversation Store.
//!
//! # Overview
//!
//! The clients poll. Each keeps a local view fresh on a fixed interval,
//! compares per-conversation message counts against the previous tick and
//! turns genuine arrivals into notifications without duplicating or losing
//! any.
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared between clients and server
//!   - Wire types of the `?action=` contract
//!   - Client configuration builder
//!   - Error types
//!
//! - **`client`** - The two chat clients
//!   - Conversation Store HTTP client
//!   - Sync loop, delta detector, notification emitter
//!   - Composer, customer widget, operator console
//!
//! - **`backend`** - Reference Conversation Store (only compiled with the
//!   `server` feature)
//!   - Axum HTTP server with the single chat endpoint
//!   - Postgres or in-memory persistence
//!   - Operator login with bcrypt and JWT
//!
//! # Feature Flags
//!
//! - **`server`** - enables the backend module and the `supportdesk-server`
//!   binary
//!
//! # Usage
//!
//! ## Server-Side
//!
//! ```rust,ignore
//! use supportdesk::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), supportdesk::backend::BackendError> {
//! let app = create_app(&ServerConfig::from_env()).await?;
//! // Serve with axum::serve
//! # Ok(())
//! # }
//! ```
//!
//! ## Customer widget
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use supportdesk::client::notify::{NotificationEmitter, TerminalHost};
//! use supportdesk::client::session::SessionStore;
//! use supportdesk::client::{Config, CustomerWidget, HttpStore};
//!
//! # async fn example() -> supportdesk::client::Result<()> {
//! let config = Config::new();
//! let app = config.app().clone();
//! let notifier = Arc::new(NotificationEmitter::new(Arc::new(TerminalHost), "Support"));
//! let mut widget = CustomerWidget::new(
//!     Arc::new(HttpStore::new(config)?),
//!     SessionStore::new(),
//!     notifier,
//!     app,
//! );
//! widget.register("buyer@example.com").await?;
//! widget.open()?;
//! widget.send_text("Hi, my download link expired").await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! - `Result<T, E>` for fallible operations
//! - Custom error types in `shared::error`, `client::error` and
//!   `backend::error`

/// Shared types and data structures
pub mod shared;

/// Chat clients
pub mod client;

/// Backend server-side code
#[cfg(feature = "server")]
pub mod backend;
