//! Server Module
//!
//! Initialization and configuration of the Axum server hosting the
//! Conversation Store.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs    - Module exports and documentation
//! ├── state.rs  - AppState and FromRef implementations
//! ├── config.rs - Environment configuration and database loading
//! └── init.rs   - App creation
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Configuration Loading**: port, JWT secret, operator password
//! 2. **Repository Selection**: Postgres when `DATABASE_URL` connects,
//!    in-memory otherwise
//! 3. **Router Creation**: the chat endpoint with CORS
//!
//! # Example
//!
//! ```rust,ignore
//! use supportdesk::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::from_env();
//! let app = create_app(&config).await?;
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use config::ServerConfig;
pub use init::create_app;
pub use state::AppState;
