//! Shared Module
//!
//! Types shared between the chat clients and the reference Conversation
//! Store server. Everything here is serializable and platform-agnostic.

/// Shared error types
pub mod error;

/// Client configuration
pub mod config;

/// Wire types of the Conversation Store contract
pub mod messaging;

pub use config::{AppConfig, AppConfigBuilder, ConfigError};
pub use error::SharedError;
