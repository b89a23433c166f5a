//! Client error types
//!
//! Every failure a chat client can observe falls in one of three categories:
//! transport failures, application errors reported by the store inside a
//! successful response, and validation failures caught before any request is
//! made. None of them is fatal; callers log them and show a toast.

use reqwest::StatusCode;
use thiserror::Error;

use crate::shared::{ConfigError, SharedError};

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Error category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request failed or the store answered with a non-success status
    Transport,
    /// The store answered successfully with an `error` field
    Application,
    /// Rejected locally, no request was made
    Validation,
    /// Local environment problem (config, session file)
    Local,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Store returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("Store error: {0}")]
    Application(String),

    #[error("Validation error in field '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("No conversation is selected")]
    NoConversation,

    #[error("Another request is still in progress")]
    Busy,

    #[error("Operator login required")]
    Unauthorized,

    #[error("Session storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Shared(SharedError),
}

impl ClientError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) | Self::Status { .. } | Self::Unauthorized => ErrorKind::Transport,
            Self::Application(_) => ErrorKind::Application,
            Self::Validation { .. } | Self::NoConversation | Self::Busy => ErrorKind::Validation,
            Self::Shared(SharedError::ValidationError { .. }) => ErrorKind::Validation,
            Self::Shared(SharedError::MessageError { .. }) => ErrorKind::Validation,
            Self::Shared(SharedError::SerializationError { .. }) => ErrorKind::Transport,
            Self::Storage(_) | Self::Config(_) => ErrorKind::Local,
        }
    }

    /// Whether the composer surfaces this error as a toast
    ///
    /// Validation and local errors are left to the caller to show inline.
    pub fn is_toasted(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transport | ErrorKind::Application)
    }

    /// Short text suitable for a toast
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(_) => "Could not reach the support service".to_string(),
            Self::Status { message, .. } if !message.is_empty() => message.clone(),
            Self::Status { status, .. } => format!("Support service error ({})", status.as_u16()),
            Self::Application(message) => message.clone(),
            Self::Validation { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<SharedError> for ClientError {
    fn from(err: SharedError) -> Self {
        match err {
            SharedError::ValidationError { field, message } => Self::Validation { field, message },
            other => Self::Shared(other),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Shared(err.into())
    }
}
