//! Conversation Repository
//!
//! Persistence behind the chat endpoint. Two implementations share the
//! [`ChatRepository`] seam:
//!
//! - [`MemoryRepository`] - process-local, used when no database is set
//!   up and in tests
//! - [`PgRepository`] - Postgres via sqlx, tables from `migrations/`
//!
//! Both list conversations by most recent customer message first, with
//! conversations that have none at the end, and count only
//! customer-authored messages.

pub mod memory;
pub mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::backend::error::BackendError;
use crate::shared::messaging::{preview_text, ChatMessage, Conversation, Sender};

/// Characters kept in a conversation's last-message preview
pub const PREVIEW_LEN: usize = 80;

/// A registered customer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: u64,
    pub email: String,
    pub joined: DateTime<Utc>,
}

/// A message about to be appended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub user_id: u64,
    pub text: String,
    pub image: Option<String>,
    pub sender: Sender,
}

#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Return the user with this (already normalized) email, creating it
    /// on first use
    async fn register(&self, email: &str) -> Result<UserRecord, BackendError>;

    async fn user_exists(&self, user_id: u64) -> Result<bool, BackendError>;

    /// Append a message; returns it with the assigned id and timestamp
    async fn append(&self, message: NewMessage) -> Result<ChatMessage, BackendError>;

    /// A conversation's messages in insertion order
    async fn messages(&self, user_id: u64) -> Result<Vec<ChatMessage>, BackendError>;

    async fn conversations(&self) -> Result<Vec<Conversation>, BackendError>;

    /// Discard a conversation's messages; returns how many were removed
    async fn clear(&self, user_id: u64) -> Result<u64, BackendError>;
}

/// Shorten a message body for list previews
pub fn preview(text: &str) -> String {
    preview_text(text, PREVIEW_LEN)
}
