//! Conversation Data Structure
//!
//! One conversation exists per registered customer and is identified by the
//! customer's numeric user id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A conversation as listed by the `users` action
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Customer user id, also the conversation id
    pub id: u64,
    /// Participant email
    pub email: String,
    /// When the customer registered
    pub joined: DateTime<Utc>,
    /// Number of customer-authored messages
    #[serde(default)]
    pub message_count: u64,
    /// Timestamp of the most recent customer message
    #[serde(default)]
    pub last_message: Option<DateTime<Utc>>,
    /// Preview text of the most recent customer message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message_preview: Option<String>,
}

impl Conversation {
    /// Name shown in banners and list rows
    pub fn display_name(&self) -> &str {
        &self.email
    }
}

/// Response for listing conversations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListConversationsResponse {
    #[serde(default)]
    pub users: Vec<Conversation>,
}

/// Body of the `clear` action
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClearConversationRequest {
    pub user_id: u64,
}

/// Acknowledgement of the `clear` action
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClearConversationResponse {
    /// Number of messages discarded
    #[serde(default)]
    pub cleared: u64,
}
