//! Chat Message Data Structure
//!
//! Represents a single entry in a conversation's append-only message log,
//! plus the request and response bodies of the `messages` and `send` actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder body stored when a message carries only an image
pub const IMAGE_ONLY_TEXT: &str = "Sent an image";

/// Who wrote a message
///
/// Encoded as `"user"` / `"admin"` on the wire; the role names are accepted
/// as aliases.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Sender {
    /// The storefront customer
    #[serde(rename = "user", alias = "customer")]
    Customer,
    /// Support staff answering from the console
    #[serde(rename = "admin", alias = "operator")]
    Operator,
}

impl Sender {
    /// Whether this role is the operator (`isAdmin` on the wire)
    pub fn is_operator(self) -> bool {
        matches!(self, Sender::Operator)
    }

    /// The role on the other end of the conversation
    pub fn counterpart(self) -> Self {
        match self {
            Sender::Customer => Sender::Operator,
            Sender::Operator => Sender::Customer,
        }
    }
}

/// A message in a conversation
///
/// Ids increase monotonically within a conversation and messages are never
/// edited after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    /// Store-assigned id; insertion order equals id order
    pub id: u64,
    /// Message body
    pub text: String,
    /// Inline image (data-URI) or image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Author role
    pub sender: Sender,
    /// When the store accepted the message
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Get a preview of the message (first N characters)
    pub fn preview(&self, max_len: usize) -> String {
        preview_text(&self.text, max_len)
    }

    /// Whether the message carries an image payload
    pub fn has_image(&self) -> bool {
        self.image.as_deref().is_some_and(|i| !i.is_empty())
    }
}

/// Shorten `text` to at most `max_len` characters, ending in `...` when cut
pub fn preview_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let mut preview: String = text.chars().take(max_len.saturating_sub(3)).collect();
        preview.push_str("...");
        preview
    }
}

/// Response of the `messages` action
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListMessagesResponse {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

/// Body of the `send` action
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub user_id: u64,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

impl SendMessageRequest {
    /// A plain text message
    pub fn text(user_id: u64, message: impl Into<String>, sender: Sender) -> Self {
        Self {
            user_id,
            message: message.into(),
            image_url: None,
            is_admin: sender.is_operator(),
        }
    }

    /// An image message with an optional caption
    pub fn image(user_id: u64, image_url: impl Into<String>, sender: Sender) -> Self {
        Self {
            user_id,
            message: String::new(),
            image_url: Some(image_url.into()),
            is_admin: sender.is_operator(),
        }
    }

    /// The sender role encoded by `is_admin`
    pub fn sender(&self) -> Sender {
        if self.is_admin {
            Sender::Operator
        } else {
            Sender::Customer
        }
    }
}

/// Acknowledgement of the `send` action
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub message_id: u64,
    pub timestamp: DateTime<Utc>,
}
