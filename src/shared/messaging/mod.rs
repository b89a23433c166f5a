//! Messaging Module
//!
//! Wire types of the Conversation Store contract:
//!
//! - `Conversation` - a customer's conversation as listed for operators
//! - `ChatMessage` - an entry of a conversation's message log
//! - `RegisterRequest` / `LoginRequest` - customer and operator identity
//!
//! Every action is addressed through the `action` query parameter of a
//! single endpoint; see [`Action`].
//!
//! # Usage
//!
//! ```rust
//! use supportdesk::shared::messaging::{Action, ChatMessage, Conversation};
//!
//! assert_eq!(Action::Users.as_str(), "users");
//! ```

pub mod account;
pub mod conversation;
pub mod message;

pub use account::{
    normalize_email, ErrorBody, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse,
};
pub use conversation::{
    ClearConversationRequest, ClearConversationResponse, Conversation, ListConversationsResponse,
};
pub use message::{
    preview_text, ChatMessage, ListMessagesResponse, Sender, SendMessageRequest,
    SendMessageResponse, IMAGE_ONLY_TEXT,
};

use serde::{Deserialize, Serialize};

/// Value of the `action` query parameter
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Register,
    Users,
    Messages,
    Send,
    Clear,
    Login,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Register => "register",
            Action::Users => "users",
            Action::Messages => "messages",
            Action::Send => "send",
            Action::Clear => "clear",
            Action::Login => "login",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "register" => Some(Action::Register),
            "users" => Some(Action::Users),
            "messages" => Some(Action::Messages),
            "send" => Some(Action::Send),
            "clear" => Some(Action::Clear),
            "login" => Some(Action::Login),
            _ => None,
        }
    }

    /// Whether the action may only be called with an operator token
    pub fn requires_operator(self) -> bool {
        matches!(self, Action::Users | Action::Clear)
    }
}
