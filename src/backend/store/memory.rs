//! In-memory repository
//!
//! Holds every conversation in a single `RwLock`. Message ids come from one
//! counter shared by all conversations, like a database sequence.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{preview, ChatRepository, NewMessage, UserRecord};
use crate::backend::error::BackendError;
use crate::shared::messaging::{ChatMessage, Conversation, Sender};

#[derive(Default)]
struct MemoryState {
    users: Vec<UserRecord>,
    messages: HashMap<u64, Vec<ChatMessage>>,
    next_user_id: u64,
    next_message_id: u64,
}

#[derive(Default)]
pub struct MemoryRepository {
    state: RwLock<MemoryState>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatRepository for MemoryRepository {
    async fn register(&self, email: &str) -> Result<UserRecord, BackendError> {
        let mut state = self.state.write().await;
        if let Some(user) = state.users.iter().find(|u| u.email == email) {
            return Ok(user.clone());
        }
        state.next_user_id += 1;
        let user = UserRecord {
            id: state.next_user_id,
            email: email.to_string(),
            joined: Utc::now(),
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn user_exists(&self, user_id: u64) -> Result<bool, BackendError> {
        Ok(self.state.read().await.users.iter().any(|u| u.id == user_id))
    }

    async fn append(&self, message: NewMessage) -> Result<ChatMessage, BackendError> {
        let mut state = self.state.write().await;
        state.next_message_id += 1;
        let stored = ChatMessage {
            id: state.next_message_id,
            text: message.text,
            image: message.image,
            sender: message.sender,
            timestamp: Utc::now(),
        };
        state
            .messages
            .entry(message.user_id)
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn messages(&self, user_id: u64) -> Result<Vec<ChatMessage>, BackendError> {
        Ok(self
            .state
            .read()
            .await
            .messages
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn conversations(&self) -> Result<Vec<Conversation>, BackendError> {
        let state = self.state.read().await;
        let mut list: Vec<Conversation> = state
            .users
            .iter()
            .map(|user| {
                let from_customer: Vec<&ChatMessage> = state
                    .messages
                    .get(&user.id)
                    .map(|log| log.iter().filter(|m| m.sender == Sender::Customer).collect())
                    .unwrap_or_default();
                let last = from_customer.last();
                Conversation {
                    id: user.id,
                    email: user.email.clone(),
                    joined: user.joined,
                    message_count: from_customer.len() as u64,
                    last_message: last.map(|m| m.timestamp),
                    last_message_preview: last.map(|m| preview(&m.text)),
                }
            })
            .collect();
        // Most recent first, silent conversations last
        list.sort_by(|a, b| match (a.last_message, b.last_message) {
            (Some(x), Some(y)) => y.cmp(&x).then(a.id.cmp(&b.id)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.id.cmp(&b.id),
        });
        Ok(list)
    }

    async fn clear(&self, user_id: u64) -> Result<u64, BackendError> {
        let removed = self.state.write().await.messages.remove(&user_id);
        Ok(removed.map(|log| log.len() as u64).unwrap_or(0))
    }
}
