//! Message thread of one conversation, kept fresh by a sync loop.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::client::delta::LocalSnapshot;
use crate::client::error::Result;
use crate::client::notify::NotificationEmitter;
use crate::client::store::ConversationStore;
use crate::client::sync::SyncTarget;
use crate::shared::messaging::{ChatMessage, Sender};

/// Rendered messages of one conversation
///
/// With a notifier attached, messages written by `counted` are run through
/// the delta detector on every applied fetch.
pub struct ConversationThread {
    store: Arc<dyn ConversationStore>,
    user_id: u64,
    label: String,
    messages: Mutex<Vec<ChatMessage>>,
    alerts: Option<ThreadAlerts>,
}

struct ThreadAlerts {
    notifier: Arc<NotificationEmitter>,
    counted: Sender,
    from: String,
    snapshot: Mutex<LocalSnapshot>,
}

impl ConversationThread {
    pub fn new(store: Arc<dyn ConversationStore>, user_id: u64) -> Self {
        Self {
            store,
            user_id,
            label: format!("thread#{}", user_id),
            messages: Mutex::new(Vec::new()),
            alerts: None,
        }
    }

    /// Notify about new messages from `counted`, announced as `from`
    pub fn with_alerts(
        mut self,
        notifier: Arc<NotificationEmitter>,
        counted: Sender,
        from: impl Into<String>,
    ) -> Self {
        self.alerts = Some(ThreadAlerts {
            notifier,
            counted,
            from: from.into(),
            snapshot: Mutex::new(LocalSnapshot::new()),
        });
        self
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ChatMessage>> {
        self.messages.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn user_id(&self) -> u64 {
        self.user_id
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.lock().clone()
    }

    /// Empty the rendered thread without waiting for the next fetch
    pub fn clear_local(&self) {
        self.lock().clear();
    }
}

#[async_trait]
impl SyncTarget for ConversationThread {
    type Snapshot = Vec<ChatMessage>;

    fn name(&self) -> &str {
        &self.label
    }

    async fn fetch(&self) -> Result<Vec<ChatMessage>> {
        self.store.messages(self.user_id).await
    }

    fn apply(&self, messages: Vec<ChatMessage>) {
        if let Some(alerts) = &self.alerts {
            let count = messages
                .iter()
                .filter(|m| m.sender == alerts.counted)
                .count() as u64;
            let deltas = alerts
                .snapshot
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .reconcile([(self.user_id, count)]);
            alerts.notifier.emit(&deltas, |_| alerts.from.clone());
        }
        *self.lock() = messages;
    }
}
