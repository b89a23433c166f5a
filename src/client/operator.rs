//! Operator console
//!
//! Lists every conversation, polls the list while it is open and polls the
//! selected conversation's thread alongside it. New customer messages are
//! detected on the list's per-conversation counts.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::client::composer::{Composer, Confirm, ImageBatch, Refresh};
use crate::client::delta::LocalSnapshot;
use crate::client::error::{ClientError, Result};
use crate::client::notify::NotificationEmitter;
use crate::client::session::{OperatorSession, SessionStore};
use crate::client::store::ConversationStore;
use crate::client::sync::{SyncLoop, SyncStatus, SyncTarget};
use crate::client::thread::ConversationThread;
use crate::shared::config::AppConfig;
use crate::shared::messaging::{ChatMessage, Conversation, Sender, SendMessageResponse};

/// Conversation list kept fresh by the console's list loop
pub struct ConversationList {
    store: Arc<dyn ConversationStore>,
    sessions: SessionStore,
    notifier: Arc<NotificationEmitter>,
    conversations: Mutex<Vec<Conversation>>,
    snapshot: Mutex<LocalSnapshot>,
    expired: AtomicBool,
}

impl ConversationList {
    fn new(
        store: Arc<dyn ConversationStore>,
        sessions: SessionStore,
        notifier: Arc<NotificationEmitter>,
    ) -> Self {
        Self {
            store,
            sessions,
            notifier,
            conversations: Mutex::new(Vec::new()),
            snapshot: Mutex::new(LocalSnapshot::new()),
            expired: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Conversation>> {
        self.conversations.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn conversations(&self) -> Vec<Conversation> {
        self.lock().clone()
    }

    /// Whether the store rejected the operator token
    pub fn is_expired(&self) -> bool {
        self.expired.load(Ordering::Acquire)
    }
}

#[async_trait]
impl SyncTarget for ConversationList {
    type Snapshot = Vec<Conversation>;

    fn name(&self) -> &str {
        "conversations"
    }

    async fn fetch(&self) -> Result<Vec<Conversation>> {
        match self.store.users().await {
            Err(ClientError::Unauthorized) => {
                self.expired.store(true, Ordering::Release);
                self.store.set_token(None);
                if let Err(e) = self.sessions.clear_operator() {
                    tracing::warn!("Could not remove operator session: {}", e);
                }
                Err(ClientError::Unauthorized)
            }
            other => other,
        }
    }

    fn apply(&self, conversations: Vec<Conversation>) {
        let deltas = self
            .snapshot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .reconcile(conversations.iter().map(|c| (c.id, c.message_count)));
        if !deltas.is_empty() {
            let names: HashMap<u64, &str> = conversations
                .iter()
                .map(|c| (c.id, c.display_name()))
                .collect();
            self.notifier.emit(&deltas, |id| {
                names
                    .get(&id)
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| format!("user {}", id))
            });
        }
        *self.lock() = conversations;
    }
}

pub struct OperatorConsole {
    store: Arc<dyn ConversationStore>,
    sessions: SessionStore,
    composer: Composer,
    notifier: Arc<NotificationEmitter>,
    config: AppConfig,
    list: SyncLoop<ConversationList>,
    thread: Option<SyncLoop<ConversationThread>>,
    authenticated: bool,
}

impl OperatorConsole {
    /// Create the console, reusing a saved operator token if there is one
    pub fn new(
        store: Arc<dyn ConversationStore>,
        sessions: SessionStore,
        notifier: Arc<NotificationEmitter>,
        config: AppConfig,
    ) -> Self {
        let list = SyncLoop::with_fetch_timeout(
            ConversationList::new(Arc::clone(&store), sessions.clone(), Arc::clone(&notifier)),
            config.poll_interval,
            config.request_timeout,
        );
        let composer = Composer::new(
            Arc::clone(&store),
            Arc::clone(&notifier),
            Sender::Operator,
            config.clone(),
        );
        let authenticated = match sessions.load_operator() {
            Ok(Some(session)) => {
                store.set_token(Some(session.token));
                true
            }
            Ok(None) => false,
            Err(e) => {
                tracing::warn!("Could not read operator session: {}", e);
                false
            }
        };
        Self {
            store,
            sessions,
            composer,
            notifier,
            config,
            list,
            thread: None,
            authenticated,
        }
    }

    pub async fn login(&mut self, password: &str) -> Result<()> {
        let response = self.store.login(password).await?;
        self.store.set_token(Some(response.token.clone()));
        if let Err(e) = self.sessions.save_operator(&OperatorSession {
            token: response.token,
        }) {
            tracing::warn!("Could not persist operator session: {}", e);
        }
        self.authenticated = true;
        self.list.target().expired.store(false, Ordering::Release);
        tracing::info!("Operator signed in");
        Ok(())
    }

    pub fn logout(&mut self) -> Result<()> {
        self.close();
        self.store.set_token(None);
        self.authenticated = false;
        self.sessions.clear_operator()
    }

    /// Signed in and the store has not rejected the token
    pub fn is_authenticated(&self) -> bool {
        self.authenticated && !self.list.target().is_expired()
    }

    /// Show the conversation list and start polling it
    pub fn open(&self) -> Result<()> {
        if !self.is_authenticated() {
            return Err(ClientError::Unauthorized);
        }
        self.list.start();
        Ok(())
    }

    /// Hide the console; stops both loops
    pub fn close(&mut self) {
        self.deselect();
        self.list.stop();
    }

    /// Open a conversation: poll its thread and mark it read
    pub fn select(&mut self, conversation_id: u64) -> Result<()> {
        if !self.is_authenticated() {
            return Err(ClientError::Unauthorized);
        }
        if self.selected() != Some(conversation_id) {
            self.deselect();
            let thread = SyncLoop::with_fetch_timeout(
                ConversationThread::new(Arc::clone(&self.store), conversation_id),
                self.config.poll_interval,
                self.config.request_timeout,
            );
            thread.start();
            self.thread = Some(thread);
        }
        self.notifier.acknowledge(conversation_id);
        Ok(())
    }

    pub fn deselect(&mut self) {
        if let Some(thread) = self.thread.take() {
            thread.stop();
        }
    }

    pub fn selected(&self) -> Option<u64> {
        self.thread.as_ref().map(|t| t.target().user_id())
    }

    pub fn conversations(&self) -> Vec<Conversation> {
        self.list.target().conversations()
    }

    /// Messages of the selected conversation
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.thread
            .as_ref()
            .map(|t| t.target().messages())
            .unwrap_or_default()
    }

    /// Unread indicator of one conversation
    pub fn unread_for(&self, conversation_id: u64) -> u64 {
        self.notifier.unread_for(conversation_id)
    }

    pub fn list_status(&self) -> SyncStatus {
        self.list.status()
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    /// Refresh target for sends: the open thread, or the list without one
    fn view(&self) -> &dyn Refresh {
        match &self.thread {
            Some(thread) => thread as &dyn Refresh,
            None => &self.list as &dyn Refresh,
        }
    }

    pub async fn send_text(&self, body: &str) -> Result<SendMessageResponse> {
        self.composer
            .send_text(self.selected(), body, self.view())
            .await
    }

    pub async fn send_images(&self, files: &[PathBuf]) -> Result<ImageBatch> {
        self.composer
            .send_images(self.selected(), files, self.view())
            .await
    }

    /// Discard a conversation's messages after confirmation
    ///
    /// The open thread is emptied right away and the list re-fetched so the
    /// new count shows up.
    pub async fn clear_conversation(&self, conversation_id: u64, confirm: &dyn Confirm) -> Result<bool> {
        if !self.composer.clear_conversation(conversation_id, confirm).await? {
            return Ok(false);
        }
        if let Some(thread) = &self.thread {
            if thread.target().user_id() == conversation_id {
                thread.target().clear_local();
            }
        }
        self.list.refresh().await;
        Ok(true)
    }
}
