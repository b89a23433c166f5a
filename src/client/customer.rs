//! Customer chat widget
//!
//! A customer registers once by email; the returned user id is kept in the
//! session file and doubles as the conversation id. The thread is polled
//! only while the widget is open.

use std::path::PathBuf;
use std::sync::Arc;

use crate::client::composer::{Composer, ImageBatch};
use crate::client::error::{ClientError, Result};
use crate::client::notify::NotificationEmitter;
use crate::client::session::{CustomerSession, SessionStore};
use crate::client::store::ConversationStore;
use crate::client::sync::{SyncLoop, SyncStatus};
use crate::client::thread::ConversationThread;
use crate::shared::config::AppConfig;
use crate::shared::messaging::{ChatMessage, Sender, SendMessageResponse};

/// Name operator replies are announced under
const SUPPORT_NAME: &str = "Support";

pub struct CustomerWidget {
    store: Arc<dyn ConversationStore>,
    sessions: SessionStore,
    notifier: Arc<NotificationEmitter>,
    composer: Composer,
    config: AppConfig,
    session: Option<CustomerSession>,
    thread: Option<SyncLoop<ConversationThread>>,
}

impl CustomerWidget {
    /// Create the widget, restoring a saved session if there is one
    pub fn new(
        store: Arc<dyn ConversationStore>,
        sessions: SessionStore,
        notifier: Arc<NotificationEmitter>,
        config: AppConfig,
    ) -> Self {
        let composer = Composer::new(
            Arc::clone(&store),
            Arc::clone(&notifier),
            Sender::Customer,
            config.clone(),
        );
        let mut widget = Self {
            store,
            sessions,
            notifier,
            composer,
            config,
            session: None,
            thread: None,
        };
        match widget.sessions.load_customer() {
            Ok(Some(session)) => {
                tracing::info!("Restored customer session for {}", session.email);
                widget.bind(session);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Could not read customer session: {}", e),
        }
        widget
    }

    fn bind(&mut self, session: CustomerSession) {
        if let Some(old) = self.thread.take() {
            old.stop();
        }
        let thread = ConversationThread::new(Arc::clone(&self.store), session.user_id)
            .with_alerts(Arc::clone(&self.notifier), Sender::Operator, SUPPORT_NAME);
        self.thread = Some(SyncLoop::with_fetch_timeout(
            thread,
            self.config.poll_interval,
            self.config.request_timeout,
        ));
        self.session = Some(session);
    }

    /// Register (or look up) the customer and persist the session
    pub async fn register(&mut self, email: &str) -> Result<&CustomerSession> {
        let response = match self.store.register(email).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Registration failed: {}", e);
                return Err(e);
            }
        };
        let session = CustomerSession {
            user_id: response.user_id,
            email: response.email,
        };
        if let Err(e) = self.sessions.save_customer(&session) {
            tracing::warn!("Could not persist customer session: {}", e);
        }
        self.bind(session);
        self.session.as_ref().ok_or(ClientError::NoConversation)
    }

    pub fn session(&self) -> Option<&CustomerSession> {
        self.session.as_ref()
    }

    /// Forget the customer and stop polling
    pub fn sign_out(&mut self) -> Result<()> {
        if let Some(thread) = self.thread.take() {
            thread.stop();
        }
        self.session = None;
        self.sessions.clear_customer()
    }

    /// Show the widget: start polling and mark the thread read
    pub fn open(&self) -> Result<()> {
        let (session, thread) = self.bound()?;
        thread.start();
        self.notifier.acknowledge(session.user_id);
        Ok(())
    }

    /// Hide the widget and stop polling
    pub fn close(&self) {
        if let Some(thread) = &self.thread {
            thread.stop();
        }
    }

    pub fn is_open(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| t.is_running())
    }

    fn bound(&self) -> Result<(&CustomerSession, &SyncLoop<ConversationThread>)> {
        match (&self.session, &self.thread) {
            (Some(session), Some(thread)) => Ok((session, thread)),
            _ => Err(ClientError::validation("email", "Enter your email to start chatting")),
        }
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.thread
            .as_ref()
            .map(|t| t.target().messages())
            .unwrap_or_default()
    }

    pub fn status(&self) -> Option<SyncStatus> {
        self.thread.as_ref().map(|t| t.status())
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub async fn send_text(&self, body: &str) -> Result<SendMessageResponse> {
        let (session, thread) = self.bound()?;
        self.composer
            .send_text(Some(session.user_id), body, thread)
            .await
    }

    pub async fn send_images(&self, files: &[PathBuf]) -> Result<ImageBatch> {
        let (session, thread) = self.bound()?;
        self.composer
            .send_images(Some(session.user_id), files, thread)
            .await
    }
}
