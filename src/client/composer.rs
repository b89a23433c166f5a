//! Composer
//!
//! Submits locally authored messages and folds the result back into local
//! state by triggering an out-of-band refresh of the active view. Every
//! operation holds the busy flag for its whole duration, so a second
//! operation started meanwhile is rejected.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tokio::sync::watch;

use crate::client::error::{ClientError, Result};
use crate::client::notify::{NotificationEmitter, ToastKind};
use crate::client::store::ConversationStore;
use crate::client::sync::{SyncLoop, SyncTarget, TickOutcome};
use crate::shared::config::AppConfig;
use crate::shared::messaging::{Sender, SendMessageRequest, SendMessageResponse};

/// Something that can be re-fetched on demand
#[async_trait]
pub trait Refresh: Send + Sync {
    async fn refresh(&self) -> TickOutcome;
}

#[async_trait]
impl<T: SyncTarget> Refresh for SyncLoop<T> {
    async fn refresh(&self) -> TickOutcome {
        SyncLoop::refresh(self).await
    }
}

/// Explicit user confirmation for destructive operations
pub trait Confirm: Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool + Sync> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Outcome of [`Composer::send_images`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageBatch {
    /// Files processed, at most the per-send cap
    pub attempted: usize,
    pub succeeded: usize,
    /// Files dropped for exceeding the cap
    pub skipped: usize,
}

pub struct Composer {
    store: Arc<dyn ConversationStore>,
    notifier: Arc<NotificationEmitter>,
    role: Sender,
    config: AppConfig,
    draft: Mutex<String>,
    busy: AtomicBool,
    busy_tx: watch::Sender<bool>,
}

struct BusyGuard<'a>(&'a Composer);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.busy.store(false, Ordering::Release);
        self.0.busy_tx.send_replace(false);
    }
}

impl Composer {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        notifier: Arc<NotificationEmitter>,
        role: Sender,
        config: AppConfig,
    ) -> Self {
        let (busy_tx, _) = watch::channel(false);
        Self {
            store,
            notifier,
            role,
            config,
            draft: Mutex::new(String::new()),
            busy: AtomicBool::new(false),
            busy_tx,
        }
    }

    fn lock_draft(&self) -> MutexGuard<'_, String> {
        self.draft.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn draft(&self) -> String {
        self.lock_draft().clone()
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        *self.lock_draft() = text.into();
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Busy indicator; `true` while an operation is outstanding
    pub fn subscribe_busy(&self) -> watch::Receiver<bool> {
        self.busy_tx.subscribe()
    }

    fn begin(&self) -> Result<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ClientError::Busy)?;
        self.busy_tx.send_replace(true);
        Ok(BusyGuard(self))
    }

    fn report(&self, context: &str, err: &ClientError) {
        tracing::warn!("{} failed: {}", context, err);
        if err.is_toasted() {
            self.notifier.toast(ToastKind::Error, &err.user_message());
        }
    }

    /// Send `body` to `conversation`
    ///
    /// Whitespace-only bodies and a missing selection are rejected before
    /// any request. On success the draft is cleared and `view` refreshed.
    pub async fn send_text(
        &self,
        conversation: Option<u64>,
        body: &str,
        view: &dyn Refresh,
    ) -> Result<SendMessageResponse> {
        let conversation = conversation.ok_or(ClientError::NoConversation)?;
        let body = body.trim();
        if body.is_empty() {
            return Err(ClientError::validation("message", "Message is empty"));
        }
        let _busy = self.begin()?;

        let response = match self
            .store
            .send(SendMessageRequest::text(conversation, body, self.role))
            .await
        {
            Ok(response) => response,
            Err(e) => {
                self.report("Send", &e);
                return Err(e);
            }
        };

        self.lock_draft().clear();
        view.refresh().await;
        Ok(response)
    }

    /// Send each file as its own image message
    ///
    /// Files past the per-send cap are dropped with a warning. The remaining
    /// ones go out one at a time with a pause in between, followed by one
    /// refresh and a summary toast.
    pub async fn send_images(
        &self,
        conversation: Option<u64>,
        files: &[PathBuf],
        view: &dyn Refresh,
    ) -> Result<ImageBatch> {
        let conversation = conversation.ok_or(ClientError::NoConversation)?;
        if files.is_empty() {
            return Err(ClientError::validation("files", "No images selected"));
        }
        let _busy = self.begin()?;

        let cap = self.config.max_images_per_send;
        let skipped = files.len().saturating_sub(cap);
        if skipped > 0 {
            self.notifier.toast(
                ToastKind::Warning,
                &format!("You can send up to {} images at once; {} skipped", cap, skipped),
            );
        }

        let mut batch = ImageBatch {
            attempted: 0,
            succeeded: 0,
            skipped,
        };
        for (i, path) in files.iter().take(cap).enumerate() {
            if i > 0 {
                tokio::time::sleep(self.config.image_send_delay).await;
            }
            batch.attempted += 1;

            let data_uri = match encode_image(path, self.config.max_image_bytes).await {
                Ok(uri) => uri,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };
            match self
                .store
                .send(SendMessageRequest::image(conversation, data_uri, self.role))
                .await
            {
                Ok(_) => batch.succeeded += 1,
                Err(e) => tracing::warn!("Image {} failed: {}", path.display(), e),
            }
        }

        view.refresh().await;

        let kind = if batch.succeeded == batch.attempted {
            ToastKind::Success
        } else {
            ToastKind::Warning
        };
        self.notifier.toast(
            kind,
            &format!("Sent {} of {} images", batch.succeeded, batch.attempted),
        );
        Ok(batch)
    }

    /// Discard every message of `conversation` once the user confirms
    ///
    /// Returns `false` when the user declined; nothing is sent then.
    pub async fn clear_conversation(&self, conversation: u64, confirm: &dyn Confirm) -> Result<bool> {
        if !confirm.confirm("Clear all messages in this conversation?") {
            return Ok(false);
        }
        let _busy = self.begin()?;

        match self.store.clear(conversation).await {
            Ok(response) => {
                tracing::info!("Cleared {} messages from conversation {}", response.cleared, conversation);
                Ok(true)
            }
            Err(e) => {
                self.report("Clear", &e);
                Err(e)
            }
        }
    }
}

/// MIME type for an image file, by extension
pub fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// Read an image file into a `data:` URI
pub async fn encode_image(path: &Path, max_bytes: u64) -> Result<String> {
    let mime = image_mime(path)
        .ok_or_else(|| ClientError::validation("file", format!("{} is not an image", path.display())))?;
    let size = tokio::fs::metadata(path).await?.len();
    if size > max_bytes {
        return Err(ClientError::validation(
            "file",
            format!("{} is larger than {} bytes", path.display(), max_bytes),
        ));
    }
    let bytes = tokio::fs::read(path).await?;
    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}
