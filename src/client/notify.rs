//! Notification Emitter
//!
//! Turns the deltas of a tick into user-visible signals: a toast per
//! conversation, a platform notification while the host is in the
//! background, one audible cue per tick and a running unread total in the
//! window title. Nothing here can fail a tick; host errors are logged and
//! dropped.

use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tokio::sync::mpsc;

use crate::client::delta::{self, Delta};

/// Platform notification permission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Undetermined,
    Granted,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("notification permission denied")]
    PermissionDenied,
    #[error("notification host unavailable: {0}")]
    Unavailable(String),
}

/// Surface the emitter draws on
pub trait NotificationHost: Send + Sync {
    /// Whether the client currently has the user's attention
    fn is_visible(&self) -> bool;

    fn permission(&self) -> Permission;

    /// Ask the user once; returns the answer
    fn request_permission(&self) -> Permission;

    fn show_toast(&self, kind: ToastKind, text: &str);

    fn show_platform(&self, title: &str, body: &str) -> Result<(), NotifyError>;

    fn play_cue(&self) -> Result<(), NotifyError>;

    fn set_title(&self, title: &str);

    /// Per-conversation unread indicator; 0 hides it
    fn set_unread_badge(&self, conversation_id: u64, count: u64);
}

#[derive(Debug, Default)]
struct UnreadState {
    total: u64,
    per_conversation: HashMap<u64, u64>,
    permission_requested: bool,
}

pub struct NotificationEmitter {
    host: Arc<dyn NotificationHost>,
    default_title: String,
    state: Mutex<UnreadState>,
}

impl NotificationEmitter {
    pub fn new(host: Arc<dyn NotificationHost>, default_title: impl Into<String>) -> Self {
        Self {
            host,
            default_title: default_title.into(),
            state: Mutex::new(UnreadState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, UnreadState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Prompt for platform notifications, at most once per client
    pub fn init(&self) {
        let mut state = self.state();
        if state.permission_requested {
            return;
        }
        state.permission_requested = true;
        if self.host.permission() == Permission::Undetermined {
            let answer = self.host.request_permission();
            tracing::debug!("Notification permission answered: {:?}", answer);
        }
        self.host.set_title(&self.default_title);
    }

    /// Signal one tick's deltas
    ///
    /// `name_of` resolves a conversation id to the participant shown to the
    /// user.
    pub fn emit<F>(&self, deltas: &[Delta], name_of: F)
    where
        F: Fn(u64) -> String,
    {
        if deltas.is_empty() {
            return;
        }

        let background =
            !self.host.is_visible() && self.host.permission() == Permission::Granted;
        let mut state = self.state();

        for d in deltas {
            let name = name_of(d.conversation_id);
            let text = if d.count == 1 {
                format!("New message from {}", name)
            } else {
                format!("{} new messages from {}", d.count, name)
            };
            self.host.show_toast(ToastKind::Info, &text);

            if background {
                if let Err(e) = self.host.show_platform(&name, &text) {
                    tracing::debug!("Platform notification failed: {}", e);
                }
            }

            let unread = state.per_conversation.entry(d.conversation_id).or_insert(0);
            *unread += d.count;
            self.host.set_unread_badge(d.conversation_id, *unread);
        }

        if let Err(e) = self.host.play_cue() {
            tracing::debug!("Notification cue failed: {}", e);
        }

        state.total += delta::total(deltas);
        self.host.set_title(&unread_title(state.total, &self.default_title));
    }

    /// The user opened `conversation_id`
    ///
    /// Resets the unread total and the conversation's indicator and restores
    /// the default title.
    pub fn acknowledge(&self, conversation_id: u64) {
        let mut state = self.state();
        state.total = 0;
        if state.per_conversation.remove(&conversation_id).is_some() {
            self.host.set_unread_badge(conversation_id, 0);
        }
        self.host.set_title(&self.default_title);
    }

    /// Show a transient banner
    pub fn toast(&self, kind: ToastKind, text: &str) {
        self.host.show_toast(kind, text);
    }

    pub fn unread(&self) -> u64 {
        self.state().total
    }

    pub fn unread_for(&self, conversation_id: u64) -> u64 {
        self.state()
            .per_conversation
            .get(&conversation_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn title(&self) -> String {
        unread_title(self.state().total, &self.default_title)
    }
}

/// Window title for an unread total
pub fn unread_title(total: u64, default_title: &str) -> String {
    if total == 0 {
        default_title.to_string()
    } else {
        format!("({}) {}", total, default_title)
    }
}

/// Everything a [`ChannelHost`] was asked to show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    PermissionRequested,
    Toast { kind: ToastKind, text: String },
    Platform { title: String, body: String },
    Cue,
    Title(String),
    Badge { conversation_id: u64, count: u64 },
}

/// Host that forwards every signal over a channel
///
/// Used by tests and by embedders that render signals themselves.
pub struct ChannelHost {
    tx: mpsc::UnboundedSender<HostEvent>,
    visible: AtomicBool,
    permission: Mutex<Permission>,
    answer: Permission,
}

impl ChannelHost {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<HostEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let host = Self {
            tx,
            visible: AtomicBool::new(true),
            permission: Mutex::new(Permission::Undetermined),
            answer: Permission::Granted,
        };
        (host, rx)
    }

    /// Answer given when permission is requested
    pub fn with_answer(mut self, answer: Permission) -> Self {
        self.answer = answer;
        self
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::SeqCst);
    }

    fn send(&self, event: HostEvent) -> Result<(), NotifyError> {
        self.tx
            .send(event)
            .map_err(|_| NotifyError::Unavailable("receiver dropped".to_string()))
    }

    fn lock_permission(&self) -> MutexGuard<'_, Permission> {
        self.permission.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl NotificationHost for ChannelHost {
    fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    fn permission(&self) -> Permission {
        *self.lock_permission()
    }

    fn request_permission(&self) -> Permission {
        let _ = self.send(HostEvent::PermissionRequested);
        let mut permission = self.lock_permission();
        *permission = self.answer;
        *permission
    }

    fn show_toast(&self, kind: ToastKind, text: &str) {
        let _ = self.send(HostEvent::Toast {
            kind,
            text: text.to_string(),
        });
    }

    fn show_platform(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        if self.permission() != Permission::Granted {
            return Err(NotifyError::PermissionDenied);
        }
        self.send(HostEvent::Platform {
            title: title.to_string(),
            body: body.to_string(),
        })
    }

    fn play_cue(&self) -> Result<(), NotifyError> {
        self.send(HostEvent::Cue)
    }

    fn set_title(&self, title: &str) {
        let _ = self.send(HostEvent::Title(title.to_string()));
    }

    fn set_unread_badge(&self, conversation_id: u64, count: u64) {
        let _ = self.send(HostEvent::Badge {
            conversation_id,
            count,
        });
    }
}

/// Host for the terminal client
///
/// Toasts go to stderr, the title is set with an OSC escape and the cue is
/// the terminal bell. A terminal is always considered in the foreground.
#[derive(Debug, Default)]
pub struct TerminalHost;

impl TerminalHost {
    fn write(bytes: &str) -> Result<(), NotifyError> {
        let mut err = std::io::stderr().lock();
        err.write_all(bytes.as_bytes())
            .and_then(|_| err.flush())
            .map_err(|e| NotifyError::Unavailable(e.to_string()))
    }
}

impl NotificationHost for TerminalHost {
    fn is_visible(&self) -> bool {
        true
    }

    fn permission(&self) -> Permission {
        Permission::Denied
    }

    fn request_permission(&self) -> Permission {
        Permission::Denied
    }

    fn show_toast(&self, kind: ToastKind, text: &str) {
        let label = match kind {
            ToastKind::Info => "info",
            ToastKind::Success => "ok",
            ToastKind::Warning => "warn",
            ToastKind::Error => "error",
        };
        let _ = Self::write(&format!("[{}] {}\n", label, text));
    }

    fn show_platform(&self, _title: &str, _body: &str) -> Result<(), NotifyError> {
        Err(NotifyError::PermissionDenied)
    }

    fn play_cue(&self) -> Result<(), NotifyError> {
        Self::write("\x07")
    }

    fn set_title(&self, title: &str) {
        let _ = Self::write(&format!("\x1b]0;{}\x07", title));
    }

    fn set_unread_badge(&self, _conversation_id: u64, _count: u64) {}
}
