//! # Chat clients
//!
//! The customer widget and the operator console. Both keep a local view of
//! the Conversation Store fresh with a [`sync::SyncLoop`], classify new
//! arrivals with the [`delta`] detector and signal them through the
//! [`notify::NotificationEmitter`]. Outgoing messages go through the
//! [`composer::Composer`].
//!
//! ## Components
//!
//! - **store**: [`store::ConversationStore`] seam and its HTTP client
//! - **sync**: timer-driven fetch-and-apply loop
//! - **delta**: count comparison against the local snapshot
//! - **notify**: toasts, platform notifications, cue and unread title
//! - **composer**: text and image submission, conversation clearing
//! - **session**: persisted customer identity and operator token

pub mod composer;
pub mod config;
pub mod customer;
pub mod delta;
pub mod error;
pub mod notify;
pub mod operator;
pub mod session;
pub mod store;
pub mod sync;
pub mod thread;

pub use config::Config;
pub use customer::CustomerWidget;
pub use error::{ClientError, ErrorKind, Result};
pub use operator::OperatorConsole;
pub use store::{ConversationStore, HttpStore};
