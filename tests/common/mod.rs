//! Common test utilities and helpers
//!
//! - Spawning a live Conversation Store on an ephemeral port
//! - Operator credentials and tokens
//! - Client fixtures wired to a [`ChannelHost`]
//! - Custom assertion macros
//!
//! [`ChannelHost`]: supportdesk::client::notify::ChannelHost

#![allow(dead_code)]

pub mod assertions;

pub use clients::*;
#[cfg(feature = "server")]
pub use store_server::*;
