//! Integration tests

#[cfg(feature = "server")]
mod api;
mod client;
#[cfg(feature = "server")]
mod database;
