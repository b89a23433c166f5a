//! Conversation Store endpoint tests

mod auth_test;
mod chat_test;
