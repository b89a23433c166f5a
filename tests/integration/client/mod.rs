//! Client tests against a Conversation Store over HTTP

#[cfg(feature = "server")]
mod customer_test;
#[cfg(feature = "server")]
mod operator_test;
mod session_expiry_test;
