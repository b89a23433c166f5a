use std::time::Duration;

use crate::shared::config::{AppConfig, AppConfigBuilder, ConfigError};
use crate::shared::messaging::Action;

/// Default Conversation Store endpoint
const DEFAULT_STORE_URL: &str = "http://127.0.0.1:3000/api/chat";

/// Client configuration wrapper.
///
/// Holds the validated [`AppConfig`] and the operator bearer token once a
/// login succeeded.
#[derive(Debug, Clone)]
pub struct Config {
    app: AppConfig,
    token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let mut builder = AppConfig::builder().store_url(
            std::env::var("SUPPORT_STORE_URL").unwrap_or_else(|_| DEFAULT_STORE_URL.to_string()),
        );
        if let Some(secs) = std::env::var("SUPPORT_POLL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
        {
            builder = builder.poll_interval(Duration::from_secs(secs));
        }
        let app = builder.build().unwrap_or_else(|e| {
            tracing::warn!("Ignoring invalid client configuration from environment: {}", e);
            AppConfig {
                store_url: Some(DEFAULT_STORE_URL.to_string()),
                ..AppConfig::default()
            }
        });
        Self { app, token: None }
    }
}

impl Config {
    /// Create a new configuration from the environment
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builder(builder: AppConfigBuilder) -> Result<Self, ConfigError> {
        let app = builder.build()?;
        Ok(Self { app, token: None })
    }

    /// Set the operator token
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Get the operator token
    pub fn get_token(&self) -> Option<&String> {
        self.token.as_ref()
    }

    /// Clear the token (logout)
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Full URL of a store action
    pub fn action_url(&self, action: Action) -> String {
        format!("{}?action={}", self.store_url(), action.as_str())
    }

    pub fn store_url(&self) -> &str {
        self.app.store_url.as_deref().unwrap_or(DEFAULT_STORE_URL)
    }

    pub fn app(&self) -> &AppConfig {
        &self.app
    }

    pub fn poll_interval(&self) -> Duration {
        self.app.poll_interval
    }
}
