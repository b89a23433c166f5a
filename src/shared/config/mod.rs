//! Application configuration module
//!
//! Tunables of the chat clients. Values are validated once by
//! [`AppConfigBuilder::build`] so the rest of the crate can rely on them.

use std::time::Duration;
use thiserror::Error;

/// Interval between two sync ticks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
/// Upper bound of images accepted by one send
pub const DEFAULT_MAX_IMAGES_PER_SEND: usize = 5;
/// Pause between two image submissions of the same batch
pub const DEFAULT_IMAGE_SEND_DELAY: Duration = Duration::from_millis(300);
/// Largest image file that will be inlined
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;
/// Longest a single store request may take before it is abandoned
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
/// Window title shown while nothing is unread
pub const DEFAULT_TITLE: &str = "Support";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Conversation Store endpoint
    pub store_url: Option<String>,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub max_images_per_send: usize,
    pub image_send_delay: Duration,
    pub max_image_bytes: u64,
    pub default_title: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_url: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_images_per_send: DEFAULT_MAX_IMAGES_PER_SEND,
            image_send_delay: DEFAULT_IMAGE_SEND_DELAY,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            default_title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.store_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl(url.clone()));
            }
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "poll_interval",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.max_images_per_send == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_images_per_send",
                message: "must allow at least one image".to_string(),
            });
        }
        if self.default_title.trim().is_empty() {
            return Err(ConfigError::MissingValue("default_title"));
        }
        Ok(())
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    store_url: Option<String>,
    poll_interval: Option<Duration>,
    request_timeout: Option<Duration>,
    max_images_per_send: Option<usize>,
    image_send_delay: Option<Duration>,
    max_image_bytes: Option<u64>,
    default_title: Option<String>,
}

impl AppConfigBuilder {
    /// Set the Conversation Store URL
    pub fn store_url(mut self, url: impl Into<String>) -> Self {
        self.store_url = Some(normalize_url(&url.into()));
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Upper bound on one store request, sync fetches included
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn max_images_per_send(mut self, max: usize) -> Self {
        self.max_images_per_send = Some(max);
        self
    }

    pub fn image_send_delay(mut self, delay: Duration) -> Self {
        self.image_send_delay = Some(delay);
        self
    }

    pub fn max_image_bytes(mut self, max: u64) -> Self {
        self.max_image_bytes = Some(max);
        self
    }

    pub fn default_title(mut self, title: impl Into<String>) -> Self {
        self.default_title = Some(title.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            store_url: self.store_url,
            poll_interval: self.poll_interval.unwrap_or(defaults.poll_interval),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            max_images_per_send: self
                .max_images_per_send
                .unwrap_or(defaults.max_images_per_send),
            image_send_delay: self.image_send_delay.unwrap_or(defaults.image_send_delay),
            max_image_bytes: self.max_image_bytes.unwrap_or(defaults.max_image_bytes),
            default_title: self.default_title.unwrap_or(defaults.default_title),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Trim whitespace and trailing slashes off an endpoint URL
fn normalize_url(input: &str) -> String {
    input.trim().trim_end_matches('/').to_string()
}

/// Configuration errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },
}
