//! Session persistence
//!
//! The customer's registration and the operator's bearer token survive
//! restarts as small TOML files. The message count snapshot is never written
//! here.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::client::error::Result;
use crate::shared::SharedError;

const APP_DIR: &str = "supportdesk";

/// Persisted customer identity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerSession {
    pub user_id: u64,
    pub email: String,
}

/// Persisted operator credentials
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperatorSession {
    pub token: String,
}

/// File-backed session store
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    /// Session store under the platform config directory
    pub fn new() -> Self {
        let mut dir = dirs::config_dir().unwrap_or_else(std::env::temp_dir);
        dir.push(APP_DIR);
        Self { dir }
    }

    /// Session store rooted at an explicit directory
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn load_customer(&self) -> Result<Option<CustomerSession>> {
        self.load("customer.toml")
    }

    pub fn save_customer(&self, session: &CustomerSession) -> Result<()> {
        self.save("customer.toml", session)
    }

    pub fn clear_customer(&self) -> Result<()> {
        self.remove("customer.toml")
    }

    pub fn load_operator(&self) -> Result<Option<OperatorSession>> {
        self.load("operator.toml")
    }

    pub fn save_operator(&self, session: &OperatorSession) -> Result<()> {
        self.save("operator.toml", session)
    }

    pub fn clear_operator(&self) -> Result<()> {
        self.remove("operator.toml")
    }

    fn load<T: for<'de> Deserialize<'de>>(&self, name: &str) -> Result<Option<T>> {
        let path = self.dir.join(name);
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)?;
        match toml::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                // A corrupt file behaves like a missing session
                tracing::warn!("Discarding unreadable session file {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }

    fn save<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let raw = toml::to_string(value).map_err(|e| SharedError::serialization(e.to_string()))?;
        fs::write(self.dir.join(name), raw)?;
        tracing::debug!("Saved session {}", name);
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<()> {
        let path = self.dir.join(name);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
