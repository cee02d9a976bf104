//! Persisted session state
//!
//! The console's equivalent of browser local storage: the bearer token plus a
//! few convenience keys, kept as one JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ClientResult;

use super::Session;

/// Everything the console remembers between runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub remembered_username: Option<String>,
    #[serde(default)]
    pub last_loan_id: Option<String>,
}

/// File-backed session store
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored state. A missing or unreadable file is an empty session.
    pub fn load(&self) -> StoredSession {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return StoredSession::default(),
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "Ignoring corrupt session file");
            StoredSession::default()
        })
    }

    pub fn save(&self, state: &StoredSession) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_vec_pretty(state)?)?;
        Ok(())
    }

    /// Store a fresh login, keeping the remembered username
    pub fn store_login(&self, token: &str, email: Option<&str>) -> ClientResult<()> {
        let mut state = self.load();
        state.token = Some(token.to_string());
        state.email = email.map(str::to_string);
        if let Some(email) = email {
            state.remembered_username = Some(email.to_string());
        }
        self.save(&state)
    }

    /// Forget the credentials but keep convenience keys
    pub fn clear(&self) -> ClientResult<()> {
        let mut state = self.load();
        state.token = None;
        state.email = None;
        self.save(&state)
    }

    pub fn remember_loan(&self, loan_id: &str) -> ClientResult<()> {
        let mut state = self.load();
        state.last_loan_id = Some(loan_id.to_string());
        self.save(&state)
    }

    /// Build the session context from what is on disk
    pub fn session(&self, super_admin_email: &str) -> Session {
        let state = self.load();
        Session::establish(state.token, state.email, super_admin_email)
    }
}
