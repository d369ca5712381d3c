//! Authenticated session context
//!
//! The auth token and user profile are persisted as JSON in the platform
//! data directory. A [`SessionContext`] is created once at startup and handed
//! to the API client, which clears it when the backend answers 401.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment override for the session file location
pub const SESSION_FILE_ENV: &str = "INNKEEPER_SESSION_FILE";

/// Profile of the logged-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
}

impl UserProfile {
    /// Whether this user may use the admin back-office
    pub fn is_admin(&self) -> bool {
        self.role.eq_ignore_ascii_case("admin")
    }
}

/// A stored login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

/// Errors that can occur while persisting a session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No data directory available for the session file")]
    NoDataDir,

    #[error("Failed to write session file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode session: {0}")]
    Encode(#[from] serde_json::Error),
}

/// File-backed session storage
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: Option<PathBuf>,
}

impl SessionStore {
    /// Store at the default location (env override, then platform data dir)
    pub fn default_location() -> Self {
        let path = std::env::var_os(SESSION_FILE_ENV)
            .map(PathBuf::from)
            .or_else(|| {
                directories::ProjectDirs::from("", "", "innkeeper")
                    .map(|dirs| dirs.data_dir().join("session.json"))
            });
        Self { path }
    }

    /// Store at an explicit path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Path of the session file, if one could be determined
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read the stored session. A missing or corrupt file reads as no session.
    pub fn load(&self) -> Option<Session> {
        let path = self.path.as_ref()?;
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable session file");
                None
            }
        }
    }

    /// Persist a session
    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        let path = self.path.as_ref().ok_or(SessionError::NoDataDir)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| SessionError::Write {
                path: path.clone(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(session)?;
        std::fs::write(path, json).map_err(|source| SessionError::Write {
            path: path.clone(),
            source,
        })
    }

    /// Remove the stored session
    pub fn clear(&self) -> Result<(), SessionError> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SessionError::Write {
                path: path.clone(),
                source,
            }),
        }
    }
}

/// Process-wide session state: loaded at startup, torn down on logout or 401
#[derive(Debug)]
pub struct SessionContext {
    store: SessionStore,
    current: RefCell<Option<Session>>,
}

impl SessionContext {
    /// Load the stored session, if any
    pub fn load(store: SessionStore) -> Self {
        let current = store.load();
        Self {
            store,
            current: RefCell::new(current),
        }
    }

    /// Context with no session and no backing file
    pub fn anonymous() -> Self {
        Self {
            store: SessionStore { path: None },
            current: RefCell::new(None),
        }
    }

    /// Current bearer token
    pub fn token(&self) -> Option<String> {
        self.current.borrow().as_ref().map(|s| s.token.clone())
    }

    /// Current user profile
    pub fn user(&self) -> Option<UserProfile> {
        self.current.borrow().as_ref().map(|s| s.user.clone())
    }

    /// Whether a session is active
    pub fn is_authenticated(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Start a session and persist it. The session is active even when
    /// saving fails; it then lasts for this process only.
    pub fn begin(&self, session: Session) -> Result<(), SessionError> {
        tracing::info!(user = %session.user.email, "session started");
        let saved = self.store.save(&session);
        *self.current.borrow_mut() = Some(session);
        saved
    }

    /// Drop the session from memory and storage
    pub fn end(&self) {
        *self.current.borrow_mut() = None;
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "failed to remove session file");
        }
        tracing::info!("session cleared");
    }
}
