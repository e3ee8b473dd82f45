//! Persisted session token storage.
//!
//! The token and the cached profile live in one JSON document under the
//! keys `authToken` and `user`. [`FileTokenStore`] writes it atomically;
//! [`MemoryTokenStore`] keeps it for the life of the process.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::api::UserProfile;

/// Errors that can occur reading or writing the token store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Corrupt session file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A persisted session: the bearer token and the last known profile.
#[derive(Debug, Clone)]
pub struct StoredSession {
    pub token: SecretString,
    pub user: Option<UserProfile>,
}

impl StoredSession {
    #[must_use]
    pub fn new(token: impl Into<String>, user: Option<UserProfile>) -> Self {
        Self {
            token: SecretString::from(token.into()),
            user,
        }
    }
}

/// Where the session token is persisted between runs.
pub trait TokenStore: Send + Sync {
    /// Load the stored session, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store exists but cannot be read.
    fn load(&self) -> Result<Option<StoredSession>, StorageError>;

    /// Replace the stored session.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn save(&self, session: &StoredSession) -> Result<(), StorageError>;

    /// Remove the stored session. Clearing an empty store succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be removed.
    fn clear(&self) -> Result<(), StorageError>;
}

/// On-disk layout.
#[derive(Serialize, Deserialize)]
struct SessionDocument {
    #[serde(rename = "authToken")]
    auth_token: String,
    #[serde(default)]
    user: Option<UserProfile>,
}

// =============================================================================
// FileTokenStore
// =============================================================================

/// Token store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<StoredSession>, StorageError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let document: SessionDocument = serde_json::from_str(&contents)?;
        if document.auth_token.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(StoredSession::new(document.auth_token, document.user)))
    }

    fn save(&self, session: &StoredSession) -> Result<(), StorageError> {
        let document = SessionDocument {
            auth_token: session.token.expose_secret().to_string(),
            user: session.user.clone(),
        };
        let json = serde_json::to_vec_pretty(&document)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        // Write then rename so a crash never leaves a half-written token. The
        // temp file is owner-only from creation and removed if the rename fails.
        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(&json)?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| e.error)?;

        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// MemoryTokenStore
// =============================================================================

/// Token store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    session: Mutex<Option<StoredSession>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `session`.
    #[must_use]
    pub fn with_session(session: StoredSession) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<StoredSession>, StorageError> {
        Ok(self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, session: &StoredSession) -> Result<(), StorageError> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
