// src/auth/store.rs
// =============================================================================
// Where the API key lives between runs.
//
// The holder (credential.rs) only talks to the CredentialStore trait, so the
// storage backend can be swapped: a JSON file in the user's config directory
// for the real CLI, or nothing at all for an ephemeral --api-key.
// =============================================================================

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

use super::Credential;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credential file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("credential file {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

// Persistence for a single credential
pub trait CredentialStore: Debug + Send + Sync {
    fn load(&self) -> Result<Option<Credential>, CredentialError>;
    fn save(&self, credential: &Credential) -> Result<(), CredentialError>;
    fn clear(&self) -> Result<(), CredentialError>;
}

// On-disk layout: {"apiKey": "..."}
#[derive(Serialize, Deserialize)]
struct StoredKey {
    #[serde(rename = "apiKey")]
    api_key: String,
}

#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_err(&self, source: io::Error) -> CredentialError {
        CredentialError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credential>, CredentialError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_err(e)),
        };

        let stored: StoredKey =
            serde_json::from_str(&content).map_err(|source| CredentialError::Json {
                path: self.path.clone(),
                source,
            })?;

        if stored.api_key.is_empty() {
            return Ok(None);
        }
        Ok(Some(Credential::new(stored.api_key)))
    }

    fn save(&self, credential: &Credential) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
            }
        }

        let stored = StoredKey {
            api_key: credential.expose().to_string(),
        };
        let content = serde_json::to_string_pretty(&stored).map_err(|source| {
            CredentialError::Json {
                path: self.path.clone(),
                source,
            }
        })?;

        fs::write(&self.path, content).map_err(|e| self.io_err(e))?;
        debug!(path = %self.path.display(), "stored credential");
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_err(e)),
        }
    }
}
