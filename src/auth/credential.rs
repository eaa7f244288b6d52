// src/auth/credential.rs
// =============================================================================
// The current API key, held as an injected capability.
//
// Only login/logout change the credential. Everything else gets a clone of
// the holder and reads the value when it builds a request.
// =============================================================================

use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::info;

use super::store::{CredentialError, CredentialStore};

// An opaque API key. We never look inside it and never print it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    // The raw token, for building the Authorization header
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[derive(Debug, Clone)]
pub struct CredentialHolder {
    current: Arc<RwLock<Option<Credential>>>,
    store: Option<Arc<dyn CredentialStore>>,
}

impl CredentialHolder {
    // Builds a holder from whatever the store has persisted
    pub fn load(store: Arc<dyn CredentialStore>) -> Result<Self, CredentialError> {
        let initial = store.load()?;
        Ok(Self {
            current: Arc::new(RwLock::new(initial)),
            store: Some(store),
        })
    }

    // A holder that is never written to disk (e.g. --api-key)
    pub fn ephemeral(initial: Option<Credential>) -> Self {
        Self {
            current: Arc::new(RwLock::new(initial)),
            store: None,
        }
    }

    pub fn get(&self) -> Option<Credential> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn is_set(&self) -> bool {
        self.get().is_some()
    }

    // Persists first, so a failed write leaves the old value in place
    pub fn set(&self, credential: Credential) -> Result<(), CredentialError> {
        if let Some(store) = &self.store {
            store.save(&credential)?;
        }
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(credential);
        info!("credential updated");
        Ok(())
    }

    pub fn clear(&self) -> Result<(), CredentialError> {
        if let Some(store) = &self.store {
            store.clear()?;
        }
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        info!("credential cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::FileCredentialStore;

    #[test]
    fn test_debug_hides_token() {
        let credential = Credential::new("super-secret");
        assert!(!format!("{:?}", credential).contains("super-secret"));
    }

    #[test]
    fn test_ephemeral_holder() {
        let holder = CredentialHolder::ephemeral(None);
        assert!(!holder.is_set());

        holder.set(Credential::new("abc")).unwrap();
        assert_eq!(holder.get().unwrap().expose(), "abc");

        // Clones share the same value
        let other = holder.clone();
        other.clear().unwrap();
        assert!(!holder.is_set());
    }

    #[test]
    fn test_holder_persists_through_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credential.json");

        let holder = CredentialHolder::load(Arc::new(FileCredentialStore::new(&path))).unwrap();
        assert!(!holder.is_set());
        holder.set(Credential::new("persisted")).unwrap();

        // A fresh holder picks up the persisted value
        let reloaded = CredentialHolder::load(Arc::new(FileCredentialStore::new(&path))).unwrap();
        assert_eq!(reloaded.get().unwrap().expose(), "persisted");

        reloaded.clear().unwrap();
        assert!(!path.exists());
    }
}
