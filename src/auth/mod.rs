// src/auth/mod.rs
// =============================================================================
// Credential handling.
//
// Submodules:
// - credential: the Credential type and the shared CredentialHolder
// - store: persistence of the API key between runs
// =============================================================================

mod credential;
mod store;

pub use credential::{Credential, CredentialHolder};
pub use store::FileCredentialStore;
