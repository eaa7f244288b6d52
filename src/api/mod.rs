// src/api/mod.rs
// =============================================================================
// Everything that talks HTTP to the repository hub.
//
// Submodules:
// - client: ApiClient, one method per endpoint
// - error: ApiError (transport / HTTP status / decode)
// - types: RepoRef, DirEntry and the JSON wire shapes
// =============================================================================

mod client;
mod error;
mod types;

pub use client::ApiClient;
pub(crate) use client::read_raw_text;
pub use error::ApiError;
pub use types::{DirEntry, EntryKind, RepoRef};
