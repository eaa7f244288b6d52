// src/browse/preview.rs
// =============================================================================
// Inline previews of single files.
//
// resolve() does one fetch:
// 1. GET preview_file for (repo, branch, path)
// 2. non-2xx -> error, no binary fallback
// 3. Content-Type picks the read strategy (classify.rs stage 1)
// 4. JSON: pull out rawText, flag it as markdown for .md files
// 5. anything else: read all bytes into a TransientBinaryRef and pick
//    Image / Video / UnsupportedBinary from the extension
//
// load_into() runs resolve() for a PreviewSlot. Only the newest request for
// a slot may install its result. A stale result is dropped on arrival, which
// releases its binary ref right away.
// =============================================================================

use thiserror::Error;
use tracing::debug;

use super::blob::{BlobRegistry, TransientBinaryRef};
use super::classify::{self, BinaryKind, RenderStrategy};
use super::slot::Slot;
use crate::api::{read_raw_text, ApiClient, ApiError, RepoRef};

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("could not fetch preview: {0}")]
    Fetch(#[source] ApiError),

    #[error("could not decode preview: {0}")]
    Decode(String),
}

impl From<ApiError> for PreviewError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Decode(message) => PreviewError::Decode(message),
            other => PreviewError::Fetch(other),
        }
    }
}

// What a preview renders as. Exactly one of these per slot.
#[derive(Debug)]
pub enum PreviewResult {
    Text { content: String, markdown: bool },
    Image(TransientBinaryRef),
    Video(TransientBinaryRef),
    UnsupportedBinary(TransientBinaryRef),
}

impl PreviewResult {
    pub fn binary(&self) -> Option<&TransientBinaryRef> {
        match self {
            PreviewResult::Text { .. } => None,
            PreviewResult::Image(blob)
            | PreviewResult::Video(blob)
            | PreviewResult::UnsupportedBinary(blob) => Some(blob),
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            PreviewResult::Text { content, .. } => Some(content),
            _ => None,
        }
    }
}

// A finished load: either something to show or an error to show instead.
// While a load is in flight the slot simply holds nothing.
pub type PreviewState = Result<PreviewResult, PreviewError>;

// Identity of a preview request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewKey {
    pub repo: RepoRef,
    pub branch: String,
    pub path: String,
}

pub type PreviewSlot = Slot<PreviewKey, PreviewState>;

#[derive(Debug, Clone)]
pub struct ContentPreviewResolver {
    client: ApiClient,
    blobs: BlobRegistry,
}

impl ContentPreviewResolver {
    pub fn new(client: ApiClient, blobs: BlobRegistry) -> Self {
        Self { client, blobs }
    }

    pub fn blobs(&self) -> &BlobRegistry {
        &self.blobs
    }

    pub async fn resolve(
        &self,
        repo: &RepoRef,
        branch: &str,
        path: &str,
    ) -> Result<PreviewResult, PreviewError> {
        let preview = self.client.preview_file(repo, branch, path).await?;
        let extension = classify::extension_of(path);

        match classify::classify(&extension, &preview.content_type) {
            RenderStrategy::JsonText => {
                let content = read_raw_text(preview.response).await?;
                Ok(PreviewResult::Text {
                    content,
                    markdown: classify::is_markdown(&extension),
                })
            }
            RenderStrategy::RawBinary => {
                let bytes = preview
                    .response
                    .bytes()
                    .await
                    .map_err(|e| PreviewError::Fetch(ApiError::Transport(e)))?;
                let blob = self.blobs.allocate(bytes.to_vec());

                Ok(match classify::binary_kind(&extension) {
                    BinaryKind::Image => PreviewResult::Image(blob),
                    BinaryKind::Video => PreviewResult::Video(blob),
                    BinaryKind::Unsupported => PreviewResult::UnsupportedBinary(blob),
                })
            }
        }
    }

    // Resolves (repo, branch, path) into `slot`
    //
    // Errors end up in the slot too, replacing (and releasing) whatever was
    // there before. Returns true if the result was installed.
    pub async fn load_into(
        &self,
        slot: &PreviewSlot,
        repo: &RepoRef,
        branch: &str,
        path: &str,
    ) -> bool {
        let ticket = slot.begin(PreviewKey {
            repo: repo.clone(),
            branch: branch.to_string(),
            path: path.to_string(),
        });

        let state = self.resolve(repo, branch, path).await;
        if let Err(e) = &state {
            debug!(path, error = %e, "preview failed");
        }

        match slot.commit(&ticket, state) {
            Ok(()) => true,
            Err(stale) => {
                let key = ticket.key();
                debug!(repo = %key.repo, branch = %key.branch, path = %key.path, "dropping stale preview");
                drop(stale);
                false
            }
        }
    }
}
