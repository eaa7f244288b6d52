// src/browse/mod.rs
// =============================================================================
// The content retrieval and preview pipeline.
//
// Submodules:
// - classify: pure Content-Type / extension classification
// - blob: transient handles for binary preview content
// - slot: generation-guarded holders for async results
// - lister: directory listings
// - preview: single-file previews
// - readme: README auto-loading at the repository root
// - download: saving files and archives to disk
// - view: ties the pieces together for one repository page
// =============================================================================

mod blob;
mod classify;
mod download;
mod lister;
mod preview;
mod readme;
mod slot;
mod view;

pub use blob::BlobRegistry;
pub use download::{ArchiveDownloader, FileDownloader};
pub use lister::DirectoryLister;
pub use preview::{ContentPreviewResolver, PreviewResult, PreviewSlot, PreviewState};
pub use view::RepoView;
