// src/render/report.rs
// =============================================================================
// JSON shapes for `--json` output.
//
// Binary previews are summarized (kind, size, transient url), never dumped.
// =============================================================================

use serde::Serialize;

use crate::api::{DirEntry, RepoRef};
use crate::browse::{PreviewResult, PreviewState, RepoView};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewSummary {
    pub path: String,
    /// text | markdown | image | video | unsupported | error | loading
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PreviewSummary {
    pub fn new(path: &str, state: Option<&PreviewState>) -> Self {
        let mut summary = PreviewSummary {
            path: path.to_string(),
            kind: "loading",
            text: None,
            size: None,
            url: None,
            error: None,
        };

        match state {
            None => {}
            Some(Err(e)) => {
                summary.kind = "error";
                summary.error = Some(e.to_string());
            }
            Some(Ok(result)) => {
                summary.kind = match result {
                    PreviewResult::Text { markdown: true, .. } => "markdown",
                    PreviewResult::Text { .. } => "text",
                    PreviewResult::Image(_) => "image",
                    PreviewResult::Video(_) => "video",
                    PreviewResult::UnsupportedBinary(_) => "unsupported",
                };
                summary.text = result.text().map(str::to_string);
                if let Some(blob) = result.binary() {
                    summary.size = Some(blob.len());
                    summary.url = Some(blob.url());
                }
            }
        }
        summary
    }
}

#[derive(Debug, Serialize)]
pub struct ViewReport {
    pub repo: RepoRef,
    pub branch: String,
    pub dir: String,
    pub entries: Vec<DirEntry>,
    pub previews: Vec<PreviewSummary>,
    pub readme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ViewReport {
    pub fn from_view(view: &RepoView) -> Self {
        let previews = view
            .previews()
            .iter()
            .map(|(entry, slot)| slot.inspect(|state| PreviewSummary::new(&entry.path, state)))
            .collect();

        ViewReport {
            repo: view.repo().clone(),
            branch: view.branch().to_string(),
            dir: view.dir().to_string(),
            entries: view.entries(),
            previews,
            readme: view.readme(),
            error: view.listing_error(),
        }
    }
}
