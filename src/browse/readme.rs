// src/browse/readme.rs
// =============================================================================
// Shows the repository README next to the root listing.
//
// Whenever the listing or the current directory changes:
// - not at the root            -> no README
// - no entry named README.md   -> no README (name compared case-insensitively)
// - otherwise                  -> preview that entry and keep its text
//
// Failures are quiet on purpose: a README that can't be fetched, isn't JSON
// text, or is empty just means "no README", with a warning in the log.
// =============================================================================

use tracing::{debug, warn};

use super::preview::{ContentPreviewResolver, PreviewResult, PreviewSlot};
use super::slot::Slot;
use crate::api::{DirEntry, RepoRef};

const README_NAME: &str = "README.md";

// Only the empty dir is the repository root
pub fn is_root(dir: &str) -> bool {
    dir.is_empty()
}

// First README.md in listing order, but only at the root
pub fn find_readme<'a>(entries: &'a [DirEntry], dir: &str) -> Option<&'a DirEntry> {
    if !is_root(dir) {
        return None;
    }
    entries
        .iter()
        .find(|entry| entry.is_file() && entry.filename.eq_ignore_ascii_case(README_NAME))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ReadmeKey {
    repo: RepoRef,
    branch: String,
    dir: String,
}

#[derive(Debug)]
pub struct ReadmeAutoLoader {
    resolver: ContentPreviewResolver,
    readme: Slot<ReadmeKey, Option<String>>,
}

impl ReadmeAutoLoader {
    pub fn new(resolver: ContentPreviewResolver) -> Self {
        Self {
            resolver,
            readme: Slot::new(),
        }
    }

    // The README text currently held, if any
    pub fn current(&self) -> Option<String> {
        self.readme.inspect(|held| held.cloned().flatten())
    }

    // Re-evaluates the README for a fresh listing of `dir`
    pub async fn refresh(&self, repo: &RepoRef, branch: &str, dir: &str, entries: &[DirEntry]) {
        let ticket = self.readme.begin(ReadmeKey {
            repo: repo.clone(),
            branch: branch.to_string(),
            dir: dir.to_string(),
        });

        let text = match find_readme(entries, dir) {
            Some(entry) => self.load_text(repo, branch, &entry.path).await,
            None => None,
        };

        if self.readme.commit(&ticket, text).is_err() {
            let key = ticket.key();
            debug!(repo = %key.repo, branch = %key.branch, dir = %key.dir, "dropping stale README");
        }
    }

    pub fn teardown(&self) {
        self.readme.teardown();
    }

    // Runs the README through its own preview slot and keeps only text
    async fn load_text(&self, repo: &RepoRef, branch: &str, path: &str) -> Option<String> {
        let slot = PreviewSlot::new();
        self.resolver.load_into(&slot, repo, branch, path).await;

        let text = match slot.take() {
            Some(Ok(PreviewResult::Text { content, .. })) => Some(content),
            Some(Ok(other)) => {
                warn!(path, "README was not served as text, skipping it");
                // Releases the binary ref
                drop(other);
                None
            }
            Some(Err(e)) => {
                warn!(path, error = %e, "could not load README");
                None
            }
            None => None,
        };

        text.filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiClient, EntryKind};
    use crate::auth::CredentialHolder;
    use crate::browse::blob::BlobRegistry;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PREVIEW_PATH: &str = "/api/repos/ox/CatDogBBox/preview_file";

    fn file(name: &str, path: &str) -> DirEntry {
        DirEntry {
            filename: name.to_string(),
            path: path.to_string(),
            kind: EntryKind::File,
        }
    }

    fn loader_for(server: &MockServer) -> ReadmeAutoLoader {
        let client = ApiClient::new(&server.uri(), CredentialHolder::ephemeral(None)).unwrap();
        ReadmeAutoLoader::new(ContentPreviewResolver::new(client, BlobRegistry::new()))
    }

    fn repo() -> RepoRef {
        RepoRef::new("ox", "CatDogBBox")
    }

    #[test]
    fn test_find_readme_case_insensitive() {
        let entries = vec![file("Readme.MD", "Readme.MD")];
        assert_eq!(find_readme(&entries, "").map(|e| e.path.as_str()), Some("Readme.MD"));
    }

    #[test]
    fn test_find_readme_only_at_root() {
        let entries = vec![file("Readme.MD", "Readme.MD")];
        assert!(find_readme(&entries, "docs").is_none());
    }

    #[test]
    fn test_only_empty_dir_is_root() {
        assert!(is_root(""));
        assert!(!is_root("/"));
        assert!(!is_root("//"));

        let entries = vec![file("README.md", "README.md")];
        assert!(find_readme(&entries, "/").is_none());
    }

    #[test]
    fn test_find_readme_first_match_wins() {
        let entries = vec![
            file("data.csv", "data.csv"),
            file("readme.md", "readme.md"),
            file("README.md", "README.md"),
        ];
        assert_eq!(find_readme(&entries, "").unwrap().path, "readme.md");
    }

    #[test]
    fn test_find_readme_ignores_other_names_and_dirs() {
        let entries = vec![
            file("README.txt", "README.txt"),
            file("README", "README"),
            DirEntry {
                filename: "README.md".to_string(),
                path: "README.md".to_string(),
                kind: EntryKind::Dir,
            },
        ];
        assert!(find_readme(&entries, "").is_none());
    }

    #[tokio::test]
    async fn test_loads_readme_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PREVIEW_PATH))
            .and(query_param("filePath", "README.md"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rawText": "# Cats and dogs"})))
            .expect(1)
            .mount(&server)
            .await;

        let loader = loader_for(&server);
        loader
            .refresh(&repo(), "main", "", &[file("README.md", "README.md")])
            .await;
        assert_eq!(loader.current().as_deref(), Some("# Cats and dogs"));

        // Moving into a subdirectory clears it without another request
        loader
            .refresh(&repo(), "main", "docs", &[file("README.md", "docs/README.md")])
            .await;
        assert!(loader.current().is_none());
    }

    #[tokio::test]
    async fn test_failed_readme_is_silently_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PREVIEW_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
            .mount(&server)
            .await;

        let loader = loader_for(&server);
        loader
            .refresh(&repo(), "main", "", &[file("README.md", "README.md")])
            .await;
        assert!(loader.current().is_none());
    }

    #[tokio::test]
    async fn test_binary_readme_is_skipped_and_released() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PREVIEW_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_raw(b"# hi".to_vec(), "text/markdown"))
            .mount(&server)
            .await;

        let loader = loader_for(&server);
        loader
            .refresh(&repo(), "main", "", &[file("README.md", "README.md")])
            .await;

        assert!(loader.current().is_none());
        let stats = loader.resolver.blobs().stats();
        assert_eq!(stats.allocated, 1);
        assert_eq!(stats.live, 0);
    }
}
