// src/browse/lister.rs
// =============================================================================
// Directory listings.
//
// list() is a plain fetch. refresh() is what a view calls whenever repo,
// branch or dir changes: it runs the fetch through a ListingSlot so that a
// slow, superseded request can never overwrite a newer listing.
// =============================================================================

use thiserror::Error;
use tracing::debug;

use super::slot::Slot;
use crate::api::{ApiClient, ApiError, DirEntry, RepoRef};

#[derive(Debug, Error)]
#[error("failed to list '{dir}': {source}")]
pub struct ListError {
    pub dir: String,
    #[source]
    pub source: ApiError,
}

// What a listing was requested for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingKey {
    pub repo: RepoRef,
    pub branch: String,
    pub dir: String,
}

pub type ListingSlot = Slot<ListingKey, Result<Vec<DirEntry>, ListError>>;

#[derive(Debug, Clone)]
pub struct DirectoryLister {
    client: ApiClient,
}

impl DirectoryLister {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        repo: &RepoRef,
        branch: &str,
        dir: &str,
    ) -> Result<Vec<DirEntry>, ListError> {
        self.client
            .list_dir(repo, branch, dir)
            .await
            .map_err(|source| ListError {
                dir: dir.to_string(),
                source,
            })
    }

    // Re-lists into `slot`
    //
    // Returns true if this call's result was installed, false if a newer
    // refresh (or a teardown) happened while it was in flight.
    pub async fn refresh(&self, slot: &ListingSlot, repo: &RepoRef, branch: &str, dir: &str) -> bool {
        let ticket = slot.begin(ListingKey {
            repo: repo.clone(),
            branch: branch.to_string(),
            dir: dir.to_string(),
        });

        let result = self.list(repo, branch, dir).await;

        match slot.commit(&ticket, result) {
            Ok(()) => true,
            Err(_stale) => {
                let key = ticket.key();
                debug!(repo = %key.repo, branch = %key.branch, dir = %key.dir, "dropping superseded listing");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::EntryKind;
    use crate::auth::CredentialHolder;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LIST_PATH: &str = "/api/repos/ox/CatDogBBox/list";

    fn lister_for(server: &MockServer) -> DirectoryLister {
        let client = ApiClient::new(&server.uri(), CredentialHolder::ephemeral(None)).unwrap();
        DirectoryLister::new(client)
    }

    fn repo() -> RepoRef {
        RepoRef::new("ox", "CatDogBBox")
    }

    #[tokio::test]
    async fn test_list_root() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(LIST_PATH))
            .and(query_param("branch", "main"))
            .and(query_param("dir", ""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "entries": [{"filename": "data.csv", "path": "data.csv", "type": "file"}]
            })))
            .mount(&server)
            .await;

        let entries = lister_for(&server).list(&repo(), "main", "").await.unwrap();
        assert_eq!(
            entries,
            vec![DirEntry {
                filename: "data.csv".to_string(),
                path: "data.csv".to_string(),
                kind: EntryKind::File,
            }]
        );
    }

    #[tokio::test]
    async fn test_keeps_server_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(LIST_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "entries": [
                    {"filename": "zeta.txt", "path": "zeta.txt", "type": "text"},
                    {"filename": "alpha", "path": "alpha", "type": "dir"},
                    {"filename": "Mid.png", "path": "Mid.png", "type": "image"}
                ]
            })))
            .mount(&server)
            .await;

        let entries = lister_for(&server).list(&repo(), "main", "").await.unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.filename.as_str()).collect();
        assert_eq!(names, ["zeta.txt", "alpha", "Mid.png"]);
    }

    #[tokio::test]
    async fn test_error_message_from_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(LIST_PATH))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Not logged in"})))
            .mount(&server)
            .await;

        let err = lister_for(&server).list(&repo(), "main", "docs").await.unwrap_err();
        assert_eq!(err.dir, "docs");
        assert_eq!(err.to_string(), "failed to list 'docs': Not logged in (HTTP 401)");
    }

    #[tokio::test]
    async fn test_generic_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(LIST_PATH))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = lister_for(&server).list(&repo(), "main", "").await.unwrap_err();
        assert!(err.to_string().contains("request failed with status 500"));
    }

    #[tokio::test]
    async fn test_superseded_listing_never_overwrites() {
        let server = MockServer::start().await;
        // The first request (root of main) is slow...
        Mock::given(method("GET"))
            .and(path(LIST_PATH))
            .and(query_param("dir", ""))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(300))
                    .set_body_json(json!({
                        "entries": [{"filename": "old.txt", "path": "old.txt", "type": "file"}]
                    })),
            )
            .mount(&server)
            .await;
        // ...the second (docs on dev) is fast
        Mock::given(method("GET"))
            .and(path(LIST_PATH))
            .and(query_param("dir", "docs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "entries": [{"filename": "new.md", "path": "docs/new.md", "type": "file"}]
            })))
            .mount(&server)
            .await;

        let lister = lister_for(&server);
        let slot = ListingSlot::new();
        let repo = repo();

        let old = lister.refresh(&slot, &repo, "main", "");
        let new = async {
            // Let the first request get going before superseding it
            tokio::time::sleep(Duration::from_millis(50)).await;
            lister.refresh(&slot, &repo, "dev", "docs").await
        };
        let (old_installed, new_installed) = tokio::join!(old, new);

        assert!(!old_installed);
        assert!(new_installed);
        let paths = slot.inspect(|listing| {
            listing
                .and_then(|r| r.as_ref().ok())
                .map(|entries| entries.iter().map(|e| e.path.clone()).collect::<Vec<_>>())
        });
        assert_eq!(paths, Some(vec!["docs/new.md".to_string()]));
    }
}
