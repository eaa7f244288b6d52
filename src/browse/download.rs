// src/browse/download.rs
// =============================================================================
// Saving files and whole-repository archives to local disk.
//
// Both downloads fetch the complete body first and only then touch the disk.
// The write goes to "<dir>/.<name>.part" and is renamed into place, and a
// failed write removes the .part file, so a failure never leaves a partial
// file behind. No retries.
// =============================================================================

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::api::{ApiClient, ApiError, RepoRef};

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("download failed: {0}")]
    Api(#[from] ApiError),

    #[error("could not save {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

// Name to save a repo file under: the text after the last "/"
//
// Examples:
//   "images/cat.jpg" -> "cat.jpg"
//   "data.csv"       -> "data.csv"
//   "docs/"          -> "download"
pub fn suggested_filename(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    if name.is_empty() {
        "download".to_string()
    } else {
        name.to_string()
    }
}

// Name of a repository archive: "{namespace}_{name}.zip"
pub fn archive_filename(repo: &RepoRef) -> String {
    format!("{}_{}.zip", repo.namespace(), repo.name())
}

#[derive(Debug, Clone)]
pub struct FileDownloader {
    client: ApiClient,
    dest_dir: PathBuf,
}

impl FileDownloader {
    pub fn new(client: ApiClient, dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            dest_dir: dest_dir.into(),
        }
    }

    // Downloads one file and returns where it was saved
    pub async fn download_file(
        &self,
        repo: &RepoRef,
        branch: &str,
        path: &str,
    ) -> Result<PathBuf, DownloadError> {
        let bytes = self.client.download_file(repo, branch, path).await?;
        let saved = save_file(&self.dest_dir, &suggested_filename(path), &bytes).await?;
        info!(repo = %repo, branch, path, saved = %saved.display(), "downloaded file");
        Ok(saved)
    }
}

#[derive(Debug, Clone)]
pub struct ArchiveDownloader {
    client: ApiClient,
    dest_dir: PathBuf,
}

impl ArchiveDownloader {
    pub fn new(client: ApiClient, dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            dest_dir: dest_dir.into(),
        }
    }

    // Downloads a zip of the repository at `branch`
    //
    // `shallow` is forwarded to the server untouched.
    pub async fn download_archive(
        &self,
        repo: &RepoRef,
        branch: &str,
        shallow: bool,
    ) -> Result<PathBuf, DownloadError> {
        let bytes = self.client.download_repo(repo, branch, shallow).await?;
        let saved = save_file(&self.dest_dir, &archive_filename(repo), &bytes).await?;
        info!(repo = %repo, branch, shallow, saved = %saved.display(), "downloaded archive");
        Ok(saved)
    }
}

// Writes `bytes` to `dir/name` via a temporary .part file
async fn save_file(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf, DownloadError> {
    let target = dir.join(name);
    let partial = dir.join(format!(".{name}.part"));

    let written: io::Result<()> = async {
        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(&partial, bytes).await?;
        tokio::fs::rename(&partial, &target).await
    }
    .await;

    if let Err(source) = written {
        // Best effort; the .part file may not exist at all
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(DownloadError::Io {
            path: target,
            source,
        });
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CredentialHolder;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(&server.uri(), CredentialHolder::ephemeral(None)).unwrap()
    }

    fn repo() -> RepoRef {
        RepoRef::new("ox", "CatDogBBox")
    }

    #[test]
    fn test_suggested_filename() {
        assert_eq!(suggested_filename("images/cat.jpg"), "cat.jpg");
        assert_eq!(suggested_filename("a/b/c/data.csv"), "data.csv");
        assert_eq!(suggested_filename("data.csv"), "data.csv");
        assert_eq!(suggested_filename("docs/"), "download");
    }

    #[test]
    fn test_archive_filename() {
        assert_eq!(archive_filename(&repo()), "ox_CatDogBBox.zip");
    }

    #[tokio::test]
    async fn test_download_file_saves_last_segment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/repos/ox/CatDogBBox/download_file"))
            .and(query_param("branch", "main"))
            .and(query_param("filePath", "images/cat.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg bytes".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let downloader = FileDownloader::new(client_for(&server), dir.path());
        let saved = downloader
            .download_file(&repo(), "main", "images/cat.jpg")
            .await
            .unwrap();

        assert_eq!(saved, dir.path().join("cat.jpg"));
        assert_eq!(std::fs::read(&saved).unwrap(), b"jpeg bytes");
        assert!(!dir.path().join(".cat.jpg.part").exists());
    }

    #[tokio::test]
    async fn test_failed_download_leaves_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/repos/ox/CatDogBBox/download_file"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "Missing filePath"})))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let downloader = FileDownloader::new(client_for(&server), dir.path());
        let err = downloader
            .download_file(&repo(), "main", "cat.jpg")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Missing filePath"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_write_failure_removes_partial_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/repos/ox/CatDogBBox/download_file"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"data".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should go makes the final rename fail
        std::fs::create_dir(dir.path().join("data.csv")).unwrap();
        std::fs::write(dir.path().join("data.csv").join("keep"), b"x").unwrap();

        let downloader = FileDownloader::new(client_for(&server), dir.path());
        let err = downloader
            .download_file(&repo(), "main", "data.csv")
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::Io { .. }));
        assert!(!dir.path().join(".data.csv.part").exists());
    }

    #[tokio::test]
    async fn test_archive_download() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/repos/ox/CatDogBBox/download_repo"))
            .and(query_param("branch", "main"))
            .and(query_param("shallow", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK\x03\x04".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let downloader = ArchiveDownloader::new(client_for(&server), dir.path().join("out"));
        let saved = downloader
            .download_archive(&repo(), "main", true)
            .await
            .unwrap();

        assert_eq!(saved, dir.path().join("out").join("ox_CatDogBBox.zip"));
        assert_eq!(std::fs::read(&saved).unwrap(), b"PK\x03\x04");
    }

    #[tokio::test]
    async fn test_full_archive_passes_shallow_false() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/repos/ox/CatDogBBox/download_repo"))
            .and(query_param("shallow", "false"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        ArchiveDownloader::new(client_for(&server), dir.path())
            .download_archive(&repo(), "dev", false)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_failed_archive_leaves_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/repos/ox/CatDogBBox/download_repo"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let err = ArchiveDownloader::new(client_for(&server), dir.path())
            .download_archive(&repo(), "main", true)
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::Api(ApiError::Http { .. })));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
