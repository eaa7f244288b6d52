// src/api/client.rs
// =============================================================================
// HTTP client for the repository hub.
//
// One method per endpoint:
// - GET  /api/repos                                   -> list_repos
// - POST /api/login                                   -> login
// - GET  /api/repos/{ns}/{repo}/list                  -> list_dir
// - GET  /api/repos/{ns}/{repo}/preview_file          -> preview_file
// - GET  /api/repos/{ns}/{repo}/download_file         -> download_file
// - GET  /api/repos/{ns}/{repo}/download_repo         -> download_repo
// - GET  /api/repos/{ns}/{repo}/file                  -> file_info
//
// Every request carries the current credential (if any) as a bearer token.
// Any non-2xx answer becomes ApiError::Http, with the server's {"error"}
// message when it sent one.
// =============================================================================

use reqwest::{header, Client, Response};
use tracing::debug;
use url::Url;

use super::error::{ApiError, ApiResult};
use super::types::{DirEntry, FileInfo, ListResponse, LoginRequest, RawTextBody, RepoRef};
use crate::auth::{Credential, CredentialHolder};

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    credentials: CredentialHolder,
}

// A successful preview_file response, before classification
#[derive(Debug)]
pub struct PreviewResponse {
    pub content_type: String,
    pub response: Response,
}

impl ApiClient {
    // Creates a client for the hub at `base_url`
    //
    // Fails if the URL doesn't parse or can't have path segments appended
    // (e.g. "mailto:..."), or if the HTTP client can't be built.
    pub fn new(base_url: &str, credentials: CredentialHolder) -> ApiResult<Self> {
        let base_url =
            Url::parse(base_url).map_err(|e| ApiError::BaseUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::BaseUrl(base_url.to_string()));
        }

        let http = Client::builder()
            .user_agent(concat!("repo-browser/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            credentials,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn list_repos(&self) -> ApiResult<Vec<RepoRef>> {
        let url = self.endpoint(&["api", "repos"], &[])?;
        let response = self.get(url).await?;
        decode_json(response).await
    }

    // Validates the key with the hub. The caller decides whether to keep it.
    pub async fn login(&self, credential: &Credential) -> ApiResult<()> {
        let url = self.endpoint(&["api", "login"], &[])?;
        debug!(%url, "POST");

        let request = self.http.post(url).json(&LoginRequest {
            api_key: credential.expose(),
        });
        check_status(request.send().await?).await?;
        Ok(())
    }

    // Lists the entries of `dir` ("" = repository root) at `branch`
    //
    // Order is whatever the server returns.
    pub async fn list_dir(
        &self,
        repo: &RepoRef,
        branch: &str,
        dir: &str,
    ) -> ApiResult<Vec<DirEntry>> {
        let url = self.repo_endpoint(repo, "list", &[("branch", branch), ("dir", dir)])?;
        let response = self.get(url).await?;
        let body: ListResponse = decode_json(response).await?;

        Ok(body
            .entries
            .unwrap_or_default()
            .into_iter()
            .map(DirEntry::from)
            .collect())
    }

    // Fetches a file's preview; the body is left unread so the caller can
    // decide how to read it from the content type
    pub async fn preview_file(
        &self,
        repo: &RepoRef,
        branch: &str,
        path: &str,
    ) -> ApiResult<PreviewResponse> {
        let url = self.repo_endpoint(
            repo,
            "preview_file",
            &[("branch", branch), ("filePath", path)],
        )?;
        let response = self.get(url).await?;

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        Ok(PreviewResponse {
            content_type,
            response,
        })
    }

    pub async fn download_file(
        &self,
        repo: &RepoRef,
        branch: &str,
        path: &str,
    ) -> ApiResult<Vec<u8>> {
        let url = self.repo_endpoint(
            repo,
            "download_file",
            &[("branch", branch), ("filePath", path)],
        )?;
        let response = self.get(url).await?;
        Ok(response.bytes().await?.to_vec())
    }

    // `shallow` is passed through as-is; the server decides what it means
    pub async fn download_repo(
        &self,
        repo: &RepoRef,
        branch: &str,
        shallow: bool,
    ) -> ApiResult<Vec<u8>> {
        let shallow = if shallow { "true" } else { "false" };
        let url = self.repo_endpoint(
            repo,
            "download_repo",
            &[("branch", branch), ("shallow", shallow)],
        )?;
        let response = self.get(url).await?;
        Ok(response.bytes().await?.to_vec())
    }

    pub async fn file_info(
        &self,
        repo: &RepoRef,
        branch: &str,
        path: &str,
    ) -> ApiResult<FileInfo> {
        let url = self.repo_endpoint(repo, "file", &[("branch", branch), ("filePath", path)])?;
        let response = self.get(url).await?;
        decode_json(response).await
    }

    // ------------------------------------------------------------------------
    // Private helpers
    // ------------------------------------------------------------------------

    fn repo_endpoint(&self, repo: &RepoRef, action: &str, query: &[(&str, &str)]) -> ApiResult<Url> {
        self.endpoint(
            &["api", "repos", repo.namespace(), repo.name(), action],
            query,
        )
    }

    // Appends path segments (percent-encoded) and query pairs to the base URL
    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::BaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn get(&self, url: Url) -> ApiResult<Response> {
        debug!(%url, "GET");

        let mut request = self.http.get(url);
        if let Some(credential) = self.credentials.get() {
            request = request.bearer_auth(credential.expose());
        }

        check_status(request.send().await?).await
    }
}

// Turns non-2xx responses into ApiError::Http
async fn check_status(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    // The body is only used for the error message, so a failed read is
    // treated as an empty body
    let body = response.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
    Err(ApiError::from_status(status, &body))
}

async fn decode_json<T: serde::de::DeserializeOwned>(response: Response) -> ApiResult<T> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

// Reads a JSON preview body and pulls out "rawText" (missing = "")
pub(crate) async fn read_raw_text(response: Response) -> ApiResult<String> {
    let body: RawTextBody = decode_json(response).await?;
    Ok(body.raw_text.unwrap_or_default())
}
