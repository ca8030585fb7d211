//! Backend access.
//!
//! [`Backend`] is the seam between the orchestration layer and the network.
//! [`HttpBackend`] is the production implementation over `reqwest`; tests
//! substitute in-memory fakes.
//!
//! # Endpoints
//!
//! | Method | Path | Result |
//! |--------|------|--------|
//! | `GET`  | `/api/auth/user` | [`Identity`] |
//! | `GET`  | `/api/auth/google` | external sign-in redirect (URL only) |
//! | `POST` | `/api/auth/logout` | none |
//! | `GET`  | `/api/drive/files` | `[RemoteFile]` |
//! | `POST` | `/api/search/ingest` | [`IngestSummary`] |
//! | `GET`  | `/api/search/query?query=` | `[SearchHit]` |
//!
//! Every request goes through a single `reqwest::Client` with a cookie jar,
//! so the session credential established by the backend travels on all
//! calls. A preconfigured `session_cookie` is attached as a default header.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use serde::de::DeserializeOwned;

use crate::config::BackendConfig;
use crate::error::WorkflowError;
use crate::models::{Identity, IngestSummary, RemoteFile, SearchHit};

pub const AUTH_USER_PATH: &str = "/api/auth/user";
pub const AUTH_GOOGLE_PATH: &str = "/api/auth/google";
pub const AUTH_LOGOUT_PATH: &str = "/api/auth/logout";
pub const DRIVE_FILES_PATH: &str = "/api/drive/files";
pub const SEARCH_INGEST_PATH: &str = "/api/search/ingest";
pub const SEARCH_QUERY_PATH: &str = "/api/search/query";

/// The backend operations the client consumes.
///
/// Implementations classify every failure into a [`WorkflowError`]; callers
/// never see raw transport errors.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Fetch the identity bound to the current session.
    async fn current_user(&self) -> Result<Identity, WorkflowError>;

    /// Terminate the server-side session.
    async fn logout(&self) -> Result<(), WorkflowError>;

    /// List the user's text and markdown files, in backend order.
    async fn list_files(&self) -> Result<Vec<RemoteFile>, WorkflowError>;

    /// Ingest previously listed files into the search index.
    async fn ingest(&self) -> Result<IngestSummary, WorkflowError>;

    /// Run a semantic query. Hits come back ranked; callers must not re-sort.
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, WorkflowError>;

    /// Where the whole page should be sent to start external sign-in.
    fn sign_in_url(&self) -> String;
}

/// [`Backend`] over HTTP with a shared cookie jar.
pub struct HttpBackend {
    config: BackendConfig,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = &config.session_cookie {
            let value = HeaderValue::from_str(cookie)
                .with_context(|| "backend.session_cookie is not a valid header value")?;
            headers.insert(COOKIE, value);
        }

        let mut builder = reqwest::Client::builder()
            .cookie_store(true)
            .default_headers(headers);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            config: config.clone(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        self.config.endpoint(path)
    }

    /// Send a request and decode a JSON body, classifying each failure.
    async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, WorkflowError> {
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WorkflowError::ServerRejected {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn current_user(&self) -> Result<Identity, WorkflowError> {
        self.fetch_json(self.client.get(self.url(AUTH_USER_PATH))).await
    }

    async fn logout(&self) -> Result<(), WorkflowError> {
        let response = self
            .client
            .post(self.url(AUTH_LOGOUT_PATH))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WorkflowError::ServerRejected {
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    async fn list_files(&self) -> Result<Vec<RemoteFile>, WorkflowError> {
        self.fetch_json(self.client.get(self.url(DRIVE_FILES_PATH))).await
    }

    async fn ingest(&self) -> Result<IngestSummary, WorkflowError> {
        self.fetch_json(
            self.client
                .post(self.url(SEARCH_INGEST_PATH))
                .header("Content-Type", "application/json"),
        )
        .await
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, WorkflowError> {
        self.fetch_json(
            self.client
                .get(self.url(SEARCH_QUERY_PATH))
                .query(&[("query", query)]),
        )
        .await
    }

    fn sign_in_url(&self) -> String {
        self.url(AUTH_GOOGLE_PATH)
    }
}
