//! In-memory [`Backend`] used by unit tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::backend::Backend;
use crate::error::WorkflowError;
use crate::models::{Identity, IngestSummary, RemoteFile, SearchHit};

pub(crate) fn identity(id: &str) -> Identity {
    Identity {
        id: id.to_string(),
        name: "A".to_string(),
        email: "a@x.com".to_string(),
        profile_picture: None,
    }
}

pub(crate) fn file(id: &str, mime_type: &str) -> RemoteFile {
    RemoteFile {
        id: id.to_string(),
        name: format!("{}.txt", id),
        mime_type: mime_type.to_string(),
        web_view_link: format!("https://drive.test/{}", id),
    }
}

pub(crate) fn hit(id: &str, score: f64) -> SearchHit {
    SearchHit {
        score,
        file_id: id.to_string(),
        file_name: format!("{}.md", id),
        web_view_link: format!("https://drive.test/{}", id),
    }
}

/// Canned responses per endpoint, plus a call counter per method name.
pub(crate) struct FakeBackend {
    user: Result<Identity, WorkflowError>,
    logout: Result<(), WorkflowError>,
    files: Result<Vec<RemoteFile>, WorkflowError>,
    ingest: Result<IngestSummary, WorkflowError>,
    search: Result<Vec<SearchHit>, WorkflowError>,
    /// When set, `ingest` waits for a notification before answering.
    ingest_hold: Option<Arc<Notify>>,
    calls: Mutex<HashMap<&'static str, usize>>,
    queries: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self {
            user: Err(WorkflowError::ServerRejected { status: 401 }),
            logout: Ok(()),
            files: Ok(Vec::new()),
            ingest: Ok(IngestSummary { count: 0 }),
            search: Ok(Vec::new()),
            ingest_hold: None,
            calls: Mutex::new(HashMap::new()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_user(mut self, user: Result<Identity, WorkflowError>) -> Self {
        self.user = user;
        self
    }

    pub(crate) fn with_logout(mut self, logout: Result<(), WorkflowError>) -> Self {
        self.logout = logout;
        self
    }

    pub(crate) fn with_files(mut self, files: Result<Vec<RemoteFile>, WorkflowError>) -> Self {
        self.files = files;
        self
    }

    pub(crate) fn with_ingest(mut self, ingest: Result<IngestSummary, WorkflowError>) -> Self {
        self.ingest = ingest;
        self
    }

    pub(crate) fn with_search(mut self, search: Result<Vec<SearchHit>, WorkflowError>) -> Self {
        self.search = search;
        self
    }

    pub(crate) fn with_ingest_hold(mut self, hold: Arc<Notify>) -> Self {
        self.ingest_hold = Some(hold);
        self
    }

    pub(crate) fn calls(&self, method: &str) -> usize {
        self.calls.lock().unwrap().get(method).copied().unwrap_or(0)
    }

    pub(crate) fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    fn record(&self, method: &'static str) {
        *self.calls.lock().unwrap().entry(method).or_insert(0) += 1;
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn current_user(&self) -> Result<Identity, WorkflowError> {
        self.record("current_user");
        self.user.clone()
    }

    async fn logout(&self) -> Result<(), WorkflowError> {
        self.record("logout");
        self.logout.clone()
    }

    async fn list_files(&self) -> Result<Vec<RemoteFile>, WorkflowError> {
        self.record("list_files");
        self.files.clone()
    }

    async fn ingest(&self) -> Result<IngestSummary, WorkflowError> {
        self.record("ingest");
        if let Some(hold) = &self.ingest_hold {
            hold.notified().await;
        }
        self.ingest.clone()
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, WorkflowError> {
        self.record("search");
        self.queries.lock().unwrap().push(query.to_string());
        self.search.clone()
    }

    fn sign_in_url(&self) -> String {
        "http://backend.test/api/auth/google".to_string()
    }
}
