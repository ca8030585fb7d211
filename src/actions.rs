//! The three backend actions driven through [`WorkflowController`]s.
//!
//! [`WorkflowController`]: crate::workflow::WorkflowController

use async_trait::async_trait;
use std::sync::Arc;

use crate::backend::Backend;
use crate::error::WorkflowError;
use crate::models::{IngestSummary, RemoteFile, SearchHit};
use crate::workflow::Action;

/// `GET /api/drive/files`
pub struct ListFiles {
    backend: Arc<dyn Backend>,
}

impl ListFiles {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Action for ListFiles {
    type Input = ();
    type Output = Vec<RemoteFile>;

    fn name(&self) -> &'static str {
        "list_files"
    }

    async fn run(&self, _input: ()) -> Result<Vec<RemoteFile>, WorkflowError> {
        self.backend.list_files().await
    }
}

/// `POST /api/search/ingest`
///
/// Has no opinion about whether files were listed first; that gate belongs
/// to the dashboard.
pub struct IngestFiles {
    backend: Arc<dyn Backend>,
}

impl IngestFiles {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Action for IngestFiles {
    type Input = ();
    type Output = IngestSummary;

    fn name(&self) -> &'static str {
        "ingest"
    }

    async fn run(&self, _input: ()) -> Result<IngestSummary, WorkflowError> {
        self.backend.ingest().await
    }
}

/// `GET /api/search/query`. Blank queries never reach the network.
pub struct SearchFiles {
    backend: Arc<dyn Backend>,
}

impl SearchFiles {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Action for SearchFiles {
    type Input = String;
    type Output = Vec<SearchHit>;

    fn name(&self) -> &'static str {
        "search"
    }

    fn validate(&self, query: &String) -> Result<(), WorkflowError> {
        if query.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "query must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    async fn run(&self, query: String) -> Result<Vec<SearchHit>, WorkflowError> {
        self.backend.search(&query).await
    }
}
