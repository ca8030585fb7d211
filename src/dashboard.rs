//! Dashboard screen: file listing and ingestion.
//!
//! Owns two workflow controllers and the composition rule between them:
//! ingestion is only offered once the most recent listing succeeded with at
//! least one file.
//!
//! Listing and ingestion share one gate. While either is running the other
//! is refused with `AlreadyPending`, so the ingest check and the dispatch
//! it guards see the same listing even when several tasks drive one
//! dashboard.

use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::info;

use crate::actions::{IngestFiles, ListFiles};
use crate::backend::Backend;
use crate::error::WorkflowError;
use crate::models::{Identity, RemoteFile};
use crate::session::SessionStore;
use crate::workflow::{TriggerOutcome, WorkflowController, WorkflowState};

pub const LIST_FAILED: &str = "Failed to fetch files. Please try again.";
pub const INGEST_FAILED: &str = "Failed to process files. Please try again.";
pub const NO_FILES: &str =
    "No text files found in your Google Drive. Only .txt and .md files are supported.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: MessageKind,
    pub text: String,
}

impl StatusMessage {
    fn success(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Success,
            text: text.into(),
        }
    }

    fn failure(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Failure,
            text: text.into(),
        }
    }
}

pub fn ingest_success_message(count: u64) -> String {
    format!(
        "Successfully processed {} files. You can now search them!",
        count
    )
}

/// One row of the file table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRow {
    pub name: String,
    pub kind: &'static str,
    pub link: String,
}

impl From<&RemoteFile> for FileRow {
    fn from(file: &RemoteFile) -> Self {
        Self {
            name: file.name.clone(),
            kind: file.kind().label(),
            link: file.web_view_link.clone(),
        }
    }
}

/// Everything the dashboard shows, derived from the controllers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub identity: Option<Identity>,
    pub loading_files: bool,
    pub ingesting: bool,
    pub can_refresh: bool,
    pub can_ingest: bool,
    pub files: Vec<FileRow>,
    pub message: Option<StatusMessage>,
    /// Set when there is nothing to list and no listing is in flight.
    pub empty_notice: Option<&'static str>,
}

pub struct Dashboard {
    session: Arc<SessionStore>,
    files: WorkflowController<ListFiles>,
    ingest: WorkflowController<IngestFiles>,
    message: watch::Sender<Option<StatusMessage>>,
    gate: Mutex<()>,
}

impl Dashboard {
    pub fn new(session: Arc<SessionStore>, backend: Arc<dyn Backend>) -> Self {
        let (message, _) = watch::channel(None);
        Self {
            session,
            files: WorkflowController::new(ListFiles::new(backend.clone())),
            ingest: WorkflowController::new(IngestFiles::new(backend)),
            message,
            gate: Mutex::new(()),
        }
    }

    /// Initial load. Fetches files only for a signed-in session.
    pub async fn mount(&self) -> Option<TriggerOutcome> {
        if !self.session.state().is_authenticated() {
            return None;
        }
        Some(self.refresh_files().await)
    }

    pub fn files(&self) -> &WorkflowController<ListFiles> {
        &self.files
    }

    pub fn ingestion(&self) -> &WorkflowController<IngestFiles> {
        &self.ingest
    }

    pub async fn refresh_files(&self) -> TriggerOutcome {
        let Ok(_gate) = self.gate.try_lock() else {
            return TriggerOutcome::AlreadyPending;
        };
        let outcome = self.files.trigger(()).await;
        if outcome == TriggerOutcome::Applied {
            if let WorkflowState::Error(_) = self.files.state() {
                self.message.send_replace(Some(StatusMessage::failure(LIST_FAILED)));
            }
        }
        outcome
    }

    /// True when the latest listing succeeded with files and neither call
    /// is in flight.
    pub fn can_ingest(&self) -> bool {
        let listed = matches!(self.files.state(), WorkflowState::Success(files) if !files.is_empty());
        listed && !self.ingest.is_pending() && !self.files.is_pending()
    }

    /// Ingest the listed files. Refused without a network call unless the
    /// latest listing succeeded and was non-empty.
    pub async fn ingest(&self) -> TriggerOutcome {
        let Ok(_gate) = self.gate.try_lock() else {
            return TriggerOutcome::AlreadyPending;
        };
        match self.files.state() {
            WorkflowState::Success(files) if !files.is_empty() => {}
            WorkflowState::Success(_) => {
                return TriggerOutcome::Invalid(WorkflowError::Validation(
                    "no files to ingest".to_string(),
                ));
            }
            _ => {
                return TriggerOutcome::Invalid(WorkflowError::Validation(
                    "files have not been listed".to_string(),
                ));
            }
        }
        self.message.send_replace(None);
        let outcome = self.ingest.trigger(()).await;
        if outcome == TriggerOutcome::Applied {
            let message = match self.ingest.state() {
                WorkflowState::Success(summary) => {
                    info!(count = summary.count, "ingestion finished");
                    StatusMessage::success(ingest_success_message(summary.count))
                }
                _ => StatusMessage::failure(INGEST_FAILED),
            };
            self.message.send_replace(Some(message));
        }
        outcome
    }

    pub fn view(&self) -> DashboardView {
        let files_state = self.files.state();
        let loading_files = files_state.is_pending();
        let ingesting = self.ingest.is_pending();
        let files: Vec<FileRow> = files_state
            .success()
            .map(|files| files.iter().map(FileRow::from).collect())
            .unwrap_or_default();

        let empty_notice = if !loading_files && files.is_empty() {
            Some(NO_FILES)
        } else {
            None
        };

        DashboardView {
            identity: self.session.state().identity().cloned(),
            loading_files,
            ingesting,
            can_refresh: !loading_files && !ingesting,
            can_ingest: self.can_ingest(),
            files,
            message: self.message.borrow().clone(),
            empty_notice,
        }
    }
}
