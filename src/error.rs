//! Classified failures of backend workflows.
//!
//! Every failed call is reduced to one of a small set of kinds. The kinds all
//! render as the same "please try again" message on screen, but stay distinct
//! for logging and tests.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// The request could not be sent, or no response was received.
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("server rejected request with status {status}")]
    ServerRejected { status: u16 },

    /// Success status, but the body did not have the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Input was refused before any request was issued.
    #[error("invalid input: {0}")]
    Validation(String),
}

/// Coarse classification, used as a stable logging field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    ServerRejected,
    MalformedResponse,
    Validation,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::ServerRejected => "server_rejected",
            ErrorKind::MalformedResponse => "malformed_response",
            ErrorKind::Validation => "validation",
        }
    }
}

impl WorkflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkflowError::Network(_) => ErrorKind::Network,
            WorkflowError::ServerRejected { .. } => ErrorKind::ServerRejected,
            WorkflowError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            WorkflowError::Validation(_) => ErrorKind::Validation,
        }
    }
}

impl From<reqwest::Error> for WorkflowError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            WorkflowError::MalformedResponse(err.to_string())
        } else if let Some(status) = err.status() {
            WorkflowError::ServerRejected {
                status: status.as_u16(),
            }
        } else {
            WorkflowError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for WorkflowError {
    fn from(err: serde_json::Error) -> Self {
        WorkflowError::MalformedResponse(err.to_string())
    }
}
