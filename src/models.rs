//! Core data models exchanged with the backend.
//!
//! Field names follow the backend's camelCase JSON. Every type here is
//! read-only from the client's point of view: it is decoded from a response
//! and handed to the session store or a workflow controller as a whole value.

use serde::{Deserialize, Serialize};

/// The signed-in principal, as returned by `GET /api/auth/user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

/// A file from the remote document store, already filtered server-side to
/// text and markdown types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub web_view_link: String,
}

/// Display classification of a [`RemoteFile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Text,
    Markdown,
}

impl FileKind {
    pub fn label(self) -> &'static str {
        match self {
            FileKind::Text => "Text",
            FileKind::Markdown => "Markdown",
        }
    }
}

impl RemoteFile {
    /// `text/plain` is Text; every other type the backend lets through is
    /// shown as Markdown.
    pub fn kind(&self) -> FileKind {
        if self.mime_type == "text/plain" {
            FileKind::Text
        } else {
            FileKind::Markdown
        }
    }
}

/// One ranked result from `GET /api/search/query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub score: f64,
    pub file_id: String,
    pub file_name: String,
    pub web_view_link: String,
}

impl SearchHit {
    /// Relevance as a percentage with two decimals, e.g. `"91.00%"`.
    ///
    /// Scores are not contractually bounded, so the value is clamped to
    /// `[0, 100]` and non-finite scores render as zero.
    pub fn relevance_percent(&self) -> String {
        let pct = if self.score.is_finite() {
            (self.score * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };
        format!("{:.2}%", pct)
    }
}

/// Response of `POST /api/search/ingest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestSummary {
    pub count: u64,
}
