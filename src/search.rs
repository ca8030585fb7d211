//! Search screen.
//!
//! Wraps the search workflow and keeps the last successful result set, so a
//! failed follow-up query shows its error above the previous results rather
//! than wiping them.

use std::sync::Arc;
use tokio::sync::watch;

use crate::actions::SearchFiles;
use crate::backend::Backend;
use crate::models::SearchHit;
use crate::workflow::{TriggerOutcome, WorkflowController, WorkflowState};

pub const SEARCH_FAILED: &str = "Failed to perform search. Please try again.";
pub const NO_MATCHES: &str = "No matching files found. Try a different search query.";

/// One rendered result, in backend order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub file_name: String,
    pub relevance: String,
    pub link: String,
}

impl From<&SearchHit> for ResultRow {
    fn from(hit: &SearchHit) -> Self {
        Self {
            file_name: hit.file_name.clone(),
            relevance: hit.relevance_percent(),
            link: hit.web_view_link.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchView {
    pub searching: bool,
    /// The submit affordance: disabled while searching or for a blank query.
    pub can_submit: bool,
    pub error: Option<&'static str>,
    /// False until the first search succeeds; the results section is hidden
    /// until then.
    pub has_searched: bool,
    /// `"Search Results (n)"`, or without the count when there are none.
    pub heading: String,
    pub results: Vec<ResultRow>,
    pub empty_notice: Option<&'static str>,
}

pub struct SearchScreen {
    search: WorkflowController<SearchFiles>,
    last_results: watch::Sender<Option<Vec<SearchHit>>>,
}

impl SearchScreen {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        let (last_results, _) = watch::channel(None);
        Self {
            search: WorkflowController::new(SearchFiles::new(backend)),
            last_results,
        }
    }

    pub fn controller(&self) -> &WorkflowController<SearchFiles> {
        &self.search
    }

    pub async fn submit(&self, query: &str) -> TriggerOutcome {
        let outcome = self.search.trigger(query.to_string()).await;
        if outcome == TriggerOutcome::Applied {
            if let WorkflowState::Success(hits) = self.search.state() {
                self.last_results.send_replace(Some(hits));
            }
        }
        outcome
    }

    /// View for the current state, with `draft` as the text in the query box.
    pub fn view(&self, draft: &str) -> SearchView {
        let state = self.search.state();
        let searching = state.is_pending();
        let error = state.error().map(|_| SEARCH_FAILED);

        let last = self.last_results.borrow().clone();
        let has_searched = last.is_some();
        let results: Vec<ResultRow> = last
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(ResultRow::from)
            .collect();

        let heading = if results.is_empty() {
            "Search Results".to_string()
        } else {
            format!("Search Results ({})", results.len())
        };
        let empty_notice = if has_searched && results.is_empty() {
            Some(NO_MATCHES)
        } else {
            None
        };

        SearchView {
            searching,
            can_submit: !searching && !draft.trim().is_empty(),
            error,
            has_searched,
            heading,
            results,
            empty_notice,
        }
    }
}
