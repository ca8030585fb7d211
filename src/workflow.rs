//! Generic async workflow controller.
//!
//! A [`WorkflowController`] wraps one backend [`Action`] and tracks its
//! lifecycle as a [`WorkflowState`]:
//!
//! ```text
//!          trigger()               response (current token)
//!   Idle ────────────▶ Pending ───────────────────────────▶ Success(T)
//!     ▲                  │                                   Error(e)
//!     │ reset()          │ trigger() while pending: rejected     │
//!     └──────────────────┴──────────── trigger() again ◀────────┘
//! ```
//!
//! # Ordering
//!
//! Every dispatch takes a fresh token from a per-controller counter. When a
//! response arrives it is applied only if its token is still the current
//! one. [`reset`](WorkflowController::reset) and
//! [`trigger_replacing`](WorkflowController::trigger_replacing) advance the
//! counter, so a slow response from a superseded request can never
//! overwrite the result of a later one. No network cancellation happens; the
//! stale response is simply dropped.
//!
//! Dropping a `trigger` future before its response arrives (a timeout, an
//! aborted task) settles that dispatch to `Error` if it is still current,
//! so the controller can be triggered again.
//!
//! The controller never holds a lock across the network call: the state and
//! token live in a `tokio::sync::watch` channel and are updated atomically
//! before and after the await.

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::WorkflowError;

/// Error detail recorded when a dispatch is dropped mid-flight.
pub const CANCELLED: &str = "request cancelled";

/// A single backend operation bound into a controller.
#[async_trait]
pub trait Action: Send + Sync {
    type Input: Send + 'static;
    type Output: Clone + Send + Sync + 'static;

    /// Short name used in log lines (e.g. `"list_files"`).
    fn name(&self) -> &'static str;

    /// Client-side validation, run before anything is dispatched.
    fn validate(&self, _input: &Self::Input) -> Result<(), WorkflowError> {
        Ok(())
    }

    async fn run(&self, input: Self::Input) -> Result<Self::Output, WorkflowError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowState<T> {
    Idle,
    Pending,
    Success(T),
    Error(WorkflowError),
}

impl<T> WorkflowState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, WorkflowState::Idle)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, WorkflowState::Pending)
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            WorkflowState::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&WorkflowError> {
        match self {
            WorkflowState::Error(err) => Some(err),
            _ => None,
        }
    }
}

/// What happened to a trigger.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerOutcome {
    /// The response was applied; the controller is now `Success` or `Error`.
    Applied,
    /// The response arrived after a newer dispatch and was discarded.
    Stale,
    /// A request was already in flight; nothing was dispatched.
    AlreadyPending,
    /// Input failed validation; nothing was dispatched and state is unchanged.
    Invalid(WorkflowError),
}

/// The controller's published value: current state plus the token of the
/// dispatch it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    pub token: u64,
    pub state: WorkflowState<T>,
}

/// Settles a dispatch whose future was dropped before the response arrived,
/// so the controller does not stay `Pending` with nothing in flight.
struct PendingGuard<'a, T> {
    snapshot: &'a watch::Sender<Snapshot<T>>,
    token: u64,
    name: &'static str,
    armed: bool,
}

impl<T> PendingGuard<'_, T> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<T> Drop for PendingGuard<'_, T> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let token = self.token;
        let cancelled = self.snapshot.send_if_modified(|snap| {
            if snap.token != token || !snap.state.is_pending() {
                return false;
            }
            snap.state = WorkflowState::Error(WorkflowError::Network(CANCELLED.to_string()));
            true
        });
        if cancelled {
            debug!(action = self.name, token, "request dropped before completion");
        }
    }
}

pub struct WorkflowController<A: Action> {
    action: A,
    snapshot: watch::Sender<Snapshot<A::Output>>,
}

impl<A: Action> WorkflowController<A> {
    pub fn new(action: A) -> Self {
        let (snapshot, _) = watch::channel(Snapshot {
            token: 0,
            state: WorkflowState::Idle,
        });
        Self { action, snapshot }
    }

    pub fn action(&self) -> &A {
        &self.action
    }

    pub fn state(&self) -> WorkflowState<A::Output> {
        self.snapshot.borrow().state.clone()
    }

    /// Whether a request is in flight. Callers use this to disable the
    /// affordance that triggers the action.
    pub fn is_pending(&self) -> bool {
        self.snapshot.borrow().state.is_pending()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<A::Output>> {
        self.snapshot.subscribe()
    }

    /// Run the action unless one is already in flight.
    pub async fn trigger(&self, input: A::Input) -> TriggerOutcome {
        self.dispatch(input, false).await
    }

    /// Run the action, superseding any in-flight request. The superseded
    /// request's response will be discarded when it arrives.
    pub async fn trigger_replacing(&self, input: A::Input) -> TriggerOutcome {
        self.dispatch(input, true).await
    }

    /// Return to `Idle` and invalidate any outstanding request.
    pub fn reset(&self) {
        self.snapshot.send_modify(|snap| {
            snap.token += 1;
            snap.state = WorkflowState::Idle;
        });
    }

    async fn dispatch(&self, input: A::Input, replace: bool) -> TriggerOutcome {
        let name = self.action.name();

        if let Err(err) = self.action.validate(&input) {
            debug!(action = name, error = %err, "trigger rejected by validation");
            return TriggerOutcome::Invalid(err);
        }

        let Some(token) = self.begin(replace) else {
            debug!(action = name, "trigger ignored; request already pending");
            return TriggerOutcome::AlreadyPending;
        };

        let pending = PendingGuard {
            snapshot: &self.snapshot,
            token,
            name,
            armed: true,
        };
        let result = self.action.run(input).await;
        pending.disarm();
        self.settle(token, result)
    }

    /// Move to `Pending` under a new token. Returns `None` when a request is
    /// already pending and `replace` is false.
    fn begin(&self, replace: bool) -> Option<u64> {
        let mut issued = None;
        self.snapshot.send_if_modified(|snap| {
            if snap.state.is_pending() && !replace {
                return false;
            }
            snap.token += 1;
            snap.state = WorkflowState::Pending;
            issued = Some(snap.token);
            true
        });
        issued
    }

    /// Apply a response if `token` is still current.
    fn settle(&self, token: u64, result: Result<A::Output, WorkflowError>) -> TriggerOutcome {
        let name = self.action.name();
        let mut applied = false;

        self.snapshot.send_if_modified(|snap| {
            if snap.token != token {
                return false;
            }
            snap.state = match result {
                Ok(data) => WorkflowState::Success(data),
                Err(err) => {
                    warn!(action = name, kind = err.kind().as_str(), error = %err, "workflow failed");
                    WorkflowState::Error(err)
                }
            };
            applied = true;
            true
        });

        if applied {
            TriggerOutcome::Applied
        } else {
            debug!(action = name, token, "discarding stale response");
            TriggerOutcome::Stale
        }
    }
}
