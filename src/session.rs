//! Session store: the single source of truth for who is signed in.
//!
//! The store owns a [`SessionState`] and publishes it through a
//! `tokio::sync::watch` channel. The store is the only writer; screens, the
//! navigation guard, and anything else hold receivers or take snapshots.
//! Readers therefore observe either the state before a mutation or the state
//! after it, never a mix.
//!
//! # Lifecycle
//!
//! ```text
//!   new() ──▶ probe pending ──probe_identity()──▶ settled
//!                                                  │
//!                     set_identity() / sign_out()  │
//!                                  ◀───────────────┘
//! ```
//!
//! The identity probe runs at most once per store. Every later identity
//! change is a local mutation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::models::Identity;

/// Authentication status as consumers must interpret it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    /// The boot probe has not settled; neither signed in nor signed out.
    Unknown,
    Anonymous,
    Authenticated,
}

/// Identity plus probe metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    identity: Option<Identity>,
    probe_in_progress: bool,
}

impl SessionState {
    /// State at boot, before the identity probe has settled.
    pub fn booting() -> Self {
        Self {
            identity: None,
            probe_in_progress: true,
        }
    }

    /// A settled state with the given identity.
    pub fn settled(identity: Option<Identity>) -> Self {
        Self {
            identity,
            probe_in_progress: false,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn probe_in_progress(&self) -> bool {
        self.probe_in_progress
    }

    /// True exactly when an identity is present.
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn status(&self) -> AuthStatus {
        if self.probe_in_progress {
            AuthStatus::Unknown
        } else if self.is_authenticated() {
            AuthStatus::Authenticated
        } else {
            AuthStatus::Anonymous
        }
    }
}

/// Result of [`SessionStore::probe_identity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Authenticated,
    Anonymous,
    /// The probe already ran for this store; nothing was sent.
    AlreadyProbed,
}

pub struct SessionStore {
    backend: Arc<dyn Backend>,
    state: watch::Sender<SessionState>,
    probed: AtomicBool,
}

impl SessionStore {
    /// A store in the booting state. Call [`probe_identity`](Self::probe_identity)
    /// once to settle it.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        let (state, _) = watch::channel(SessionState::booting());
        Self {
            backend,
            state,
            probed: AtomicBool::new(false),
        }
    }

    /// A store that is already settled and will never probe.
    pub fn with_identity(backend: Arc<dyn Backend>, identity: Option<Identity>) -> Self {
        let (state, _) = watch::channel(SessionState::settled(identity));
        Self {
            backend,
            state,
            probed: AtomicBool::new(true),
        }
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Resolve once the boot probe has settled.
    pub async fn wait_until_settled(&self) -> SessionState {
        let mut rx = self.state.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        rx.wait_for(|s| !s.probe_in_progress)
            .await
            .map(|state| state.clone())
            .unwrap_or_else(|_| self.state())
    }

    /// Check the backend for an existing session.
    ///
    /// Runs at most once per store. Any failure (transport, status, body)
    /// settles to the anonymous state. That is the normal signed-out
    /// outcome, so it is only logged at debug level.
    pub async fn probe_identity(&self) -> ProbeOutcome {
        if self.probed.swap(true, Ordering::SeqCst) {
            debug!("identity probe already ran; skipping");
            return ProbeOutcome::AlreadyProbed;
        }

        self.state.send_modify(|s| s.probe_in_progress = true);

        let identity = match self.backend.current_user().await {
            Ok(identity) => {
                info!(user_id = %identity.id, "session found");
                Some(identity)
            }
            Err(err) => {
                debug!(kind = err.kind().as_str(), error = %err, "no session; continuing anonymous");
                None
            }
        };

        let outcome = if identity.is_some() {
            ProbeOutcome::Authenticated
        } else {
            ProbeOutcome::Anonymous
        };

        self.state.send_modify(|s| {
            s.identity = identity;
            s.probe_in_progress = false;
        });

        outcome
    }

    /// Replace the identity wholesale.
    pub fn set_identity(&self, identity: Option<Identity>) {
        self.state.send_modify(|s| s.identity = identity);
    }

    /// End the session.
    ///
    /// The backend call is best effort. The local identity is cleared
    /// whether or not it succeeds.
    pub async fn sign_out(&self) {
        if let Err(err) = self.backend.logout().await {
            warn!(kind = err.kind().as_str(), error = %err, "logout request failed");
        }
        self.set_identity(None);
    }
}
