//! Navigation guard.
//!
//! [`decide`] is a pure function from a [`SessionState`] and a requested
//! route to a [`GuardDecision`]. [`NavigationGuard`] applies that decision by
//! calling a [`Navigator`], which is the only side-effecting part.
//!
//! | Route | Probe pending | Anonymous | Authenticated |
//! |-------|---------------|-----------|---------------|
//! | sign-in | wait | render | → dashboard |
//! | dashboard, search | wait | → sign-in | render |
//! | unknown path | wait | → sign-in | → sign-in |

use std::sync::Arc;
use tracing::debug;

use crate::session::{AuthStatus, SessionState, SessionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    SignIn,
    Dashboard,
    Search,
}

/// Who may see a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    AnonymousOnly,
    AuthenticatedOnly,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::SignIn => "/",
            Route::Dashboard => "/dashboard",
            Route::Search => "/search",
        }
    }

    pub fn access(self) -> Access {
        match self {
            Route::SignIn => Access::AnonymousOnly,
            Route::Dashboard | Route::Search => Access::AuthenticatedOnly,
        }
    }

    /// Match a location path. Query strings, fragments and a trailing slash
    /// are ignored. Returns `None` for paths with no route.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Some(Route::SignIn),
            "/dashboard" => Some(Route::Dashboard),
            "/search" => Some(Route::Search),
            _ => None,
        }
    }
}

/// What the view layer should do for a requested location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// The identity probe has not settled: show the neutral waiting view.
    Wait,
    Render(Route),
    Redirect(Route),
}

/// Decide for a known route.
pub fn decide(state: &SessionState, route: Route) -> GuardDecision {
    match (state.status(), route.access()) {
        (AuthStatus::Unknown, _) => GuardDecision::Wait,
        (AuthStatus::Authenticated, Access::AnonymousOnly) => {
            GuardDecision::Redirect(Route::Dashboard)
        }
        (AuthStatus::Anonymous, Access::AuthenticatedOnly) => {
            GuardDecision::Redirect(Route::SignIn)
        }
        _ => GuardDecision::Render(route),
    }
}

/// Decide for a raw location path. Unknown paths fall back to sign-in
/// rather than a not-found view.
pub fn decide_path(state: &SessionState, path: &str) -> GuardDecision {
    match Route::parse(path) {
        Some(route) => decide(state, route),
        None if state.probe_in_progress() => GuardDecision::Wait,
        None => GuardDecision::Redirect(Route::SignIn),
    }
}

/// Performs navigation. Implemented by whatever owns the current location.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

impl<N: Navigator + ?Sized> Navigator for Arc<N> {
    fn navigate(&self, route: Route) {
        (**self).navigate(route)
    }
}

pub struct NavigationGuard<N: Navigator> {
    session: Arc<SessionStore>,
    navigator: N,
}

impl<N: Navigator> NavigationGuard<N> {
    pub fn new(session: Arc<SessionStore>, navigator: N) -> Self {
        Self { session, navigator }
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Decide for `path` against the current session and perform the
    /// redirect, if any.
    pub fn check(&self, path: &str) -> GuardDecision {
        let decision = decide_path(&self.session.state(), path);
        if let GuardDecision::Redirect(to) = decision {
            debug!(from = path, to = to.path(), "guard redirect");
            self.navigator.navigate(to);
        }
        decision
    }
}
