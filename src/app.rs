//! Application shell.
//!
//! [`App`] wires the session store, navigation guard and screens together:
//!
//! ```text
//!   boot() ──▶ SessionStore::probe_identity()      (once)
//!   open(path) ──▶ NavigationGuard::check(path)
//!                    ├─ Wait      ─▶ Screen::Waiting
//!                    ├─ Redirect  ─▶ History updated, re-check target
//!                    └─ Render    ─▶ mount screen (fresh controllers)
//! ```
//!
//! Each `open` mounts a new screen instance, so workflow controllers start
//! `Idle` on every visit, the same way a page component remounts.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::warn;

use crate::backend::Backend;
use crate::dashboard::Dashboard;
use crate::guard::{GuardDecision, NavigationGuard, Navigator, Route};
use crate::models::Identity;
use crate::navbar::{nav_bar, NavBarView};
use crate::search::SearchScreen;
use crate::session::{ProbeOutcome, SessionStore};

/// Longest redirect chain the guard table can produce is two hops.
const MAX_REDIRECTS: usize = 4;

pub const SIGN_IN_TITLE: &str = "Google Drive Semantic Search";
pub const SIGN_IN_BLURB: &str =
    "Connect your Google Drive to search your text files semantically.";

/// In-memory location history; the navigator used by [`App`].
pub struct History {
    current: watch::Sender<Route>,
}

impl History {
    pub fn new() -> Self {
        let (current, _) = watch::channel(Route::SignIn);
        Self { current }
    }

    pub fn current(&self) -> Route {
        *self.current.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.current.subscribe()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator for History {
    fn navigate(&self, route: Route) {
        self.current.send_replace(route);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInView {
    pub title: &'static str,
    pub blurb: &'static str,
    /// The whole page is sent here to start external sign-in.
    pub sign_in_url: String,
}

/// The mounted screen for a location.
pub enum Screen {
    /// Neutral view shown until the boot probe settles.
    Waiting,
    SignIn(SignInView),
    Dashboard(Arc<Dashboard>),
    Search(Arc<SearchScreen>),
}

impl Screen {
    pub fn route(&self) -> Option<Route> {
        match self {
            Screen::Waiting => None,
            Screen::SignIn(_) => Some(Route::SignIn),
            Screen::Dashboard(_) => Some(Route::Dashboard),
            Screen::Search(_) => Some(Route::Search),
        }
    }
}

pub struct App {
    backend: Arc<dyn Backend>,
    session: Arc<SessionStore>,
    history: Arc<History>,
    guard: NavigationGuard<Arc<History>>,
}

impl App {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        let session = Arc::new(SessionStore::new(backend.clone()));
        let history = Arc::new(History::new());
        let guard = NavigationGuard::new(session.clone(), history.clone());
        Self {
            backend,
            session,
            history,
            guard,
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn current_route(&self) -> Route {
        self.history.current()
    }

    pub fn nav_bar(&self) -> NavBarView {
        nav_bar(&self.session.state())
    }

    /// Run the one-time identity probe.
    pub async fn boot(&self) -> ProbeOutcome {
        self.session.probe_identity().await
    }

    /// Resolve `path` through the guard and mount the resulting screen.
    pub async fn open(&self, path: &str) -> Screen {
        let mut path = path.to_string();
        for _ in 0..MAX_REDIRECTS {
            match self.guard.check(&path) {
                GuardDecision::Wait => return Screen::Waiting,
                GuardDecision::Redirect(to) => path = to.path().to_string(),
                GuardDecision::Render(route) => {
                    self.history.navigate(route);
                    return self.mount(route).await;
                }
            }
        }
        warn!(path = %path, "redirect limit reached");
        Screen::Waiting
    }

    /// The external sign-in redirect came back with an established session.
    pub async fn complete_sign_in(&self, identity: Identity) -> Screen {
        self.session.set_identity(Some(identity));
        self.open(self.current_route().path()).await
    }

    /// Sign out and land on the sign-in screen, whatever the backend says.
    pub async fn sign_out(&self) -> Screen {
        self.session.sign_out().await;
        self.open(Route::SignIn.path()).await
    }

    async fn mount(&self, route: Route) -> Screen {
        match route {
            Route::SignIn => Screen::SignIn(SignInView {
                title: SIGN_IN_TITLE,
                blurb: SIGN_IN_BLURB,
                sign_in_url: self.backend.sign_in_url(),
            }),
            Route::Dashboard => {
                let dashboard = Arc::new(Dashboard::new(self.session.clone(), self.backend.clone()));
                dashboard.mount().await;
                Screen::Dashboard(dashboard)
            }
            Route::Search => Screen::Search(Arc::new(SearchScreen::new(self.backend.clone()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorkflowError;
    use crate::testing::{file, identity, FakeBackend};

    #[tokio::test]
    async fn waits_until_boot() {
        let app = App::new(Arc::new(FakeBackend::new()));
        for path in ["/", "/dashboard", "/search", "/elsewhere"] {
            assert!(matches!(app.open(path).await, Screen::Waiting));
        }
        assert_eq!(app.current_route(), Route::SignIn);
    }

    #[tokio::test]
    async fn probe_401_lands_on_sign_in() {
        let backend = Arc::new(
            FakeBackend::new().with_user(Err(WorkflowError::ServerRejected { status: 401 })),
        );
        let app = App::new(backend);
        assert_eq!(app.boot().await, ProbeOutcome::Anonymous);

        let screen = app.open("/dashboard").await;
        match screen {
            Screen::SignIn(view) => {
                assert_eq!(view.sign_in_url, "http://backend.test/api/auth/google")
            }
            _ => panic!("expected sign-in screen"),
        }
        assert_eq!(app.current_route(), Route::SignIn);
        assert!(app.nav_bar().links.is_empty());
    }

    #[tokio::test]
    async fn signed_in_root_redirects_to_dashboard() {
        let backend = Arc::new(
            FakeBackend::new()
                .with_user(Ok(identity("u1")))
                .with_files(Ok(vec![file("a", "text/plain")])),
        );
        let app = App::new(backend.clone());
        app.boot().await;

        let screen = app.open("/").await;
        assert_eq!(screen.route(), Some(Route::Dashboard));
        assert_eq!(app.current_route(), Route::Dashboard);
        assert_eq!(backend.calls("list_files"), 1);
        if let Screen::Dashboard(dash) = screen {
            assert_eq!(dash.view().files.len(), 1);
        }
    }

    #[tokio::test]
    async fn unknown_path_resolves_to_sign_in() {
        let app = App::new(Arc::new(FakeBackend::new()));
        app.boot().await;
        assert_eq!(app.open("/nowhere").await.route(), Some(Route::SignIn));
    }

    #[tokio::test]
    async fn sign_out_failure_still_reaches_sign_in() {
        let backend = Arc::new(
            FakeBackend::new()
                .with_user(Ok(identity("u1")))
                .with_logout(Err(WorkflowError::Network("offline".to_string()))),
        );
        let app = App::new(backend);
        app.boot().await;
        assert_eq!(app.open("/search").await.route(), Some(Route::Search));

        let screen = app.sign_out().await;
        assert_eq!(screen.route(), Some(Route::SignIn));
        assert!(!app.session().state().is_authenticated());
        assert_eq!(app.current_route(), Route::SignIn);
    }

    #[tokio::test]
    async fn completing_sign_in_moves_to_dashboard() {
        let app = App::new(Arc::new(FakeBackend::new()));
        app.boot().await;
        assert_eq!(app.open("/").await.route(), Some(Route::SignIn));

        let screen = app.complete_sign_in(identity("u9")).await;
        assert_eq!(screen.route(), Some(Route::Dashboard));
        assert!(app.nav_bar().show_sign_out);
    }
}
