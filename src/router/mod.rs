//! Console routes and the navigation guard
//!
//! Every navigation runs through [`guard`], a pure function of the target
//! route and the authentication flag. The router itself only remembers
//! where it is and where it has been.

use std::fmt;
use tokio::sync::{watch, RwLock};
use tracing::debug;
use url::Url;

/// Routes of the console
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    /// `registered` is set right after account creation so the page can say so
    Login { registered: bool },
    Register,
    Dashboard,
    Menu,
    Orders,
    Schedule,
    NotFound { path: String },
}

/// Per-route metadata the guard reads
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
}

impl Route {
    pub fn login() -> Self {
        Route::Login { registered: false }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Route::Home => "home",
            Route::Login { .. } => "login",
            Route::Register => "register",
            Route::Dashboard => "dashboard",
            Route::Menu => "menu",
            Route::Orders => "orders",
            Route::Schedule => "schedule",
            Route::NotFound { .. } => "not-found",
        }
    }

    pub fn meta(&self) -> RouteMeta {
        let requires_auth = matches!(
            self,
            Route::Dashboard | Route::Menu | Route::Orders | Route::Schedule
        );
        RouteMeta { requires_auth }
    }

    /// Path including the query string, e.g. `/login?registered=true`
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login { registered: false } => "/login".to_string(),
            Route::Login { registered: true } => "/login?registered=true".to_string(),
            Route::Register => "/register".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Menu => "/dashboard/menu".to_string(),
            Route::Orders => "/dashboard/orders".to_string(),
            Route::Schedule => "/dashboard/schedule".to_string(),
            Route::NotFound { path } => path.clone(),
        }
    }

    /// Resolve a location (path plus optional query) to a route.
    /// Unknown paths become [`Route::NotFound`].
    pub fn parse(location: &str) -> Route {
        let Some(url) = Url::parse("http://console.local/")
            .ok()
            .and_then(|base| base.join(location).ok())
        else {
            return Route::NotFound {
                path: location.to_string(),
            };
        };

        let path = url.path();
        let path = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };

        match path {
            "/" => Route::Home,
            "/login" => Route::Login {
                registered: url
                    .query_pairs()
                    .any(|(k, v)| k == "registered" && v == "true"),
            },
            "/register" => Route::Register,
            "/dashboard" => Route::Dashboard,
            "/dashboard/menu" => Route::Menu,
            "/dashboard/orders" => Route::Orders,
            "/dashboard/schedule" => Route::Schedule,
            other => Route::NotFound {
                path: other.to_string(),
            },
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl From<&str> for Route {
    fn from(location: &str) -> Self {
        Route::parse(location)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardOutcome {
    Allow,
    Redirect(Route),
}

/// Decide whether a navigation may proceed.
///
/// - protected route while logged out: go to login
/// - login or register while logged in: go to the dashboard
/// - anything else: allow
pub fn guard(target: &Route, authenticated: bool) -> GuardOutcome {
    if target.meta().requires_auth && !authenticated {
        GuardOutcome::Redirect(Route::login())
    } else if matches!(target, Route::Login { .. } | Route::Register) && authenticated {
        GuardOutcome::Redirect(Route::Dashboard)
    } else {
        GuardOutcome::Allow
    }
}

/// Redirects are guarded again; this bounds a misconfigured cycle.
const MAX_REDIRECTS: usize = 4;

#[derive(Debug)]
struct RouterState {
    current: Route,
    history: Vec<Route>,
}

/// Navigation state driven by the session's authentication flag
#[derive(Debug)]
pub struct Router {
    authenticated: watch::Receiver<bool>,
    state: RwLock<RouterState>,
}

impl Router {
    pub fn new(authenticated: watch::Receiver<bool>) -> Self {
        Self {
            authenticated,
            state: RwLock::new(RouterState {
                current: Route::Home,
                history: vec![Route::Home],
            }),
        }
    }

    fn is_authenticated(&self) -> bool {
        *self.authenticated.borrow()
    }

    /// Apply the guard until it allows the route
    pub fn resolve(&self, target: Route) -> Route {
        let authenticated = self.is_authenticated();
        let mut route = target;
        for _ in 0..MAX_REDIRECTS {
            match guard(&route, authenticated) {
                GuardOutcome::Allow => break,
                GuardOutcome::Redirect(next) => {
                    debug!(from = %route, to = %next, authenticated, "Navigation redirected");
                    route = next;
                }
            }
        }
        route
    }

    /// Navigate to a route; returns where the guard actually landed.
    pub async fn push(&self, target: Route) -> Route {
        let resolved = self.resolve(target);
        let mut state = self.state.write().await;
        state.current = resolved.clone();
        state.history.push(resolved.clone());
        resolved
    }

    pub async fn navigate(&self, location: &str) -> Route {
        self.push(Route::parse(location)).await
    }

    pub async fn current(&self) -> Route {
        self.state.read().await.current.clone()
    }

    /// Every route landed on, oldest first
    pub async fn history(&self) -> Vec<Route> {
        self.state.read().await.history.clone()
    }
}
