//! Admin route tree and the session guard in front of it.
//!
//! Everything here is pure: [`navigate`] turns a path plus the current
//! [`AuthState`] into a [`Navigation`] without touching a router, so the HTTP
//! console and the CLI share one decision.

use serde::Serialize;

use crate::session::AuthState;

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/admin/login";
pub const DASHBOARD_PATH: &str = "/admin/dashboard";
pub const FOLDERS_PATH: &str = "/admin/folders";

/// Landing page after a successful login
pub const AFTER_LOGIN_PATH: &str = FOLDERS_PATH;
/// Landing page after logout
pub const AFTER_LOGOUT_PATH: &str = LOGIN_PATH;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "route", content = "folder_id", rename_all = "snake_case")]
pub enum Route {
    Home,
    Login,
    /// `/admin`, an alias for the dashboard
    AdminIndex,
    Dashboard,
    Folders,
    Videos(String),
}

impl Route {
    /// Match a path against the route tree; `None` for unknown paths
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Some(Route::Home),
            ["admin"] => Some(Route::AdminIndex),
            ["admin", "login"] => Some(Route::Login),
            ["admin", "dashboard"] => Some(Route::Dashboard),
            ["admin", "folders"] => Some(Route::Folders),
            ["admin", "videos", folder_id] => Some(Route::Videos((*folder_id).to_string())),
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => HOME_PATH.to_string(),
            Route::Login => LOGIN_PATH.to_string(),
            Route::AdminIndex => "/admin".to_string(),
            Route::Dashboard => DASHBOARD_PATH.to_string(),
            Route::Folders => FOLDERS_PATH.to_string(),
            Route::Videos(folder_id) => format!("/admin/videos/{}", folder_id),
        }
    }

    /// Every `/admin` route except the login entry point sits behind the guard
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Route::Home | Route::Login)
    }
}

/// Outcome of the session guard for a protected route
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "to", rename_all = "snake_case")]
pub enum GuardDecision {
    /// Session not resolved yet: show a neutral loading state, do not redirect
    Pending,
    Redirect(String),
    Render,
}

/// Session guard: decide whether protected content may render
pub fn guard(state: &AuthState) -> GuardDecision {
    match state {
        AuthState::Loading => GuardDecision::Pending,
        AuthState::Unauthenticated => GuardDecision::Redirect(LOGIN_PATH.to_string()),
        AuthState::Authenticated(_) => GuardDecision::Render,
    }
}

/// Result of navigating to a path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Navigation {
    Loading,
    Redirect { to: String },
    Render { route: Route },
}

/// Resolve a path: unknown paths go home, protected routes pass the guard,
/// and `/admin` forwards to the dashboard once the guard allows it
pub fn navigate(path: &str, state: &AuthState) -> Navigation {
    let route = match Route::parse(path) {
        Some(route) => route,
        None => return Navigation::Redirect { to: HOME_PATH.to_string() },
    };

    if route.requires_auth() {
        match guard(state) {
            GuardDecision::Pending => return Navigation::Loading,
            GuardDecision::Redirect(to) => return Navigation::Redirect { to },
            GuardDecision::Render => {}
        }
    }

    match route {
        Route::AdminIndex => Navigation::Redirect { to: DASHBOARD_PATH.to_string() },
        route => Navigation::Render { route },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::SessionUser;
    use uuid::Uuid;

    fn signed_in() -> AuthState {
        AuthState::Authenticated(SessionUser {
            id: Uuid::new_v4(),
            email: Some("admin@example.com".to_string()),
        })
    }

    #[test]
    fn parses_route_tree() {
        assert_eq!(Route::parse("/"), Some(Route::Home));
        assert_eq!(Route::parse("/admin/"), Some(Route::AdminIndex));
        assert_eq!(Route::parse("/admin/folders?x=1"), Some(Route::Folders));
        assert_eq!(Route::parse("/admin/videos/abc"), Some(Route::Videos("abc".to_string())));
        assert_eq!(Route::parse("/admin/videos"), None);
        assert_eq!(Route::parse("/blog"), None);
    }

    #[test]
    fn guard_is_three_state() {
        assert_eq!(guard(&AuthState::Loading), GuardDecision::Pending);
        assert_eq!(guard(&AuthState::Unauthenticated), GuardDecision::Redirect(LOGIN_PATH.to_string()));
        assert_eq!(guard(&signed_in()), GuardDecision::Render);
    }

    #[test]
    fn unauthenticated_folders_redirects_to_login() {
        assert_eq!(
            navigate("/admin/folders", &AuthState::Unauthenticated),
            Navigation::Redirect { to: LOGIN_PATH.to_string() }
        );
        assert_eq!(navigate("/admin/folders", &signed_in()), Navigation::Render { route: Route::Folders });
    }

    #[test]
    fn loading_never_redirects() {
        assert_eq!(navigate("/admin/dashboard", &AuthState::Loading), Navigation::Loading);
        assert_eq!(navigate("/admin", &AuthState::Loading), Navigation::Loading);
    }

    #[test]
    fn admin_index_is_guarded_before_forwarding() {
        assert_eq!(
            navigate("/admin", &AuthState::Unauthenticated),
            Navigation::Redirect { to: LOGIN_PATH.to_string() }
        );
        assert_eq!(
            navigate("/admin", &signed_in()),
            Navigation::Redirect { to: DASHBOARD_PATH.to_string() }
        );
    }

    #[test]
    fn public_routes_ignore_session() {
        assert_eq!(navigate("/", &AuthState::Loading), Navigation::Render { route: Route::Home });
        assert_eq!(
            navigate("/admin/login", &AuthState::Unauthenticated),
            Navigation::Render { route: Route::Login }
        );
        assert_eq!(navigate("/nope", &signed_in()), Navigation::Redirect { to: HOME_PATH.to_string() });
    }
}
