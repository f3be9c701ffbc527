use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Redirect},
    Extension,
};
use serde_json::{json, Value};

use crate::middleware::{bearer_token, ApiResponse, ApiResult};
use crate::navigation::{navigate, Navigation, DASHBOARD_PATH, HOME_PATH};
use crate::remote::SessionUser;
use crate::session::AuthState;
use crate::state::AppState;

/// GET / - public landing
pub async fn root() -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "name": "Portfolio Admin",
        "version": env!("CARGO_PKG_VERSION"),
        "routes": {
            "login": "/admin/login",
            "dashboard": "/admin/dashboard (protected)",
            "folders": "/admin/folders (protected)",
            "videos": "/admin/videos/:folder_id (protected)",
        }
    })))
}

/// GET /admin/login - login entry point, reachable in any session state
pub async fn login_page(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Value> {
    let session = state.session.authorize(bearer_token(&headers)).await;
    Ok(ApiResponse::success(json!({
        "view": "login",
        "session": session,
    })))
}

/// GET /admin/session - three-state session value for the caller's token
pub async fn session_state(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Value> {
    let session = state.session.authorize(bearer_token(&headers)).await;
    Ok(ApiResponse::success(json!(session)))
}

/// GET /admin - forwards to the dashboard once past the guard
pub async fn admin_index(Extension(user): Extension<SessionUser>) -> impl IntoResponse {
    match navigate("/admin", &AuthState::Authenticated(user)) {
        Navigation::Redirect { to } => Redirect::to(&to),
        _ => Redirect::to(DASHBOARD_PATH),
    }
}

/// Unknown paths go home
pub async fn fallback() -> Redirect {
    Redirect::to(HOME_PATH)
}
