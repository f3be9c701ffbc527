use axum::{extract::State, http::HeaderMap, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::middleware::{bearer_token, ApiResponse, ApiResult};
use crate::navigation::{AFTER_LOGIN_PATH, AFTER_LOGOUT_PATH};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /admin/login - sign in with email and password.
///
/// The server keeps no login of its own: the caller sends the returned
/// `access_token` as `Authorization: Bearer` on every protected request.
pub async fn login(State(state): State<AppState>, Json(payload): Json<LoginRequest>) -> ApiResult<Value> {
    let session = state.session.authenticate(payload.email.trim(), &payload.password).await?;

    Ok(ApiResponse::success(json!({
        "user": session.user,
        "access_token": session.access_token,
        "refresh_token": session.refresh_token,
        "expires_at": session.expires_at,
        "redirect": AFTER_LOGIN_PATH,
    })))
}

/// POST /admin/logout - revokes the caller's token; answers the same even when revocation fails
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Value> {
    if let Some(token) = bearer_token(&headers) {
        if let Err(e) = state.session.revoke(token).await {
            tracing::warn!("Remote sign-out failed: {}", e);
        }
    }

    Ok(ApiResponse::success(json!({ "redirect": AFTER_LOGOUT_PATH })))
}
