use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;

use crate::navigation::{guard, GuardDecision};
use crate::remote::AccessTokenSource;
use crate::state::AppState;

use super::response::ApiResponse;

tokio::task_local! {
    static REQUEST_TOKEN: String;
}

/// Session guard for every protected `/admin` route.
///
/// Each request is judged on its own `Authorization: Bearer` token. While the
/// server's session provider is still resolving the request gets a neutral `202`
/// loading body instead of a redirect. Once signed in, the
/// [`crate::remote::SessionUser`] is placed in the request extensions and the
/// token is visible to [`RequestAccessToken`] for the rest of the request.
pub async fn session_guard(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let token = bearer_token(request.headers()).map(str::to_string);
    let auth = state.session.authorize(token.as_deref()).await;

    match guard(&auth) {
        GuardDecision::Render => {
            if let Some(user) = auth.user() {
                request.extensions_mut().insert(user.clone());
            }
            match token {
                Some(token) => REQUEST_TOKEN.scope(token, next.run(request)).await,
                None => next.run(request).await,
            }
        }
        GuardDecision::Pending => {
            tracing::debug!("{} requested before session resolved", request.uri().path());
            ApiResponse::accepted(json!({ "view": "loading" })).into_response()
        }
        GuardDecision::Redirect(to) => Redirect::to(&to).into_response(),
    }
}

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Access token of the request currently being served, for authorizing storage writes as that user
pub struct RequestAccessToken;

#[async_trait]
impl AccessTokenSource for RequestAccessToken {
    async fn access_token(&self) -> Option<String> {
        REQUEST_TOKEN.try_with(|token| token.clone()).ok()
    }
}
