use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use serde::Serialize;
use uuid::Uuid;

use crate::content::folders::DELETE_FOLDER_PROMPT;
use crate::content::FolderSummary;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

use super::form::UploadForm;

#[derive(Debug, Serialize)]
pub struct FolderList {
    pub folders: Vec<FolderSummary>,
    pub pending_delete: Option<Uuid>,
}

async fn snapshot(state: &AppState) -> FolderList {
    FolderList {
        folders: state.folders.folders().await,
        pending_delete: state.folders.pending_delete().await,
    }
}

/// GET /admin/folders - folders by order, each with its video count
pub async fn list(State(state): State<AppState>) -> ApiResult<FolderList> {
    state.folders.list().await?;
    Ok(ApiResponse::success(snapshot(&state).await))
}

/// POST /admin/folders - multipart `name` and optional `logo`
pub async fn create(State(state): State<AppState>, multipart: Multipart) -> ApiResult<FolderList> {
    let form = UploadForm::parse(multipart, "logo").await?;
    let name = form.text("name").to_string();

    if state.folders.folders().await.is_empty() {
        // order is derived from the in-memory list, so make sure it is current
        state.folders.list().await?;
    }
    state.folders.create(&name, form.file).await?;

    Ok(ApiResponse::created(snapshot(&state).await))
}

/// PUT /admin/folders/:id - multipart `name` and optional replacement `logo`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<FolderList> {
    let form = UploadForm::parse(multipart, "logo").await?;
    let name = form.text("name").to_string();

    state.folders.list().await?;
    state.folders.update(id, &name, form.file).await?;

    Ok(ApiResponse::success(snapshot(&state).await))
}

/// POST /admin/folders/:id/delete - first phase, asks for confirmation
pub async fn request_delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<serde_json::Value> {
    state.folders.request_delete(id).await;
    Ok(ApiResponse::with_status(
        serde_json::json!({
            "pending_delete": id,
            "confirm": DELETE_FOLDER_PROMPT,
        }),
        StatusCode::ACCEPTED,
    ))
}

/// POST /admin/folders/:id/delete/confirm - second phase
pub async fn confirm_delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<FolderList> {
    if state.folders.pending_delete().await != Some(id) {
        return Err(ApiError::bad_request("No delete is pending for this folder"));
    }
    state.folders.confirm_delete().await?;
    Ok(ApiResponse::success(snapshot(&state).await))
}

/// DELETE /admin/folders/:id/delete - cancel the pending delete
pub async fn cancel_delete(State(state): State<AppState>, Path(_id): Path<Uuid>) -> ApiResult<FolderList> {
    state.folders.cancel_delete().await;
    Ok(ApiResponse::success(snapshot(&state).await))
}
