use axum::extract::{Multipart, Path, Query, State};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::content::videos::DELETE_VIDEO_PROMPT;
use crate::content::{Folder, Playback, Video, VideoManager};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

use super::form::UploadForm;

/// A video plus how it should be played back
#[derive(Debug, Serialize)]
pub struct VideoView {
    #[serde(flatten)]
    pub video: Video,
    pub playback: Playback,
}

#[derive(Debug, Serialize)]
pub struct FolderVideos {
    pub folder: Option<Folder>,
    pub videos: Vec<VideoView>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub confirm: bool,
}

async fn loaded(state: &AppState, folder_id: &str) -> Result<VideoManager, crate::error::ApiError> {
    let manager = state.videos(folder_id);
    manager.load().await?;
    Ok(manager)
}

async fn view(manager: &VideoManager) -> FolderVideos {
    let videos = manager
        .videos()
        .await
        .into_iter()
        .map(|video| VideoView {
            playback: Playback::for_url(&video.video_url),
            video,
        })
        .collect();

    FolderVideos {
        folder: manager.folder().await,
        videos,
    }
}

/// GET /admin/videos/:folder_id - parent folder and its videos by order
pub async fn list(State(state): State<AppState>, Path(folder_id): Path<String>) -> ApiResult<FolderVideos> {
    let manager = loaded(&state, &folder_id).await?;
    Ok(ApiResponse::success(view(&manager).await))
}

/// POST /admin/videos/:folder_id - multipart `title`, `video_url` and optional `thumbnail`
pub async fn create(
    State(state): State<AppState>,
    Path(folder_id): Path<String>,
    multipart: Multipart,
) -> ApiResult<FolderVideos> {
    let form = UploadForm::parse(multipart, "thumbnail").await?;
    let manager = loaded(&state, &folder_id).await?;

    let title = form.text("title").to_string();
    let video_url = form.text("video_url").to_string();
    manager.create(&title, &video_url, form.file).await?;

    Ok(ApiResponse::created(view(&manager).await))
}

/// PUT /admin/videos/:folder_id/:video_id
pub async fn update(
    State(state): State<AppState>,
    Path((folder_id, video_id)): Path<(String, Uuid)>,
    multipart: Multipart,
) -> ApiResult<FolderVideos> {
    let form = UploadForm::parse(multipart, "thumbnail").await?;
    let manager = loaded(&state, &folder_id).await?;

    let title = form.text("title").to_string();
    let video_url = form.text("video_url").to_string();
    manager.update(video_id, &title, &video_url, form.file).await?;

    Ok(ApiResponse::success(view(&manager).await))
}

/// DELETE /admin/videos/:folder_id/:video_id?confirm=true
///
/// Without `confirm=true` nothing is deleted and the prompt is returned.
pub async fn delete(
    State(state): State<AppState>,
    Path((folder_id, video_id)): Path<(String, Uuid)>,
    Query(query): Query<DeleteQuery>,
) -> ApiResult<Value> {
    let manager = loaded(&state, &folder_id).await?;
    let deleted = manager.delete(video_id, &query.confirm).await?;

    if !deleted {
        return Ok(ApiResponse::success(json!({
            "deleted": false,
            "confirm": DELETE_VIDEO_PROMPT,
        })));
    }

    Ok(ApiResponse::success(json!({
        "deleted": true,
        "videos": view(&manager).await.videos,
    })))
}
