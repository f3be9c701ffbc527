use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::filter::{FilterData, SortDirection};
use crate::remote::{BlobStore, RecordStore};
use crate::types::Table;

use super::error::ContentError;
use super::folders::to_record;
use super::models::{decode_rows, Folder, Video};
use super::upload::{thumbnail_object_path, upload_image, FileUpload};

pub const REQUIRED_FIELDS_MESSAGE: &str = "Please fill in all required fields";
pub const DELETE_VIDEO_PROMPT: &str = "Are you sure you want to delete this video?";

/// Yes/no confirmation asked before a destructive action
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

/// A pre-answered confirmation
impl Confirm for bool {
    fn confirm(&self, _message: &str) -> bool {
        *self
    }
}

/// CRUD workflow over the videos of a single folder
pub struct VideoManager {
    records: Arc<dyn RecordStore>,
    blobs: Arc<dyn BlobStore>,
    storage: StorageConfig,
    folder_id: String,
    folder: RwLock<Option<Folder>>,
    videos: RwLock<Vec<Video>>,
}

impl VideoManager {
    /// Scope a manager to the `folder_id` taken from the route
    pub fn new(
        records: Arc<dyn RecordStore>,
        blobs: Arc<dyn BlobStore>,
        storage: StorageConfig,
        folder_id: impl Into<String>,
    ) -> Self {
        Self {
            records,
            blobs,
            storage,
            folder_id: folder_id.into(),
            folder: RwLock::new(None),
            videos: RwLock::new(Vec::new()),
        }
    }

    pub async fn folder(&self) -> Option<Folder> {
        self.folder.read().await.clone()
    }

    pub async fn videos(&self) -> Vec<Video> {
        self.videos.read().await.clone()
    }

    /// A video of the loaded folder; ids from other folders are rejected
    pub async fn find(&self, id: Uuid) -> Result<Video, ContentError> {
        self.videos
            .read()
            .await
            .iter()
            .find(|v| v.id == id)
            .cloned()
            .ok_or(ContentError::VideoNotFound(id))
    }

    fn folder_uuid(&self) -> Result<Uuid, ContentError> {
        Uuid::parse_str(&self.folder_id).map_err(|_| ContentError::FolderNotFound(self.folder_id.clone()))
    }

    /// Fetch the parent folder, then its videos by ascending `order`
    pub async fn load(&self) -> Result<(), ContentError> {
        let folder_id = self.folder_uuid()?;

        let rows = self
            .records
            .query(
                Table::Folders,
                FilterData::new().where_eq("id", folder_id.to_string()).limit(1),
            )
            .await
            .map_err(ContentError::remote("load folder"))?;
        let folder = decode_rows::<Folder>(Table::Folders, rows)?
            .into_iter()
            .next()
            .ok_or_else(|| ContentError::FolderNotFound(self.folder_id.clone()))?;

        let rows = self
            .records
            .query(
                Table::Videos,
                FilterData::new()
                    .where_eq("folder_id", folder_id.to_string())
                    .order_by("order", SortDirection::Asc),
            )
            .await
            .map_err(ContentError::remote("load videos"))?;
        let videos: Vec<Video> = decode_rows(Table::Videos, rows)?;

        debug!("loaded {} videos for folder {}", videos.len(), folder.id);
        *self.folder.write().await = Some(folder);
        *self.videos.write().await = videos;
        Ok(())
    }

    pub async fn create(
        &self,
        title: &str,
        video_url: &str,
        thumbnail: Option<FileUpload>,
    ) -> Result<(), ContentError> {
        validate_fields(title, video_url)?;
        let folder_id = self.folder_uuid()?;

        let thumbnail_url = match thumbnail {
            Some(file) => self.upload_thumbnail(file).await?,
            None => String::new(),
        };

        let order = self.videos.read().await.len() as i64;
        let record = to_record(json!({
            "folder_id": folder_id,
            "title": title,
            "video_url": video_url,
            "thumbnail_url": thumbnail_url,
            "order": order,
            "created_at": Utc::now(),
        }));

        self.records
            .insert(Table::Videos, record)
            .await
            .map_err(ContentError::remote("add video"))?;
        info!("Created video '{}' in folder {}", title, folder_id);

        self.refresh().await;
        Ok(())
    }

    /// Overwrite title and link; `thumbnail_url` only changes when a new file is given.
    ///
    /// `id` must be one of the videos from the last [`VideoManager::load`].
    pub async fn update(
        &self,
        id: Uuid,
        title: &str,
        video_url: &str,
        thumbnail: Option<FileUpload>,
    ) -> Result<(), ContentError> {
        validate_fields(title, video_url)?;
        self.find(id).await?;

        let mut fields = to_record(json!({
            "title": title,
            "video_url": video_url,
        }));
        if let Some(file) = thumbnail {
            let url = self.upload_thumbnail(file).await?;
            fields.insert("thumbnail_url".to_string(), url.into());
        }

        self.records
            .update(Table::Videos, id, fields)
            .await
            .map_err(ContentError::remote("update video"))?;
        info!("Updated video {}", id);

        self.refresh().await;
        Ok(())
    }

    /// Delete after a confirmation; returns `false` when declined
    pub async fn delete<C: Confirm + ?Sized>(&self, id: Uuid, confirm: &C) -> Result<bool, ContentError> {
        self.find(id).await?;
        if !confirm.confirm(DELETE_VIDEO_PROMPT) {
            debug!("delete of video {} declined", id);
            return Ok(false);
        }

        self.records
            .delete(Table::Videos, id)
            .await
            .map_err(ContentError::remote("delete video"))?;
        info!("Deleted video {}", id);

        self.refresh().await;
        Ok(true)
    }

    async fn upload_thumbnail(&self, file: FileUpload) -> Result<String, ContentError> {
        let path = thumbnail_object_path(&self.storage.thumbnail_prefix, &file, Utc::now());
        upload_image(self.blobs.as_ref(), &self.storage.thumbnail_bucket, &path, file)
            .await
            .map_err(|source| {
                warn!("Thumbnail upload to {} failed: {}", path, source);
                ContentError::Upload { kind: "thumbnail", source }
            })
    }

    async fn refresh(&self) {
        if let Err(e) = self.load().await {
            warn!("Video list refresh failed: {}", e);
        }
    }
}

fn validate_fields(title: &str, video_url: &str) -> Result<(), ContentError> {
    if title.trim().is_empty() || video_url.trim().is_empty() {
        return Err(ContentError::Validation(REQUIRED_FIELDS_MESSAGE.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryBackend;
    use crate::types::Operation;
    use std::cell::Cell;

    struct Recorder {
        answer: bool,
        asked: Cell<usize>,
    }

    impl Confirm for Recorder {
        fn confirm(&self, message: &str) -> bool {
            assert_eq!(message, DELETE_VIDEO_PROMPT);
            self.asked.set(self.asked.get() + 1);
            self.answer
        }
    }

    async fn seeded() -> (Arc<MemoryBackend>, VideoManager) {
        let backend = Arc::new(MemoryBackend::new());
        let folder = backend.seed(Table::Folders, json!({ "name": "Events", "order": 0 })).await;
        let videos = VideoManager::new(backend.clone(), backend.clone(), StorageConfig::default(), folder.to_string());
        videos.load().await.unwrap();
        (backend, videos)
    }

    fn thumb() -> FileUpload {
        FileUpload::new("cover.jpg", "image/jpeg", vec![0xff, 0xd8])
    }

    #[tokio::test]
    async fn missing_fields_make_no_calls() {
        let (backend, videos) = seeded().await;
        let before = backend.calls().await.len();

        let err = videos.create("", "https://v.example/1", Some(thumb())).await.unwrap_err();
        assert_eq!(err.user_message(), REQUIRED_FIELDS_MESSAGE);
        let err = videos.create("Reel", "  ", None).await.unwrap_err();
        assert!(matches!(err, ContentError::Validation(_)));

        assert_eq!(backend.calls().await.len(), before);
        assert_eq!(backend.upload_count().await, 0);
    }

    #[tokio::test]
    async fn create_appends_with_empty_thumbnail() {
        let (_backend, videos) = seeded().await;

        videos.create("Reel", "https://v.example/1", None).await.unwrap();
        videos.create("Teaser", "https://v.example/2", Some(thumb())).await.unwrap();

        let list = videos.videos().await;
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].title, "Reel");
        assert_eq!(list[0].thumbnail_url.as_deref(), Some(""));
        assert_eq!(list[0].order, 0);
        assert_eq!(list[1].order, 1);
        let url = list[1].thumbnail_url.clone().unwrap();
        assert!(url.contains("/thumbnails/thumbnails/"), "{}", url);
    }

    #[tokio::test]
    async fn update_without_thumbnail_keeps_it() {
        let (backend, videos) = seeded().await;
        videos.create("Reel", "https://v.example/1", Some(thumb())).await.unwrap();
        let original = videos.videos().await[0].clone();

        videos.update(original.id, "Reel 2", "https://v.example/9", None).await.unwrap();

        let updated = videos.videos().await[0].clone();
        assert_eq!(updated.title, "Reel 2");
        assert_eq!(updated.thumbnail_url, original.thumbnail_url);
        assert_eq!(backend.upload_count().await, 1);
    }

    #[tokio::test]
    async fn declined_delete_makes_no_call() {
        let (backend, videos) = seeded().await;
        videos.create("Reel", "https://v.example/1", None).await.unwrap();
        let id = videos.videos().await[0].id;

        let decline = Recorder { answer: false, asked: Cell::new(0) };
        assert!(!videos.delete(id, &decline).await.unwrap());
        assert_eq!(decline.asked.get(), 1);
        assert_eq!(backend.call_count(Table::Videos, Operation::Delete).await, 0);
        assert_eq!(videos.videos().await.len(), 1);

        assert!(videos.delete(id, &true).await.unwrap());
        assert!(videos.videos().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_folder_fails_load() {
        let backend = Arc::new(MemoryBackend::new());
        let videos = VideoManager::new(backend.clone(), backend.clone(), StorageConfig::default(), Uuid::new_v4().to_string());
        assert!(matches!(videos.load().await, Err(ContentError::FolderNotFound(_))));

        let videos = VideoManager::new(backend.clone(), backend, StorageConfig::default(), "not-a-uuid");
        assert!(matches!(videos.load().await, Err(ContentError::FolderNotFound(_))));
    }

    #[tokio::test]
    async fn only_this_folders_videos_are_loaded() {
        let (backend, videos) = seeded().await;
        let other = backend.seed(Table::Folders, json!({ "name": "Other", "order": 1 })).await;
        backend
            .seed(Table::Videos, json!({ "folder_id": other, "title": "x", "video_url": "u" }))
            .await;

        videos.create("Mine", "https://v.example/1", None).await.unwrap();
        let titles: Vec<_> = videos.videos().await.into_iter().map(|v| v.title).collect();
        assert_eq!(titles, vec!["Mine"]);
    }

    #[tokio::test]
    async fn failed_thumbnail_upload_writes_nothing() {
        let (backend, videos) = seeded().await;
        videos.create("Reel", "https://v.example/1", None).await.unwrap();
        let id = videos.videos().await[0].id;

        backend.fail_uploads(true);
        let err = videos.create("Teaser", "https://v.example/2", Some(thumb())).await.unwrap_err();
        assert_eq!(err.user_message(), "Failed to upload thumbnail. Please try again.");
        assert_eq!(backend.call_count(Table::Videos, Operation::Create).await, 1);

        let err = videos.update(id, "Reel 2", "https://v.example/9", Some(thumb())).await.unwrap_err();
        assert!(matches!(err, ContentError::Upload { kind: "thumbnail", .. }));
        assert_eq!(backend.call_count(Table::Videos, Operation::Update).await, 0);
        assert_eq!(videos.videos().await[0].title, "Reel");
    }

    #[tokio::test]
    async fn videos_of_other_folders_are_out_of_reach() {
        let (backend, videos) = seeded().await;
        let other = backend.seed(Table::Folders, json!({ "name": "Other", "order": 1 })).await;
        let foreign = backend
            .seed(Table::Videos, json!({ "folder_id": other, "title": "x", "video_url": "u", "order": 0 }))
            .await;

        let err = videos.update(foreign, "hijacked", "https://v.example/1", None).await.unwrap_err();
        assert!(matches!(err, ContentError::VideoNotFound(id) if id == foreign));
        let err = videos.delete(foreign, &true).await.unwrap_err();
        assert_eq!(err.user_message(), "This video is not in this folder.");

        assert_eq!(backend.call_count(Table::Videos, Operation::Update).await, 0);
        assert_eq!(backend.call_count(Table::Videos, Operation::Delete).await, 0);
        assert_eq!(backend.rows(Table::Videos).await[0]["title"], "x");
    }

    #[tokio::test]
    async fn write_failure_is_reported_and_list_kept() {
        let (backend, videos) = seeded().await;
        videos.create("Reel", "https://v.example/1", None).await.unwrap();
        let id = videos.videos().await[0].id;

        backend.fail_writes(true);
        let err = videos.create("Teaser", "https://v.example/2", None).await.unwrap_err();
        assert_eq!(err.user_message(), "Could not add video. Please try again.");
        let err = videos.update(id, "Reel 2", "https://v.example/9", None).await.unwrap_err();
        assert_eq!(err.user_message(), "Could not update video. Please try again.");
        let err = videos.delete(id, &true).await.unwrap_err();
        assert_eq!(err.user_message(), "Could not delete video. Please try again.");

        assert_eq!(videos.videos().await.len(), 1);
        assert_eq!(backend.rows(Table::Videos).await.len(), 1);
    }

    #[tokio::test]
    async fn refresh_failure_after_delete_is_not_an_error() {
        let (backend, videos) = seeded().await;
        videos.create("Reel", "https://v.example/1", None).await.unwrap();
        let id = videos.videos().await[0].id;

        backend.fail_queries(true);
        assert!(videos.delete(id, &true).await.unwrap());
        assert!(backend.rows(Table::Videos).await.is_empty());
    }
}
