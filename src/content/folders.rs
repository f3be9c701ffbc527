use std::sync::Arc;

use chrono::Utc;
use futures::future::try_join_all;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::filter::{FilterData, SortDirection};
use crate::remote::{BlobStore, Record, RecordStore};
use crate::types::Table;

use super::error::ContentError;
use super::models::{decode_rows, Folder, FolderSummary};
use super::upload::{logo_object_path, upload_image, FileUpload};

pub const DELETE_FOLDER_PROMPT: &str =
    "Are you sure you want to delete this folder? This action cannot be undone.";

/// CRUD workflow over the `folders` collection, including logo uploads
pub struct FolderManager {
    records: Arc<dyn RecordStore>,
    blobs: Arc<dyn BlobStore>,
    storage: StorageConfig,
    folders: RwLock<Vec<FolderSummary>>,
    pending_delete: RwLock<Option<Uuid>>,
}

impl FolderManager {
    pub fn new(records: Arc<dyn RecordStore>, blobs: Arc<dyn BlobStore>, storage: StorageConfig) -> Self {
        Self {
            records,
            blobs,
            storage,
            folders: RwLock::new(Vec::new()),
            pending_delete: RwLock::new(None),
        }
    }

    /// Snapshot of the last successful list
    pub async fn folders(&self) -> Vec<FolderSummary> {
        self.folders.read().await.clone()
    }

    /// Fetch folders by ascending `order`, each with its video count.
    ///
    /// Any failure aborts the whole fetch and leaves the previous snapshot in place.
    pub async fn list(&self) -> Result<Vec<FolderSummary>, ContentError> {
        let rows = self
            .records
            .query(Table::Folders, FilterData::new().order_by("order", SortDirection::Asc))
            .await
            .map_err(ContentError::remote("load folders"))?;
        let folders: Vec<Folder> = decode_rows(Table::Folders, rows)?;

        let counts = try_join_all(folders.iter().map(|folder| {
            self.records.count(
                Table::Videos,
                FilterData::new().where_eq("folder_id", folder.id.to_string()),
            )
        }))
        .await
        .map_err(ContentError::remote("count videos"))?;

        let summaries: Vec<FolderSummary> = folders
            .into_iter()
            .zip(counts)
            .map(|(folder, video_count)| FolderSummary { folder, video_count })
            .collect();

        debug!("listed {} folders", summaries.len());
        *self.folders.write().await = summaries.clone();
        Ok(summaries)
    }

    pub async fn create(&self, name: &str, logo: Option<FileUpload>) -> Result<(), ContentError> {
        let name = validate_name(name)?;

        let logo_url = match logo {
            Some(file) => Some(self.upload_logo(file).await?),
            None => None,
        };

        // append to the end; two concurrent creators can land on the same order
        let order = self.folders.read().await.len() as i64;
        let record = to_record(json!({
            "name": name,
            "logo_url": logo_url,
            "order": order,
            "created_at": Utc::now(),
        }));

        self.records
            .insert(Table::Folders, record)
            .await
            .map_err(ContentError::remote("add folder"))?;
        info!("Created folder '{}' at order {}", name, order);

        self.refresh().await;
        Ok(())
    }

    /// Replace name and logo; without a new file the current `logo_url` is kept
    pub async fn update(&self, id: Uuid, name: &str, logo: Option<FileUpload>) -> Result<(), ContentError> {
        let name = validate_name(name)?;

        let current = self
            .folders
            .read()
            .await
            .iter()
            .find(|f| f.folder.id == id)
            .map(|f| f.folder.clone())
            .ok_or_else(|| ContentError::FolderNotFound(id.to_string()))?;

        let logo_url = match logo {
            Some(file) => Some(self.upload_logo(file).await?),
            None => current.logo_url,
        };

        let fields = to_record(json!({
            "name": name,
            "logo_url": logo_url,
        }));
        self.records
            .update(Table::Folders, id, fields)
            .await
            .map_err(ContentError::remote("update folder"))?;
        info!("Updated folder {}", id);

        self.refresh().await;
        Ok(())
    }

    /// First phase of delete: remember the id, no backend call
    pub async fn request_delete(&self, id: Uuid) {
        *self.pending_delete.write().await = Some(id);
    }

    pub async fn pending_delete(&self) -> Option<Uuid> {
        *self.pending_delete.read().await
    }

    pub async fn cancel_delete(&self) {
        self.pending_delete.write().await.take();
    }

    /// Second phase of delete. Returns the deleted id, or `None` when nothing was pending.
    ///
    /// Videos of the folder are left in place.
    pub async fn confirm_delete(&self) -> Result<Option<Uuid>, ContentError> {
        let Some(id) = self.pending_delete().await else {
            return Ok(None);
        };

        self.records
            .delete(Table::Folders, id)
            .await
            .map_err(ContentError::remote("delete folder"))?;
        {
            // a request for another folder may have arrived during the delete
            let mut pending = self.pending_delete.write().await;
            if *pending == Some(id) {
                pending.take();
            }
        }
        info!("Deleted folder {}", id);

        self.refresh().await;
        Ok(Some(id))
    }

    async fn upload_logo(&self, file: FileUpload) -> Result<String, ContentError> {
        let path = logo_object_path(&self.storage.logo_prefix, &file);
        upload_image(self.blobs.as_ref(), &self.storage.logo_bucket, &path, file)
            .await
            .map_err(|source| {
                warn!("Logo upload to {} failed: {}", path, source);
                ContentError::Upload { kind: "logo", source }
            })
    }

    async fn refresh(&self) {
        if let Err(e) = self.list().await {
            warn!("Folder list refresh failed: {}", e);
        }
    }
}

fn validate_name(name: &str) -> Result<&str, ContentError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ContentError::Validation("Please enter a folder name".to_string()));
    }
    Ok(trimmed)
}

pub(crate) fn to_record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}
