use std::sync::Arc;

use crate::config::StorageConfig;
use crate::content::{FolderManager, VideoManager};
use crate::remote::{BlobStore, RecordStore};
use crate::session::SessionProvider;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<SessionProvider>,
    pub records: Arc<dyn RecordStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub storage: StorageConfig,
    /// One folder manager for the process so a pending delete survives between requests
    pub folders: Arc<FolderManager>,
}

impl AppState {
    pub fn new(
        session: Arc<SessionProvider>,
        records: Arc<dyn RecordStore>,
        blobs: Arc<dyn BlobStore>,
        storage: StorageConfig,
    ) -> Self {
        let folders = Arc::new(FolderManager::new(records.clone(), blobs.clone(), storage.clone()));
        Self {
            session,
            records,
            blobs,
            storage,
            folders,
        }
    }

    /// Video manager scoped to the folder named in the route
    pub fn videos(&self, folder_id: &str) -> VideoManager {
        VideoManager::new(self.records.clone(), self.blobs.clone(), self.storage.clone(), folder_id)
    }
}
