use thiserror::Error;
use uuid::Uuid;

use crate::remote::RemoteError;
use crate::types::Table;

/// Failures of a folder or video workflow.
///
/// Every variant carries a message fit for the person using the console via
/// [`ContentError::user_message`]; callers surface it the same way regardless of kind.
#[derive(Debug, Error)]
pub enum ContentError {
    /// Rejected before any network call
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The image upload failed, so the dependent record write was skipped
    #[error("Upload of {kind} failed: {source}")]
    Upload {
        kind: &'static str,
        #[source]
        source: RemoteError,
    },

    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    /// The video is not one of the loaded folder's videos
    #[error("Video not found in this folder: {0}")]
    VideoNotFound(Uuid),

    #[error("Could not {action}: {source}")]
    Remote {
        action: &'static str,
        #[source]
        source: RemoteError,
    },

    #[error("Malformed {table} row: {source}")]
    Decode {
        table: Table,
        #[source]
        source: serde_json::Error,
    },
}

impl ContentError {
    pub(crate) fn remote(action: &'static str) -> impl FnOnce(RemoteError) -> ContentError {
        move |source| ContentError::Remote { action, source }
    }

    pub fn user_message(&self) -> String {
        match self {
            ContentError::Validation(msg) => msg.clone(),
            ContentError::Upload { kind, .. } => format!("Failed to upload {}. Please try again.", kind),
            ContentError::FolderNotFound(_) => "This folder no longer exists.".to_string(),
            ContentError::VideoNotFound(_) => "This video is not in this folder.".to_string(),
            ContentError::Remote { action, .. } => format!("Could not {}. Please try again.", action),
            ContentError::Decode { .. } => "The server returned unexpected data.".to_string(),
        }
    }
}
