use std::path::Path;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::remote::{BlobStore, RemoteError};

/// An image picked for upload: original file name, MIME type and contents
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read a local file, guessing the content type from its extension
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let content_type = content_type_for(&file_name);
        Ok(Self { file_name, content_type, bytes })
    }

    /// Text after the last dot; the whole name when there is none
    pub fn extension(&self) -> &str {
        self.file_name.rsplit('.').next().unwrap_or_default()
    }
}

/// MIME type guessed from the file name, `application/octet-stream` when unknown
pub fn content_type_for(file_name: &str) -> String {
    mime_guess::from_path(file_name).first_or_octet_stream().to_string()
}

/// `<prefix>/<random>.<ext>` for folder logos
pub fn logo_object_path(prefix: &str, upload: &FileUpload) -> String {
    format!("{}/{}.{}", prefix, Uuid::new_v4().simple(), upload.extension())
}

/// `<prefix>/<unix millis>_<random suffix>.<ext>` for thumbnails; collisions are unlikely, not impossible
pub fn thumbnail_object_path(prefix: &str, upload: &FileUpload, now: DateTime<Utc>) -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(7).collect();
    format!("{}/{}_{}.{}", prefix, now.timestamp_millis(), suffix, upload.extension())
}

/// Upload and resolve the public URL; nothing is returned unless the upload succeeded
pub(crate) async fn upload_image(
    blobs: &dyn BlobStore,
    bucket: &str,
    path: &str,
    upload: FileUpload,
) -> Result<String, RemoteError> {
    blobs.upload(bucket, path, upload.bytes, &upload.content_type).await?;
    Ok(blobs.public_url(bucket, path))
}
