use std::collections::HashMap;

use axum::extract::Multipart;

use crate::content::upload::content_type_for;
use crate::content::FileUpload;
use crate::error::ApiError;

/// Text fields plus at most one image file from a multipart form
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    pub file: Option<FileUpload>,
}

impl UploadForm {
    /// Collect the form; `file_field` names the image input. An empty file input counts as no file.
    pub async fn parse(mut multipart: Multipart, file_field: &str) -> Result<Self, ApiError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("Multipart error: {e}")))?
        {
            let name = field.name().unwrap_or("").to_string();
            if name == file_field {
                let file_name = field.file_name().map(String::from).unwrap_or_default();
                let content_type = field
                    .content_type()
                    .map(String::from)
                    .unwrap_or_else(|| content_type_for(&file_name));
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Read error: {e}")))?;

                if !file_name.is_empty() && !bytes.is_empty() {
                    form.file = Some(FileUpload::new(file_name, content_type, bytes.to_vec()));
                }
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Read error: {e}")))?;
                form.fields.insert(name, text);
            }
        }

        Ok(form)
    }

    /// Missing fields read as empty so the workflow's own validation decides
    pub fn text(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }
}
