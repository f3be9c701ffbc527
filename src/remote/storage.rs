use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::BackendConfig;

use super::auth::check_status;
use super::{BlobStore, RemoteError, RemoteResult};

/// Supplies the bearer token for storage writes (the signed-in user's access token)
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    async fn access_token(&self) -> Option<String>;
}

/// Client for the managed backend's object storage REST API
#[derive(Clone)]
pub struct SupabaseStorage {
    client: Client,
    base_url: String,
    anon_key: String,
    tokens: Option<Arc<dyn AccessTokenSource>>,
}

impl SupabaseStorage {
    pub fn new(backend: &BackendConfig) -> RemoteResult<Self> {
        if backend.url.is_empty() {
            return Err(RemoteError::ConfigMissing("SUPABASE_URL"));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(backend.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: backend.url.clone(),
            anon_key: backend.anon_key.clone(),
            tokens: None,
        })
    }

    /// Authorize uploads as the signed-in user instead of the anonymous key
    pub fn with_token_source(mut self, tokens: Arc<dyn AccessTokenSource>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    fn object_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl BlobStore for SupabaseStorage {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> RemoteResult<()> {
        let token = match &self.tokens {
            Some(source) => source.access_token().await,
            None => None,
        };
        let bearer = token.unwrap_or_else(|| self.anon_key.clone());

        debug!("uploading {} bytes to {}/{}", bytes.len(), bucket, path);
        let response = self
            .client
            .post(self.object_url(bucket, path))
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            bucket,
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> SupabaseStorage {
        SupabaseStorage::new(&BackendConfig {
            url: "https://abc.supabase.co".to_string(),
            anon_key: "anon".to_string(),
            request_timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn public_url_points_at_public_object() {
        assert_eq!(
            storage().public_url("portfolio", "logos/0.42.png"),
            "https://abc.supabase.co/storage/v1/object/public/portfolio/logos/0.42.png"
        );
    }

    #[test]
    fn object_url_strips_leading_slash() {
        assert_eq!(
            storage().object_url("thumbnails", "/thumbnails/1_a.jpg"),
            "https://abc.supabase.co/storage/v1/object/thumbnails/thumbnails/1_a.jpg"
        );
    }

    #[test]
    fn missing_url_is_a_config_error() {
        let result = SupabaseStorage::new(&BackendConfig {
            url: String::new(),
            anon_key: String::new(),
            request_timeout_secs: 5,
        });
        assert!(matches!(result, Err(RemoteError::ConfigMissing("SUPABASE_URL"))));
    }
}
