use std::sync::Arc;

use anyhow::Context;

use crate::config::{config, AppConfig};
use crate::content::{FolderManager, VideoManager};
use crate::navigation::{navigate, Navigation, LOGIN_PATH};
use crate::remote::{BlobStore, PgRecordStore, RecordStore, SupabaseAuth, SupabaseStorage};
use crate::session::{AuthState, SessionProvider};

use super::config::{clear_session, load_session, save_session};

/// Session and collaborators for one CLI invocation
pub struct Console {
    pub config: &'static AppConfig,
    pub session: Arc<SessionProvider>,
}

impl Console {
    /// Build the session provider and resolve it from the persisted session file
    pub async fn restore() -> anyhow::Result<Self> {
        let config = config();
        let auth = Arc::new(SupabaseAuth::new(&config.backend, &config.security)?);
        let session = Arc::new(
            SessionProvider::new(auth).with_expiry_skew(config.security.token_expiry_skew_secs),
        );

        let restored = load_session()?;
        let had_session = restored.is_some();

        match session.init(restored).await {
            AuthState::Authenticated(_) => {
                // refresh may have rotated the tokens
                if let Some(current) = session.current_session().await {
                    save_session(&current)?;
                }
            }
            _ if had_session => clear_session()?,
            _ => {}
        }

        Ok(Self { config, session })
    }

    /// Apply the route guard to a console path before running a protected command
    pub fn require(&self, path: &str) -> anyhow::Result<()> {
        match navigate(path, &self.session.state()) {
            Navigation::Render { .. } => Ok(()),
            Navigation::Redirect { to } if to == LOGIN_PATH => {
                anyhow::bail!("Not signed in. Run `portfolio auth login <email>` first.")
            }
            Navigation::Redirect { to } => anyhow::bail!("{} redirects to {}", path, to),
            Navigation::Loading => anyhow::bail!("Session is still resolving"),
        }
    }

    pub async fn records(&self) -> anyhow::Result<Arc<dyn RecordStore>> {
        let store = PgRecordStore::connect(&self.config.database)
            .await
            .context("failed to connect to the record store")?;
        Ok(Arc::new(store))
    }

    pub fn blobs(&self) -> anyhow::Result<Arc<dyn BlobStore>> {
        let storage = SupabaseStorage::new(&self.config.backend)?.with_token_source(self.session.clone());
        Ok(Arc::new(storage))
    }

    pub async fn folders(&self) -> anyhow::Result<FolderManager> {
        Ok(FolderManager::new(
            self.records().await?,
            self.blobs()?,
            self.config.storage.clone(),
        ))
    }

    pub async fn videos(&self, folder_id: &str) -> anyhow::Result<VideoManager> {
        Ok(VideoManager::new(
            self.records().await?,
            self.blobs()?,
            self.config.storage.clone(),
            folder_id,
        ))
    }
}
