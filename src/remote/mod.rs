//! Seams to the managed backend: record store, blob store and auth service.
//!
//! Managers only ever talk to these traits. The concrete collaborators are
//! [`postgres::PgRecordStore`], [`storage::SupabaseStorage`] and
//! [`auth::SupabaseAuth`]; `crate::testing::MemoryBackend` implements all three
//! in memory.

pub mod auth;
pub mod postgres;
pub mod storage;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::filter::{FilterData, FilterError};
use crate::types::Table;

pub use auth::{Session, SessionUser, SupabaseAuth};
pub use postgres::PgRecordStore;
pub use storage::{AccessTokenSource, SupabaseStorage};

/// A row as exchanged with the record store
pub type Record = Map<String, Value>;

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors raised by any collaborator
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Backend rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Structured-record store holding the `folders` and `videos` collections
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn query(&self, table: Table, filter: FilterData) -> RemoteResult<Vec<Record>>;

    async fn count(&self, table: Table, filter: FilterData) -> RemoteResult<i64>;

    /// Insert one record; the store assigns `id`
    async fn insert(&self, table: Table, record: Record) -> RemoteResult<()>;

    /// Overwrite exactly the supplied fields of the row with this id
    async fn update(&self, table: Table, id: Uuid, fields: Record) -> RemoteResult<()>;

    async fn delete(&self, table: Table, id: Uuid) -> RemoteResult<()>;
}

/// Blob store addressed by bucket and object path
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> RemoteResult<()>;

    /// Public URL of an object; resolving never touches the network
    fn public_url(&self, bucket: &str, path: &str) -> String;
}

/// Credential-based authentication service
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> RemoteResult<Session>;

    /// Revoke the session the access token belongs to
    async fn logout(&self, access_token: &str) -> RemoteResult<()>;

    /// Exchange the refresh token for a new session
    async fn refresh(&self, session: &Session) -> RemoteResult<Session>;

    /// Confirm the access token is still accepted and return its user
    async fn validate(&self, access_token: &str) -> RemoteResult<SessionUser>;
}
