//! In-memory backend implementing every collaborator trait.
//!
//! Used by unit tests and the router tests under `tests/`. Calls are recorded
//! so tests can assert that a workflow made (or skipped) a backend round-trip.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::filter::{Filter, FilterData};
use crate::remote::{
    AuthService, BlobStore, Record, RecordStore, RemoteError, RemoteResult, Session, SessionUser,
};
use crate::types::{Operation, Table};

const TOKEN_LIFETIME_MINUTES: i64 = 60;

#[derive(Debug, Clone)]
struct Account {
    password: String,
    user: SessionUser,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub bucket: String,
    pub path: String,
    pub content_type: String,
    pub size: usize,
}

#[derive(Default)]
pub struct MemoryBackend {
    tables: RwLock<HashMap<Table, Vec<Record>>>,
    objects: RwLock<Vec<StoredObject>>,
    calls: RwLock<Vec<(Operation, Table)>>,
    accounts: RwLock<HashMap<String, Account>>,
    access_tokens: RwLock<HashMap<String, SessionUser>>,
    refresh_tokens: RwLock<HashMap<String, SessionUser>>,
    fail_uploads: AtomicBool,
    fail_queries: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account that can sign in with these credentials
    pub fn with_user(mut self, email: &str, password: &str) -> Self {
        let account = Account {
            password: password.to_string(),
            user: SessionUser {
                id: Uuid::new_v4(),
                email: Some(email.to_string()),
            },
        };
        self.accounts.get_mut().insert(email.to_string(), account);
        self
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Insert a row directly, without recording a call; returns its id
    pub async fn seed(&self, table: Table, row: Value) -> Uuid {
        let mut record = match row {
            Value::Object(map) => map,
            _ => Record::new(),
        };
        let id = Self::fill_defaults(&mut record);
        self.tables.write().await.entry(table).or_default().push(record);
        id
    }

    pub async fn rows(&self, table: Table) -> Vec<Record> {
        self.tables.read().await.get(&table).cloned().unwrap_or_default()
    }

    pub async fn calls(&self) -> Vec<(Operation, Table)> {
        self.calls.read().await.clone()
    }

    pub async fn call_count(&self, table: Table, operation: Operation) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|(op, t)| *op == operation && *t == table)
            .count()
    }

    pub async fn objects(&self) -> Vec<StoredObject> {
        self.objects.read().await.clone()
    }

    pub async fn upload_count(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Sign in without going through a provider, for building restored sessions
    pub async fn login_now(&self, email: &str, password: &str) -> Session {
        match self.login(email, password).await {
            Ok(session) => session,
            Err(e) => panic!("login_now({}) failed: {}", email, e),
        }
    }

    /// Invalidate every issued access and refresh token
    pub async fn revoke_all(&self) {
        self.access_tokens.write().await.clear();
        self.refresh_tokens.write().await.clear();
    }

    fn fill_defaults(record: &mut Record) -> Uuid {
        let id = record
            .get("id")
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);
        record.insert("id".to_string(), json!(id));
        record.entry("created_at").or_insert_with(|| json!(Utc::now()));
        id
    }

    async fn record(&self, operation: Operation, table: Table) -> RemoteResult<()> {
        self.calls.write().await.push((operation, table));

        let failing = match operation {
            Operation::Select | Operation::Count => &self.fail_queries,
            Operation::Create | Operation::Update | Operation::Delete => &self.fail_writes,
        };
        if failing.load(Ordering::SeqCst) {
            return Err(RemoteError::Rejected {
                status: 503,
                message: format!("{:?} on {} unavailable", operation, table),
            });
        }
        Ok(())
    }

    async fn issue(&self, user: SessionUser) -> Session {
        let session = Session {
            access_token: format!("access-{}", Uuid::new_v4().simple()),
            refresh_token: format!("refresh-{}", Uuid::new_v4().simple()),
            expires_at: Utc::now() + Duration::minutes(TOKEN_LIFETIME_MINUTES),
            user: user.clone(),
        };
        self.access_tokens.write().await.insert(session.access_token.clone(), user.clone());
        self.refresh_tokens.write().await.insert(session.refresh_token.clone(), user);
        session
    }
}

fn filter_for(table: Table, data: FilterData) -> RemoteResult<Filter> {
    let mut filter = Filter::new(table.as_str())?;
    filter.assign(data)?;
    Ok(filter)
}

#[async_trait]
impl RecordStore for MemoryBackend {
    async fn query(&self, table: Table, filter: FilterData) -> RemoteResult<Vec<Record>> {
        self.record(Operation::Select, table).await?;
        let filter = filter_for(table, filter)?;
        let tables = self.tables.read().await;
        Ok(filter.apply(tables.get(&table).into_iter().flatten()))
    }

    async fn count(&self, table: Table, filter: FilterData) -> RemoteResult<i64> {
        self.record(Operation::Count, table).await?;
        let filter = filter_for(table, filter)?;
        let tables = self.tables.read().await;
        Ok(filter.count(tables.get(&table).into_iter().flatten()))
    }

    async fn insert(&self, table: Table, mut record: Record) -> RemoteResult<()> {
        self.record(Operation::Create, table).await?;
        Self::fill_defaults(&mut record);
        self.tables.write().await.entry(table).or_default().push(record);
        Ok(())
    }

    async fn update(&self, table: Table, id: Uuid, fields: Record) -> RemoteResult<()> {
        self.record(Operation::Update, table).await?;
        let id = json!(id);
        let mut tables = self.tables.write().await;
        if let Some(row) = tables
            .get_mut(&table)
            .and_then(|rows| rows.iter_mut().find(|r| r.get("id") == Some(&id)))
        {
            row.extend(fields);
        }
        Ok(())
    }

    async fn delete(&self, table: Table, id: Uuid) -> RemoteResult<()> {
        self.record(Operation::Delete, table).await?;
        let id = json!(id);
        if let Some(rows) = self.tables.write().await.get_mut(&table) {
            rows.retain(|r| r.get("id") != Some(&id));
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for MemoryBackend {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> RemoteResult<()> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(RemoteError::Rejected {
                status: 500,
                message: format!("upload to {}/{} failed", bucket, path),
            });
        }

        let mut objects = self.objects.write().await;
        if objects.iter().any(|o| o.bucket == bucket && o.path == path) {
            return Err(RemoteError::Rejected {
                status: 409,
                message: "The resource already exists".to_string(),
            });
        }
        objects.push(StoredObject {
            bucket: bucket.to_string(),
            path: path.to_string(),
            content_type: content_type.to_string(),
            size: bytes.len(),
        });
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("memory://{}/{}", bucket, path)
    }
}

#[async_trait]
impl AuthService for MemoryBackend {
    async fn login(&self, email: &str, password: &str) -> RemoteResult<Session> {
        let account = self.accounts.read().await.get(email).cloned();
        match account {
            Some(account) if account.password == password => Ok(self.issue(account.user).await),
            _ => Err(RemoteError::Unauthorized("Invalid login credentials".to_string())),
        }
    }

    async fn logout(&self, access_token: &str) -> RemoteResult<()> {
        let user = self.access_tokens.write().await.remove(access_token);
        if let Some(user) = user {
            self.refresh_tokens.write().await.retain(|_, owner| *owner != user);
        }
        Ok(())
    }

    async fn refresh(&self, session: &Session) -> RemoteResult<Session> {
        let user = self
            .refresh_tokens
            .write()
            .await
            .remove(&session.refresh_token)
            .ok_or_else(|| RemoteError::Unauthorized("Invalid Refresh Token".to_string()))?;
        self.access_tokens.write().await.remove(&session.access_token);
        Ok(self.issue(user).await)
    }

    async fn validate(&self, access_token: &str) -> RemoteResult<SessionUser> {
        self.access_tokens
            .read()
            .await
            .get(access_token)
            .cloned()
            .ok_or_else(|| RemoteError::Unauthorized("invalid JWT".to_string()))
    }
}
