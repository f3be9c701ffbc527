use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool, Row};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::filter::{Filter, FilterData};
use crate::filter::filter_where::validate_column;
use crate::types::Table;

use super::{Record, RecordStore, RemoteError, RemoteResult};

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS "folders" (
    "id" uuid PRIMARY KEY DEFAULT gen_random_uuid(),
    "name" text NOT NULL,
    "logo_url" text,
    "order" integer NOT NULL DEFAULT 0,
    "created_at" timestamptz NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS "videos" (
    "id" uuid PRIMARY KEY DEFAULT gen_random_uuid(),
    "folder_id" uuid NOT NULL,
    "title" text NOT NULL,
    "video_url" text NOT NULL,
    "thumbnail_url" text DEFAULT '',
    "order" integer NOT NULL DEFAULT 0,
    "created_at" timestamptz NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS "videos_folder_id_idx" ON "videos" ("folder_id");
"#;

/// Record store backed by the managed backend's Postgres database
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &DatabaseConfig) -> RemoteResult<Self> {
        let url = config
            .url
            .as_deref()
            .ok_or(RemoteError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Connected record store pool (max {} connections)", config.max_connections);
        Ok(Self::new(pool))
    }

    /// Create the `folders` and `videos` tables when missing
    pub async fn apply_schema(&self) -> RemoteResult<()> {
        for statement in SCHEMA_SQL.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Record store schema applied");
        Ok(())
    }

    pub async fn health_check(&self) -> RemoteResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn columns(record: &Record) -> RemoteResult<Vec<&str>> {
        let mut columns = Vec::with_capacity(record.len());
        for column in record.keys() {
            validate_column(column)?;
            columns.push(column.as_str());
        }
        Ok(columns)
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn query(&self, table: Table, filter_data: FilterData) -> RemoteResult<Vec<Record>> {
        let mut filter = Filter::new(table.as_str())?;
        filter.assign(filter_data)?;
        let sql = filter.to_sql()?;
        debug!("select {}: {}", table, sql.query);

        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = q.bind(Json(p));
        }
        let rows = q.fetch_all(&self.pool).await?;

        rows.into_iter()
            .map(|row| -> RemoteResult<Record> {
                let value: Value = row.try_get("row")?;
                match value {
                    Value::Object(map) => Ok(map),
                    other => Err(RemoteError::InvalidResponse(format!(
                        "expected object row from {}, got {}",
                        table, other
                    ))),
                }
            })
            .collect()
    }

    async fn count(&self, table: Table, filter_data: FilterData) -> RemoteResult<i64> {
        let mut filter = Filter::new(table.as_str())?;
        filter.assign(filter_data)?;
        let sql = filter.to_count_sql()?;
        debug!("count {}: {}", table, sql.query);

        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = q.bind(Json(p));
        }
        let row = q.fetch_one(&self.pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }

    async fn insert(&self, table: Table, record: Record) -> RemoteResult<()> {
        let columns = Self::columns(&record)?;
        if columns.is_empty() {
            return Err(RemoteError::Rejected { status: 400, message: "empty insert".to_string() });
        }

        // jsonb_populate_record casts each field to its column type; unnamed columns keep their defaults
        let target = columns.iter().map(|c| format!("\"{}\"", c)).collect::<Vec<_>>().join(", ");
        let source = columns.iter().map(|c| format!("r.\"{}\"", c)).collect::<Vec<_>>().join(", ");
        let query = format!(
            "INSERT INTO \"{table}\" ({target}) SELECT {source} FROM jsonb_populate_record(NULL::\"{table}\", $1) AS r",
        );
        debug!("insert {}: {}", table, query);

        sqlx::query(&query)
            .bind(Json(Value::Object(record)))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update(&self, table: Table, id: Uuid, fields: Record) -> RemoteResult<()> {
        let columns = Self::columns(&fields)?;
        if columns.is_empty() {
            return Ok(());
        }

        let assignments = columns
            .iter()
            .map(|c| format!("\"{c}\" = r.\"{c}\""))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!(
            "UPDATE \"{table}\" SET {assignments} FROM jsonb_populate_record(NULL::\"{table}\", $1) AS r WHERE \"{table}\".\"id\" = $2",
        );
        debug!("update {} {}: {}", table, id, query);

        let result = sqlx::query(&query)
            .bind(Json(Value::Object(fields)))
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            debug!("update {} {} matched no rows", table, id);
        }
        Ok(())
    }

    async fn delete(&self, table: Table, id: Uuid) -> RemoteResult<()> {
        let query = format!("DELETE FROM \"{}\" WHERE \"id\" = $1", table);
        let result = sqlx::query(&query).bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            debug!("delete {} {} matched no rows", table, id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn schema_splits_into_three_statements() {
        let statements: Vec<_> = SCHEMA_SQL.split(';').map(str::trim).filter(|s| !s.is_empty()).collect();
        assert_eq!(statements.len(), 3);
        // videos outlive a deleted folder; no foreign key
        assert!(!statements[1].contains("REFERENCES"));
        assert!(statements[2].contains("\"folder_id\""));
    }

    #[test]
    fn columns_rejects_unsafe_keys() {
        let record = json!({ "name": "ok", "bad col": 1 });
        assert!(PgRecordStore::columns(record.as_object().unwrap()).is_err());
    }
}
