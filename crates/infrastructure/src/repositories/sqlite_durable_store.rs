use async_trait::async_trait;
use ferrous_names_application::ports::DurableStore;
use ferrous_names_domain::{CacheEntry, DomainError};
use sqlx::SqlitePool;
use tracing::{error, instrument};

type NameCacheRow = (String, Option<String>, i64, i64, String, String);

/// `name_cache` table backed store.
pub struct SqliteDurableStore {
    pool: SqlitePool,
}

impl SqliteDurableStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_entry(row: NameCacheRow) -> Result<CacheEntry, DomainError> {
        let (key, value, timestamp, ttl, lookup_type, source) = row;
        Ok(CacheEntry {
            key,
            value,
            timestamp,
            ttl: ttl.max(0) as u64,
            lookup_type: lookup_type.parse().map_err(DomainError::StorageUnavailable)?,
            source: source.parse().map_err(DomainError::StorageUnavailable)?,
        })
    }
}

fn storage_error(operation: &str, e: sqlx::Error) -> DomainError {
    error!(operation, error = %e, "Name cache query failed");
    DomainError::StorageUnavailable(e.to_string())
}

#[async_trait]
impl DurableStore for SqliteDurableStore {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, DomainError> {
        let row = sqlx::query_as::<_, NameCacheRow>(
            "SELECT key, value, timestamp, ttl, lookup_type, source FROM name_cache WHERE key = ?",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("get", e))?;

        row.map(Self::row_to_entry).transpose()
    }

    #[instrument(skip(self, entry), fields(key = %entry.key))]
    async fn put(&self, entry: &CacheEntry) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO name_cache (key, value, timestamp, ttl, lookup_type, source)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                timestamp = excluded.timestamp,
                ttl = excluded.ttl,
                lookup_type = excluded.lookup_type,
                source = excluded.source",
        )
        .bind(&entry.key)
        .bind(&entry.value)
        .bind(entry.timestamp)
        .bind(entry.ttl.min(i64::MAX as u64) as i64)
        .bind(entry.lookup_type.as_str())
        .bind(entry.source.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("put", e))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM name_cache WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("delete", e))?;
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<CacheEntry>, DomainError> {
        let rows = sqlx::query_as::<_, NameCacheRow>(
            "SELECT key, value, timestamp, ttl, lookup_type, source FROM name_cache ORDER BY timestamp",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("get_all", e))?;

        rows.into_iter().map(Self::row_to_entry).collect()
    }

    async fn clear(&self) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM name_cache")
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("clear", e))?;
        Ok(())
    }
}
