use async_trait::async_trait;
use ferrous_names_domain::{CacheEntry, DomainError};

/// Durable key-value backing for the persistent name cache.
///
/// Implementations report failures as `DomainError::StorageUnavailable`; the
/// cache logs them and keeps serving from memory.
#[async_trait]
pub trait DurableStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, DomainError>;

    async fn put(&self, entry: &CacheEntry) -> Result<(), DomainError>;

    async fn delete(&self, key: &str) -> Result<(), DomainError>;

    async fn get_all(&self) -> Result<Vec<CacheEntry>, DomainError>;

    async fn clear(&self) -> Result<(), DomainError> {
        for entry in self.get_all().await? {
            self.delete(&entry.key).await?;
        }
        Ok(())
    }

    /// `false` for stores that never retain anything.
    fn is_durable(&self) -> bool {
        true
    }
}
