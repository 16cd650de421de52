use async_trait::async_trait;
use ferrous_names_application::ports::DurableStore;
use ferrous_names_domain::{CacheEntry, DomainError};

/// Stores nothing. Used when persistence is disabled or the database could
/// not be opened.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDurableStore;

#[async_trait]
impl DurableStore for NoopDurableStore {
    async fn get(&self, _key: &str) -> Result<Option<CacheEntry>, DomainError> {
        Ok(None)
    }

    async fn put(&self, _entry: &CacheEntry) -> Result<(), DomainError> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<(), DomainError> {
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<CacheEntry>, DomainError> {
        Ok(Vec::new())
    }

    async fn clear(&self) -> Result<(), DomainError> {
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }
}
