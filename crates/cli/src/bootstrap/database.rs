use ferrous_names_application::ports::DurableStore;
use ferrous_names_domain::config::DatabaseConfig;
use ferrous_names_infrastructure::database::connect;
use ferrous_names_infrastructure::repositories::{NoopDurableStore, SqliteDurableStore};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{info, warn};

/// Opens the durable cache store. An unusable database degrades to a
/// memory-only cache instead of aborting startup.
pub async fn init_store(cfg: &DatabaseConfig) -> (Arc<dyn DurableStore>, Option<SqlitePool>) {
    if !cfg.enabled {
        info!("Durable cache disabled, running memory-only");
        return (Arc::new(NoopDurableStore), None);
    }

    match connect(cfg).await {
        Ok(pool) => (Arc::new(SqliteDurableStore::new(pool.clone())), Some(pool)),
        Err(e) => {
            warn!(
                path = %cfg.path,
                error = %e,
                "Failed to open name cache database, running memory-only"
            );
            (Arc::new(NoopDurableStore), None)
        }
    }
}
