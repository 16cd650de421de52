use ferrous_names_domain::config::DatabaseConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

const NAME_CACHE_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS name_cache (
    key         TEXT PRIMARY KEY NOT NULL,
    value       TEXT,
    timestamp   INTEGER NOT NULL,
    ttl         INTEGER NOT NULL,
    lookup_type TEXT NOT NULL,
    source      TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_name_cache_timestamp ON name_cache (timestamp);
";

pub async fn create_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect_with(options)
        .await?;

    sqlx::raw_sql(NAME_CACHE_SCHEMA).execute(&pool).await?;

    Ok(pool)
}

pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    let url = if config.path.starts_with("sqlite:") {
        config.path.clone()
    } else {
        format!("sqlite://{}", config.path)
    };
    let pool = create_pool(&url, config.max_connections).await?;
    info!(path = %config.path, "Name cache database ready");
    Ok(pool)
}
