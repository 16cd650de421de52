use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Durable cache backing file. When disabled the cache runs memory-only.
    #[serde(default = "default_db_path")]
    pub path: String,

    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            enabled: true,
            max_connections: default_max_connections(),
        }
    }
}

fn default_db_path() -> String {
    "ferrous-names.db".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_connections() -> u32 {
    4
}
