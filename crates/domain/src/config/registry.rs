use crate::registry_entry::RegistryEntry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistryConfig {
    /// Load the built-in list of well-known entries at startup.
    #[serde(default = "default_true")]
    pub seed_builtin: bool,

    #[serde(default)]
    pub entries: Vec<RegistryEntry>,

    /// Optional JSON document (array of entries) fetched at startup.
    #[serde(default)]
    pub remote_url: Option<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            seed_builtin: true,
            entries: vec![],
            remote_url: None,
        }
    }
}

fn default_true() -> bool {
    true
}
