use super::seed::builtin_entries;
use ferrous_names_domain::config::RegistryConfig;
use ferrous_names_domain::domain_name::validate_domain;
use ferrous_names_domain::{
    DomainError, DomainKind, DomainSuffix, RegistryEntry, RegistryPriority, RegistrySource,
};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub total: usize,
    pub sol: usize,
    pub skr: usize,
    pub other: usize,
    pub verified: usize,
    pub community: usize,
    pub manual: usize,
    pub high_priority: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub added: usize,
    pub rejected: usize,
}

#[derive(Default)]
struct RegistryMaps {
    by_address: FxHashMap<String, RegistryEntry>,
    by_domain: FxHashMap<String, String>,
    stats: RegistryStats,
}

impl RegistryMaps {
    fn insert(&mut self, entry: RegistryEntry) {
        let address_key = entry.address.to_lowercase();
        let domain_key = entry.domain.to_lowercase();

        if let Some(previous) = self.by_address.remove(&address_key) {
            self.by_domain.remove(&previous.domain.to_lowercase());
        }
        // A domain maps to one address; drop the old owner's entry.
        if let Some(previous_owner) = self.by_domain.remove(&domain_key) {
            self.by_address.remove(&previous_owner);
        }

        self.by_domain.insert(domain_key, address_key.clone());
        self.by_address.insert(address_key, entry);
    }

    fn remove(&mut self, address: &str) -> Option<RegistryEntry> {
        let entry = self.by_address.remove(&address.to_lowercase())?;
        self.by_domain.remove(&entry.domain.to_lowercase());
        Some(entry)
    }

    fn recompute_stats(&mut self) {
        let mut stats = RegistryStats {
            total: self.by_address.len(),
            ..Default::default()
        };
        for entry in self.by_address.values() {
            match entry.kind {
                DomainKind::Sol => stats.sol += 1,
                DomainKind::Skr => stats.skr += 1,
                DomainKind::Other => stats.other += 1,
            }
            match entry.source {
                RegistrySource::Verified => stats.verified += 1,
                RegistrySource::Community => stats.community += 1,
                RegistrySource::Manual => stats.manual += 1,
            }
            if entry.priority == RegistryPriority::High {
                stats.high_priority += 1;
            }
        }
        self.stats = stats;
    }
}

/// In-memory address/domain registry. Lookups are case-insensitive and
/// never touch the network; entries never expire.
#[derive(Default)]
pub struct LocalRegistry {
    maps: RwLock<RegistryMaps>,
}

impl LocalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in entries (unless disabled) followed by configured ones.
    /// Invalid configured entries are skipped with a warning.
    pub fn from_config(config: &RegistryConfig) -> Self {
        let registry = Self::new();
        if config.seed_builtin {
            registry.import_entries(builtin_entries());
        }
        let report = registry.import_entries(config.entries.clone());
        info!(
            entries = registry.len(),
            rejected = report.rejected,
            "Local registry seeded"
        );
        registry
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryMaps> {
        self.maps.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryMaps> {
        self.maps.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_domain(&self, address: &str) -> Option<String> {
        self.read()
            .by_address
            .get(&address.trim().to_lowercase())
            .map(|e| e.domain.clone())
    }

    pub fn get_address(&self, domain: &str) -> Option<String> {
        let maps = self.read();
        let address_key = maps.by_domain.get(&domain.trim().to_lowercase())?;
        maps.by_address.get(address_key).map(|e| e.address.clone())
    }

    pub fn get_entry(&self, address: &str) -> Option<RegistryEntry> {
        self.read()
            .by_address
            .get(&address.trim().to_lowercase())
            .cloned()
    }

    pub fn add_entry(&self, entry: RegistryEntry) -> Result<(), DomainError> {
        let entry = normalize(entry)?;
        let mut maps = self.write();
        maps.insert(entry);
        maps.recompute_stats();
        Ok(())
    }

    pub fn remove_entry(&self, address: &str) -> bool {
        let mut maps = self.write();
        let removed = maps.remove(address.trim()).is_some();
        if removed {
            maps.recompute_stats();
        }
        removed
    }

    /// Substring match over domains and addresses, best first: priority,
    /// then exact match, then prefix match, then shorter domain.
    pub fn search_domains(&self, query: &str, limit: usize) -> Vec<RegistryEntry> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() || limit == 0 {
            return Vec::new();
        }

        let maps = self.read();
        let mut matches: Vec<(u8, u8, &RegistryEntry)> = maps
            .by_address
            .iter()
            .filter_map(|(address_key, entry)| {
                let domain = entry.domain.to_lowercase();
                let closeness = if domain == needle || *address_key == needle {
                    0
                } else if domain.starts_with(&needle) || address_key.starts_with(&needle) {
                    1
                } else if domain.contains(&needle) || address_key.contains(&needle) {
                    2
                } else {
                    return None;
                };
                Some((entry.priority.rank(), closeness, entry))
            })
            .collect();

        matches.sort_by(|a, b| {
            (a.0, a.1, a.2.domain.len(), &a.2.domain)
                .cmp(&(b.0, b.1, b.2.domain.len(), &b.2.domain))
        });
        matches
            .into_iter()
            .take(limit)
            .map(|(_, _, entry)| entry.clone())
            .collect()
    }

    pub fn import_entries(&self, entries: Vec<RegistryEntry>) -> ImportReport {
        let mut report = ImportReport::default();
        let mut accepted = Vec::with_capacity(entries.len());
        for entry in entries {
            match normalize(entry) {
                Ok(entry) => accepted.push(entry),
                Err(e) => {
                    warn!(error = %e, "Skipping invalid registry entry");
                    report.rejected += 1;
                }
            }
        }

        report.added = accepted.len();
        let mut maps = self.write();
        for entry in accepted {
            maps.insert(entry);
        }
        maps.recompute_stats();
        report
    }

    pub fn export_entries(&self) -> Vec<RegistryEntry> {
        let mut entries: Vec<RegistryEntry> = self.read().by_address.values().cloned().collect();
        entries.sort_by(|a, b| a.domain.cmp(&b.domain));
        entries
    }

    /// Fetches a JSON array of entries and imports the valid ones.
    pub async fn load_remote(
        &self,
        client: &reqwest::Client,
        url: &str,
    ) -> Result<ImportReport, DomainError> {
        let response = client.get(url).send().await.map_err(|e| {
            DomainError::from_upstream(
                e.status().map(|s| s.as_u16()),
                format!("registry fetch from {} failed: {}", url, e),
            )
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::from_upstream(
                Some(status.as_u16()),
                format!("registry source {} returned HTTP {}", url, status.as_u16()),
            ));
        }

        let entries: Vec<RegistryEntry> = response
            .json()
            .await
            .map_err(|e| DomainError::Registry(format!("invalid registry document: {}", e)))?;

        let report = self.import_entries(entries);
        info!(
            url = %url,
            added = report.added,
            rejected = report.rejected,
            "Remote registry loaded"
        );
        Ok(report)
    }

    pub fn clear(&self) {
        let mut maps = self.write();
        maps.by_address.clear();
        maps.by_domain.clear();
        maps.recompute_stats();
    }

    pub fn stats(&self) -> RegistryStats {
        self.read().stats.clone()
    }

    pub fn len(&self) -> usize {
        self.read().by_address.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn normalize(mut entry: RegistryEntry) -> Result<RegistryEntry, DomainError> {
    entry.address = entry.address.trim().to_string();
    entry.domain = entry.domain.trim().to_lowercase();
    entry.validate().map_err(DomainError::Registry)?;
    if let Some(suffix) = DomainSuffix::of(&entry.domain) {
        validate_domain(&entry.domain, suffix)?;
    }
    entry.kind = DomainKind::from_domain(&entry.domain);
    Ok(entry)
}
