use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Namespace of a cached lookup. Forward and reverse entries for the same
/// literal string never share a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupType {
    Forward,
    Reverse,
}

impl LookupType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupType::Forward => "forward",
            LookupType::Reverse => "reverse",
        }
    }
}

impl fmt::Display for LookupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LookupType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forward" => Ok(LookupType::Forward),
            "reverse" => Ok(LookupType::Reverse),
            _ => Err(format!("Invalid lookup type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheSource {
    Api,
    Registry,
    Manual,
}

impl CacheSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheSource::Api => "api",
            CacheSource::Registry => "registry",
            CacheSource::Manual => "manual",
        }
    }
}

impl FromStr for CacheSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "api" => Ok(CacheSource::Api),
            "registry" => Ok(CacheSource::Registry),
            "manual" => Ok(CacheSource::Manual),
            _ => Err(format!("Invalid cache source: {}", s)),
        }
    }
}

/// One persisted lookup result. `value: None` is a confirmed absence
/// ("this address has no domain"), which is a legitimate cached outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub value: Option<String>,
    /// Insertion time, milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Time to live in milliseconds.
    pub ttl: u64,
    pub lookup_type: LookupType,
    pub source: CacheSource,
}

impl CacheEntry {
    pub fn new(
        raw_key: &str,
        value: Option<String>,
        lookup_type: LookupType,
        source: CacheSource,
        timestamp: i64,
        ttl: u64,
    ) -> Self {
        Self {
            key: Self::namespaced_key(raw_key, lookup_type),
            value,
            timestamp,
            ttl,
            lookup_type,
            source,
        }
    }

    /// `"<type>:<lowercased-raw-key>"`
    pub fn namespaced_key(raw_key: &str, lookup_type: LookupType) -> String {
        format!("{}:{}", lookup_type.as_str(), raw_key.trim().to_lowercase())
    }

    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms.saturating_sub(self.timestamp) > self.ttl as i64
    }

    pub fn expires_at(&self) -> i64 {
        self.timestamp.saturating_add(self.ttl as i64)
    }
}

/// Result of a cache read: a stored value (possibly a cached "no domain"),
/// or nothing cached at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    Hit(Option<String>),
    Miss,
}

impl CacheLookup {
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheLookup::Hit(_))
    }

    pub fn is_miss(&self) -> bool {
        matches!(self, CacheLookup::Miss)
    }

    /// The cached value, or `None` for both a miss and a cached absence.
    pub fn value(&self) -> Option<&str> {
        match self {
            CacheLookup::Hit(Some(v)) => Some(v.as_str()),
            _ => None,
        }
    }
}
