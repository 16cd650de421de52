use serde::{Deserialize, Serialize};

use crate::domain_name::DomainSuffix;

pub const MIN_ADDRESS_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainKind {
    Sol,
    Skr,
    Other,
}

impl DomainKind {
    pub fn from_domain(domain: &str) -> Self {
        match DomainSuffix::of(domain) {
            Some(DomainSuffix::Sol) => DomainKind::Sol,
            Some(DomainSuffix::Skr) => DomainKind::Skr,
            None => DomainKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DomainKind::Sol => "sol",
            DomainKind::Skr => "skr",
            DomainKind::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RegistrySource {
    #[default]
    Manual,
    Verified,
    Community,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum RegistryPriority {
    High,
    #[default]
    Medium,
    Low,
}

impl RegistryPriority {
    /// Lower rank sorts first.
    pub fn rank(&self) -> u8 {
        match self {
            RegistryPriority::High => 0,
            RegistryPriority::Medium => 1,
            RegistryPriority::Low => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub address: String,
    pub domain: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: DomainKind,
    #[serde(default)]
    pub source: RegistrySource,
    #[serde(default)]
    pub priority: RegistryPriority,
}

fn default_kind() -> DomainKind {
    DomainKind::Other
}

impl RegistryEntry {
    pub fn new(
        address: impl Into<String>,
        domain: impl Into<String>,
        source: RegistrySource,
        priority: RegistryPriority,
    ) -> Self {
        let domain = domain.into();
        Self {
            address: address.into(),
            kind: DomainKind::from_domain(&domain),
            domain,
            source,
            priority,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let address = self.address.trim();
        if address.len() < MIN_ADDRESS_LEN {
            return Err(format!(
                "Address '{}' is too short ({} < {} characters)",
                address,
                address.len(),
                MIN_ADDRESS_LEN
            ));
        }
        let domain = self.domain.trim();
        if domain.is_empty() {
            return Err("Domain cannot be empty".to_string());
        }
        if !domain.contains('.') {
            return Err(format!("Domain '{}' has no suffix", domain));
        }
        Ok(())
    }
}
