use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionKind {
    Wallet,
    Domain,
}

/// Outcome of a forward resolution. Failures are carried in `error` with
/// `is_valid == false`; resolution never returns `Err` to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainResolutionResult {
    pub address: String,
    pub domain: Option<String>,
    pub is_valid: bool,
    pub error: Option<String>,
    #[serde(rename = "type")]
    pub kind: ResolutionKind,
}

impl DomainResolutionResult {
    pub fn wallet(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            domain: None,
            is_valid: true,
            error: None,
            kind: ResolutionKind::Wallet,
        }
    }

    pub fn resolved(domain: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            domain: Some(domain.into()),
            is_valid: true,
            error: None,
            kind: ResolutionKind::Domain,
        }
    }

    pub fn invalid(kind: ResolutionKind, domain: Option<String>, error: impl Into<String>) -> Self {
        Self {
            address: String::new(),
            domain,
            is_valid: false,
            error: Some(error.into()),
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReverseSource {
    Registry,
    Cache,
    Api,
    /// No domain could be determined; display the raw (truncated) address.
    Truncated,
}

impl ReverseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReverseSource::Registry => "registry",
            ReverseSource::Cache => "cache",
            ReverseSource::Api => "api",
            ReverseSource::Truncated => "truncated",
        }
    }
}

/// Why a reverse lookup degraded to a truncated result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupFailure {
    RateLimited,
    Network,
    InvalidInput,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReverseDomainResult {
    pub address: String,
    pub domain: Option<String>,
    pub source: ReverseSource,
    pub is_loading: bool,
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<LookupFailure>,
}

impl ReverseDomainResult {
    pub fn found(
        address: impl Into<String>,
        domain: Option<String>,
        source: ReverseSource,
    ) -> Self {
        Self {
            address: address.into(),
            domain,
            source,
            is_loading: false,
            error: None,
            failure: None,
        }
    }

    pub fn truncated(
        address: impl Into<String>,
        failure: LookupFailure,
        error: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            domain: None,
            source: ReverseSource::Truncated,
            is_loading: false,
            error: Some(error.into()),
            failure: Some(failure),
        }
    }

    /// Short display form of the address, e.g. `86xC...2MMY`.
    pub fn display_name(&self) -> String {
        match &self.domain {
            Some(domain) => domain.clone(),
            None => truncate_address(&self.address),
        }
    }
}

pub fn truncate_address(address: &str) -> String {
    if address.len() <= 10 || !address.is_ascii() {
        return address.to_string();
    }
    format!("{}...{}", &address[..4], &address[address.len() - 4..])
}

/// Per-source partition of a batch. Every distinct address lands in exactly
/// one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub from_registry: usize,
    pub from_cache: usize,
    pub from_api: usize,
    pub errors: usize,
    pub rate_limited: usize,
}

impl BatchSummary {
    pub fn record(&mut self, result: &ReverseDomainResult) {
        self.total += 1;
        match (result.source, result.failure) {
            (ReverseSource::Registry, _) => self.from_registry += 1,
            (ReverseSource::Cache, _) => self.from_cache += 1,
            (ReverseSource::Api, _) => self.from_api += 1,
            (ReverseSource::Truncated, Some(LookupFailure::RateLimited)) => self.rate_limited += 1,
            (ReverseSource::Truncated, _) => self.errors += 1,
        }
    }

    pub fn accounted(&self) -> usize {
        self.from_registry + self.from_cache + self.from_api + self.errors + self.rate_limited
    }
}

#[derive(Debug, Clone, Default)]
pub struct BatchLookup {
    pub results: HashMap<String, ReverseDomainResult>,
    pub summary: BatchSummary,
}
