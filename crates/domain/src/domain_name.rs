use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::DomainError;

pub const MIN_WALLET_ADDRESS_LEN: usize = 32;
pub const MAX_WALLET_ADDRESS_LEN: usize = 44;
pub const PUBKEY_BYTES: usize = 32;
pub const MAX_LABEL_LEN: usize = 63;
pub const MAX_DOMAIN_LEN: usize = 253;

/// Supported name-service suffixes. Each one is served by a different
/// on-chain registry and resolution protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainSuffix {
    Sol,
    Skr,
}

impl DomainSuffix {
    pub const ALL: [DomainSuffix; 2] = [DomainSuffix::Sol, DomainSuffix::Skr];

    pub fn as_str(&self) -> &'static str {
        match self {
            DomainSuffix::Sol => ".sol",
            DomainSuffix::Skr => ".skr",
        }
    }

    pub fn of(domain: &str) -> Option<Self> {
        let lower = domain.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|s| lower.ends_with(s.as_str()))
    }

    /// Domain without the suffix, e.g. `"toly"` for `"toly.sol"`.
    pub fn strip<'a>(&self, domain: &'a str) -> &'a str {
        let len = domain.len().saturating_sub(self.as_str().len());
        domain.get(..len).unwrap_or(domain)
    }

    pub fn append(&self, label: &str) -> String {
        format!("{}{}", label, self.as_str())
    }
}

impl fmt::Display for DomainSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    Wallet(String),
    Domain { name: String, suffix: DomainSuffix },
}

pub fn classify_input(input: &str) -> Result<InputKind, DomainError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidInput(
            "Please enter a wallet address or domain".to_string(),
        ));
    }

    if trimmed.contains('.') {
        let name = trimmed.to_ascii_lowercase();
        let suffix = DomainSuffix::of(&name).ok_or_else(|| {
            DomainError::UnsupportedSuffix(format!(
                "{} (supported: {})",
                trimmed,
                DomainSuffix::ALL.map(|s| s.as_str()).join(", ")
            ))
        })?;
        validate_domain(&name, suffix)?;
        return Ok(InputKind::Domain { name, suffix });
    }

    validate_wallet_address(trimmed)?;
    Ok(InputKind::Wallet(trimmed.to_string()))
}

pub fn is_base58_char(c: char) -> bool {
    matches!(c, '1'..='9' | 'A'..='H' | 'J'..='N' | 'P'..='Z' | 'a'..='k' | 'm'..='z')
}

/// Accepts base58 strings that decode to a 32-byte public key.
pub fn validate_wallet_address(address: &str) -> Result<(), DomainError> {
    let len = address.len();
    if !(MIN_WALLET_ADDRESS_LEN..=MAX_WALLET_ADDRESS_LEN).contains(&len) {
        return Err(DomainError::InvalidAddress(format!(
            "invalid length {} (expected {}-{} characters)",
            len, MIN_WALLET_ADDRESS_LEN, MAX_WALLET_ADDRESS_LEN
        )));
    }

    if let Some(bad) = address.chars().find(|c| !is_base58_char(*c)) {
        return Err(DomainError::InvalidAddress(format!(
            "invalid base58 character '{}'",
            bad
        )));
    }

    let bytes = bs58::decode(address)
        .into_vec()
        .map_err(|e| DomainError::InvalidAddress(e.to_string()))?;
    if bytes.len() != PUBKEY_BYTES {
        return Err(DomainError::InvalidAddress(format!(
            "decodes to {} bytes, expected {}",
            bytes.len(),
            PUBKEY_BYTES
        )));
    }

    Ok(())
}

pub fn is_valid_wallet_address(address: &str) -> bool {
    validate_wallet_address(address).is_ok()
}

/// Checks the label part of a domain (everything before the suffix).
/// Sub-domains (`sub.name.sol`) are accepted.
pub fn validate_domain(domain: &str, suffix: DomainSuffix) -> Result<(), DomainError> {
    if domain.len() > MAX_DOMAIN_LEN {
        return Err(DomainError::InvalidDomainName(format!(
            "{} exceeds {} characters",
            domain, MAX_DOMAIN_LEN
        )));
    }

    let label_part = suffix.strip(domain);
    if label_part.is_empty() {
        return Err(DomainError::InvalidDomainName(format!(
            "{} has an empty name",
            domain
        )));
    }

    for label in label_part.split('.') {
        if label.is_empty() || label.len() > MAX_LABEL_LEN {
            return Err(DomainError::InvalidDomainName(format!(
                "{} has an empty or oversized label",
                domain
            )));
        }
        let valid = label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(DomainError::InvalidDomainName(format!(
                "{} contains invalid characters (only alphanumeric, hyphens and underscores are allowed)",
                domain
            )));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(DomainError::InvalidDomainName(format!(
                "{} has a label starting or ending with a hyphen",
                domain
            )));
        }
    }

    Ok(())
}
