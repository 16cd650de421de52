//! Byte layout of on-chain name records.
//!
//! Both registries store a fixed header followed by the name as a
//! little-endian `u32` length prefix and UTF-8 bytes. Scans request only the
//! byte range they decode.

use ferrous_names_domain::domain_name::PUBKEY_BYTES;
use ferrous_names_domain::{
    AccountFilter, DataSlice, DomainSuffix, KeyedAccount, ProgramAccountsParams, RpcRequest,
};

const LENGTH_PREFIX: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryLayout {
    pub program_id: String,
    pub owner_offset: usize,
    pub name_offset: usize,
    pub max_name_len: usize,
}

impl RegistryLayout {
    /// Name service header: parent (32) | owner (32) | class (32).
    pub fn sns(program_id: impl Into<String>) -> Self {
        Self {
            program_id: program_id.into(),
            owner_offset: 32,
            name_offset: 96,
            max_name_len: 64,
        }
    }

    /// Discriminator (8) | parent (32) | owner (32) | class (32) | expiry (8).
    pub fn ans(program_id: impl Into<String>) -> Self {
        Self {
            program_id: program_id.into(),
            owner_offset: 40,
            name_offset: 112,
            max_name_len: 64,
        }
    }

    pub fn name_slice(&self) -> DataSlice {
        DataSlice::new(self.name_offset, LENGTH_PREFIX + self.max_name_len)
    }

    pub fn owner_slice(&self) -> DataSlice {
        DataSlice::new(self.owner_offset, PUBKEY_BYTES)
    }

    /// Every record owned by `owner`, sliced to the name range.
    pub fn owner_scan(&self, owner: &str) -> RpcRequest {
        RpcRequest::GetProgramAccounts(ProgramAccountsParams {
            program_id: self.program_id.clone(),
            filters: vec![AccountFilter::memcmp_base58(self.owner_offset, owner)],
            data_slice: Some(self.name_slice()),
        })
    }

    /// The record whose stored name equals `label`, sliced to the owner.
    pub fn name_scan(&self, label: &str) -> RpcRequest {
        RpcRequest::GetProgramAccounts(ProgramAccountsParams {
            program_id: self.program_id.clone(),
            filters: vec![AccountFilter::memcmp_raw(
                self.name_offset,
                &encode_name(label),
            )],
            data_slice: Some(self.owner_slice()),
        })
    }
}

pub fn encode_name(label: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(LENGTH_PREFIX + label.len());
    bytes.extend_from_slice(&(label.len() as u32).to_le_bytes());
    bytes.extend_from_slice(label.as_bytes());
    bytes
}

/// Decodes a length-prefixed name. `None` for truncated, empty, non-UTF-8
/// or control-character payloads.
pub fn decode_name(data: &[u8]) -> Option<String> {
    let prefix: [u8; LENGTH_PREFIX] = data.get(..LENGTH_PREFIX)?.try_into().ok()?;
    let len = u32::from_le_bytes(prefix) as usize;
    if len == 0 {
        return None;
    }
    let raw = data.get(LENGTH_PREFIX..LENGTH_PREFIX.checked_add(len)?)?;
    let name = std::str::from_utf8(raw).ok()?;
    if name.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return None;
    }
    Some(name.to_ascii_lowercase())
}

pub fn decode_owner(data: &[u8]) -> Option<String> {
    let key = data.get(..PUBKEY_BYTES)?;
    if key.iter().all(|b| *b == 0) {
        return None;
    }
    Some(bs58::encode(key).into_string())
}

/// Fully qualified names from an owner scan; malformed records are skipped.
pub fn collect_domains(accounts: &[KeyedAccount], suffix: DomainSuffix) -> Vec<String> {
    let mut domains: Vec<String> = accounts
        .iter()
        .filter_map(|account| decode_name(&account.data))
        .map(|name| {
            if DomainSuffix::of(&name) == Some(suffix) {
                name
            } else {
                suffix.append(&name)
            }
        })
        .collect();
    domains.sort();
    domains.dedup();
    domains
}
