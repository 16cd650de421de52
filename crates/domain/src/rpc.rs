//! Typed JSON-RPC requests understood by the upstream transport.
//!
//! Only the request kinds the resolvers issue are modelled; each carries its
//! own parameter struct and decodes into the matching [`RpcResponse`] variant.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataSlice {
    pub offset: usize,
    pub length: usize,
}

impl DataSlice {
    pub fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AccountFilter {
    /// Match `bytes` (base58) at `offset` within the account data.
    Memcmp { offset: usize, bytes: String },
    DataSize(u64),
}

impl AccountFilter {
    pub fn memcmp_base58(offset: usize, bytes: impl Into<String>) -> Self {
        AccountFilter::Memcmp {
            offset,
            bytes: bytes.into(),
        }
    }

    pub fn memcmp_raw(offset: usize, raw: &[u8]) -> Self {
        AccountFilter::Memcmp {
            offset,
            bytes: bs58::encode(raw).into_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProgramAccountsParams {
    pub program_id: String,
    pub filters: Vec<AccountFilter>,
    pub data_slice: Option<DataSlice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountInfoParams {
    pub pubkey: String,
    pub data_slice: Option<DataSlice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RpcRequest {
    GetProgramAccounts(ProgramAccountsParams),
    GetAccountInfo(AccountInfoParams),
}

impl RpcRequest {
    pub fn method(&self) -> &'static str {
        match self {
            RpcRequest::GetProgramAccounts(_) => "getProgramAccounts",
            RpcRequest::GetAccountInfo(_) => "getAccountInfo",
        }
    }
}

impl fmt::Display for RpcRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcRequest::GetProgramAccounts(p) => {
                write!(f, "{}({}, {} filters)", self.method(), p.program_id, p.filters.len())
            }
            RpcRequest::GetAccountInfo(p) => write!(f, "{}({})", self.method(), p.pubkey),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedAccount {
    pub pubkey: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountData {
    pub owner: String,
    pub lamports: u64,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcResponse {
    ProgramAccounts(Vec<KeyedAccount>),
    AccountInfo(Option<AccountData>),
}
