//! Ferrous Names Domain Layer
pub mod cache_entry;
pub mod config;
pub mod domain_name;
pub mod errors;
pub mod priority;
pub mod registry_entry;
pub mod resolution;
pub mod rpc;

pub use cache_entry::{CacheEntry, CacheLookup, CacheSource, LookupType};
pub use config::{CliOverrides, Config};
pub use domain_name::{
    classify_input, is_valid_wallet_address, validate_wallet_address, DomainSuffix, InputKind,
};
pub use errors::DomainError;
pub use priority::RequestPriority;
pub use registry_entry::{DomainKind, RegistryEntry, RegistryPriority, RegistrySource};
pub use resolution::{
    truncate_address, BatchLookup, BatchSummary, DomainResolutionResult, LookupFailure,
    ResolutionKind, ReverseDomainResult, ReverseSource,
};
pub use rpc::{
    AccountData, AccountFilter, AccountInfoParams, DataSlice, KeyedAccount, ProgramAccountsParams,
    RpcRequest, RpcResponse,
};
