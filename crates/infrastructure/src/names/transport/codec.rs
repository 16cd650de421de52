//! JSON-RPC 2.0 framing for the typed [`RpcRequest`] union.
//!
//! Account data is always requested as base64 and decoded here, so callers
//! only ever see raw bytes.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ferrous_names_domain::errors::is_rate_limit_message;
use ferrous_names_domain::{
    AccountData, AccountFilter, DataSlice, DomainError, KeyedAccount, RpcRequest, RpcResponse,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

const JSONRPC_VERSION: &str = "2.0";
const HTTP_TOO_MANY_REQUESTS: i64 = 429;

pub fn encode_request(id: u64, request: &RpcRequest) -> Value {
    let params = match request {
        RpcRequest::GetProgramAccounts(p) => {
            let mut options = base_options(p.data_slice);
            if !p.filters.is_empty() {
                let filters: Vec<Value> = p.filters.iter().map(encode_filter).collect();
                options.insert("filters".into(), Value::Array(filters));
            }
            json!([p.program_id, options])
        }
        RpcRequest::GetAccountInfo(p) => json!([p.pubkey, base_options(p.data_slice)]),
    };

    json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": id,
        "method": request.method(),
        "params": params,
    })
}

fn base_options(data_slice: Option<DataSlice>) -> Map<String, Value> {
    let mut options = Map::new();
    options.insert("encoding".into(), Value::from("base64"));
    if let Some(slice) = data_slice {
        options.insert(
            "dataSlice".into(),
            json!({ "offset": slice.offset, "length": slice.length }),
        );
    }
    options
}

fn encode_filter(filter: &AccountFilter) -> Value {
    match filter {
        AccountFilter::Memcmp { offset, bytes } => {
            json!({ "memcmp": { "offset": offset, "bytes": bytes } })
        }
        AccountFilter::DataSize(size) => json!({ "dataSize": size }),
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct WireAccount {
    data: (String, String),
    #[serde(default)]
    owner: String,
    #[serde(default)]
    lamports: u64,
}

#[derive(Debug, Deserialize)]
struct WireKeyedAccount {
    pubkey: String,
    account: WireAccount,
}

#[derive(Debug, Deserialize)]
struct WireAccountInfo {
    value: Option<WireAccount>,
}

/// Decodes a response body into the variant matching `request`.
pub fn decode_response(request: &RpcRequest, body: Value) -> Result<RpcResponse, DomainError> {
    let envelope: Envelope =
        serde_json::from_value(body).map_err(|e| DomainError::Decode(e.to_string()))?;

    if let Some(error) = envelope.error {
        return Err(rpc_error(error.code, error.message));
    }
    let result = envelope
        .result
        .ok_or_else(|| DomainError::Decode("response has neither result nor error".into()))?;

    match request {
        RpcRequest::GetProgramAccounts(_) => {
            let entries: Vec<Value> =
                serde_json::from_value(result).map_err(|e| DomainError::Decode(e.to_string()))?;
            let decoded = entries.into_iter().filter_map(decode_keyed_account).collect();
            Ok(RpcResponse::ProgramAccounts(decoded))
        }
        RpcRequest::GetAccountInfo(_) => {
            let info: WireAccountInfo =
                serde_json::from_value(result).map_err(|e| DomainError::Decode(e.to_string()))?;
            let account = info
                .value
                .map(|a| {
                    Ok::<_, DomainError>(AccountData {
                        data: decode_data(&a.data)?,
                        owner: a.owner,
                        lamports: a.lamports,
                    })
                })
                .transpose()?;
            Ok(RpcResponse::AccountInfo(account))
        }
    }
}

/// Returns `None` for an entry that fails to parse or decode.
fn decode_keyed_account(entry: Value) -> Option<KeyedAccount> {
    let account: WireKeyedAccount = match serde_json::from_value(entry) {
        Ok(account) => account,
        Err(e) => {
            debug!(error = %e, "Skipping unparseable program account");
            return None;
        }
    };
    match decode_data(&account.account.data) {
        Ok(data) => Some(KeyedAccount {
            pubkey: account.pubkey,
            data,
        }),
        Err(e) => {
            debug!(pubkey = %account.pubkey, error = %e, "Skipping undecodable program account");
            None
        }
    }
}

fn decode_data((payload, encoding): &(String, String)) -> Result<Vec<u8>, DomainError> {
    if encoding != "base64" {
        return Err(DomainError::Decode(format!(
            "unexpected account encoding '{}'",
            encoding
        )));
    }
    STANDARD
        .decode(payload)
        .map_err(|e| DomainError::Decode(format!("invalid base64 account data: {}", e)))
}

pub fn rpc_error(code: i64, message: String) -> DomainError {
    if code == HTTP_TOO_MANY_REQUESTS || is_rate_limit_message(&message) {
        DomainError::RateLimited(message)
    } else {
        DomainError::Rpc { code, message }
    }
}
