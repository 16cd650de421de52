pub mod codec;
mod http;

pub use http::{build_http_client, HttpRpcTransport};
