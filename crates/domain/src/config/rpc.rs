use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RpcConfig {
    #[serde(default = "default_rpc_url")]
    pub url: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// SPL Name Service program that owns `.sol` registry accounts.
    #[serde(default = "default_sns_program_id")]
    pub sns_program_id: String,

    /// AllDomains name service program that owns `.skr` registry accounts.
    #[serde(default = "default_ans_program_id")]
    pub ans_program_id: String,
}

impl RpcConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: default_rpc_url(),
            timeout_ms: default_timeout_ms(),
            sns_program_id: default_sns_program_id(),
            ans_program_id: default_ans_program_id(),
        }
    }
}

fn default_rpc_url() -> String {
    "https://api.mainnet-beta.solana.com".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_sns_program_id() -> String {
    "namesLPneVptA9Z5rqUDD9tMTWEJwofgaYwp8cawRkX".to_string()
}

fn default_ans_program_id() -> String {
    "ALTNSZ46uaAUU7XUV6awvdorLGqAsPwa9shm7h4uP2FK".to_string()
}
