use serde::{Deserialize, Serialize};
use std::fmt;

/// Scheduling tier of a network request. `High` is dequeued before
/// `Normal`, which is dequeued before `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RequestPriority {
    High,
    #[default]
    Normal,
    Low,
}

impl RequestPriority {
    /// Larger weight is served first.
    pub fn weight(&self) -> u8 {
        match self {
            RequestPriority::High => 2,
            RequestPriority::Normal => 1,
            RequestPriority::Low => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestPriority::High => "high",
            RequestPriority::Normal => "normal",
            RequestPriority::Low => "low",
        }
    }
}

impl fmt::Display for RequestPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
