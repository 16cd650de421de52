mod local;
mod seed;

pub use local::{ImportReport, LocalRegistry, RegistryStats};
pub use seed::builtin_entries;
