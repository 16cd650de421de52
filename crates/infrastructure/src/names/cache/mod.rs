mod clock;
mod maintenance;
mod metrics;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use maintenance::NameCacheMaintenance;
pub use metrics::CacheStats;
pub use store::DomainCache;
