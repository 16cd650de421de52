pub mod noop_durable_store;
pub mod sqlite_durable_store;

pub use noop_durable_store::NoopDurableStore;
pub use sqlite_durable_store::SqliteDurableStore;
