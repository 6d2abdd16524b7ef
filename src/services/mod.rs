// src/services/mod.rs
pub mod session_store;
pub mod usage_tracking;

pub use session_store::SessionStore;
pub use usage_tracking::{PgUsageStore, UsageStore};
