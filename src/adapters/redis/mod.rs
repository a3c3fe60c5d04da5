//! Redis-backed adapters for production deployments.

mod state_store;

pub use state_store::RedisStateStore;
