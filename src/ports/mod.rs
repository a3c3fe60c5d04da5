//! Ports - interfaces for the excluded external collaborators.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the core and the outside world. Adapters implement these ports.
//!
//! - `StateStore` - durable key-value store with TTL and prefix listing
//! - `Notifier` - notification channel, invite credentials, membership

mod notifier;
mod state_store;

pub use notifier::{MembershipState, Notifier, NotifyError};
pub use state_store::{StateStore, StoreError};
