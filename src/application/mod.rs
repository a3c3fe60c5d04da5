//! Application layer - use-case handlers and the event dispatcher.

pub mod dispatcher;
mod error;
pub mod handlers;
mod reply;
mod stores;

pub use dispatcher::{Command, Dispatcher, EventPayload, InboundEvent};
pub use error::GateError;
pub use reply::{Button, ButtonAction, Reply};
pub use stores::{RegistryStore, SessionStore, SubscriberStore};
