//! In-memory adapters for testing and single-process development.

mod notifier;
mod state_store;

pub use notifier::{RecordingNotifier, SentMessage};
pub use state_store::InMemoryStateStore;
