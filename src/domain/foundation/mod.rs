//! Foundation - shared value objects and building blocks for the domain.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::ValidationError;
pub use ids::{AdminId, ChannelId, SubscriberId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
