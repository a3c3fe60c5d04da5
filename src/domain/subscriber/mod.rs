//! Subscriber domain - the per-user access-request lifecycle.

mod phone;
mod record;
mod status;

pub use phone::PhoneNumber;
pub use record::{InviteToken, Subscriber, TransitionError};
pub use status::SubscriberStatus;
