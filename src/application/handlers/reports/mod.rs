//! Report handlers - batch operations over all subscribers.

mod list_by_state;
mod sweep_expired;

pub use list_by_state::ListByStateHandler;
pub use sweep_expired::{SweepExpiredHandler, SweepReport, DEFAULT_SWEEP_MAX_AGE};
