//! Review handlers - the access-grant lifecycle.

mod approve;
mod reject;
mod revoke;

pub use approve::ApproveHandler;
pub use reject::RejectHandler;
pub use revoke::{RevokeHandler, RevokeOutcome};
