//! Application error taxonomy.
//!
//! Propagation policy: validation and precondition errors are handled
//! at the point of detection and become user-facing messages; upstream
//! failures during irreversible steps abort the request; upstream
//! failures during best-effort side effects are logged and downgraded
//! to warnings by the handler that encounters them.

use thiserror::Error;

use crate::domain::foundation::ValidationError;
use crate::domain::subscriber::TransitionError;
use crate::ports::{NotifyError, StoreError};

/// Errors a handler can return to the dispatcher.
#[derive(Debug, Clone, Error)]
pub enum GateError {
    /// Malformed user input. Always correctable by the sender.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A lifecycle precondition on the current status was not met.
    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    /// A reviewed target has no stored record at all.
    ///
    /// Like a failed transition precondition, this is a warning to the
    /// acting admin, not a fault.
    #[error("no access request on record for subscriber {0}")]
    UnknownSubscriber(crate::domain::foundation::SubscriberId),

    /// A required setting is absent; the admin should configure rather
    /// than retry.
    #[error("missing configuration: {0}")]
    MissingConfiguration(&'static str),

    /// A store or channel call failed during an irreversible step.
    #[error("upstream failure: {0}")]
    Upstream(String),
}

impl From<StoreError> for GateError {
    fn from(err: StoreError) -> Self {
        GateError::Upstream(err.to_string())
    }
}

impl From<NotifyError> for GateError {
    fn from(err: NotifyError) -> Self {
        GateError::Upstream(err.to_string())
    }
}
