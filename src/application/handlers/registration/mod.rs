//! Registration handlers - the subscriber-facing state machine.

mod confirm;
mod start;
mod status_query;
mod submit_phone;

pub use confirm::ConfirmHandler;
pub use start::StartHandler;
pub use status_query::StatusQueryHandler;
pub use submit_phone::SubmitPhoneHandler;

/// Prompt shown whenever the flow is waiting for a phone number.
pub(crate) const PHONE_PROMPT: &str =
    "Send the phone number you will pay from (e.g. 0911223344, +251911223344 or 251911223344).";
