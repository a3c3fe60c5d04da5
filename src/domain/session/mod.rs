//! Admin session - a short-lived marker recording which guided input
//! flow is awaiting a free-text reply from a given admin.
//!
//! At most one session exists per admin. Starting a new guided flow
//! overwrites any prior session silently (last writer wins), and an
//! abandoned session expires after [`SESSION_TTL`] so later free text
//! is treated as ordinary chat again.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long an unconsumed session lives before it expires.
pub const SESSION_TTL: Duration = Duration::from_secs(300);

/// The configuration value a guided flow is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingSetting {
    /// The gated channel's identifier.
    GateChannel,
    /// The payment amount shown to subscribers.
    PaymentAmount,
    /// The mobile-money phone payments are sent to.
    PaymentPhone,
}

impl PendingSetting {
    /// Prompt shown to the admin when the flow begins.
    pub fn prompt(&self) -> &'static str {
        match self {
            PendingSetting::GateChannel => "Send the channel id to gate (e.g. -1001234567890).",
            PendingSetting::PaymentAmount => "Send the payment amount as a whole number.",
            PendingSetting::PaymentPhone => "Send the payment phone number.",
        }
    }
}

/// Single-slot pending-command state for one admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSession {
    /// The setting the next free-text message will be applied to.
    pub pending: PendingSetting,
}

impl AdminSession {
    /// Creates a session waiting for the given setting's value.
    pub fn new(pending: PendingSetting) -> Self {
        Self { pending }
    }
}
