//! Subscriber aggregate entity.
//!
//! One record per end user who has ever started the access-request
//! flow. The record is overwritten on every transition and is the
//! system of record for access decisions: the external channel's live
//! membership list is enforcement, not truth.
//!
//! # Invariants
//!
//! - `phone` is present from `PendingConfirmation` onward and immutable
//!   until a new registration cycle begins.
//! - `invite_token` is non-empty iff status is `Approved` and credential
//!   issuance succeeded; it is cleared on any transition away from
//!   `Approved`. A missing token while `Approved` means revocation
//!   proceeds kick-only.
//! - `updated_at` is refreshed on every transition; expiry sweeps key
//!   off it.

use crate::domain::foundation::{StateMachine, SubscriberId, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::{PhoneNumber, SubscriberStatus};

/// Opaque single-use invite credential issued by the notification channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InviteToken(String);

impl InviteToken {
    /// Wraps a credential string received from the channel API.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw credential string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InviteToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A lifecycle action was attempted from a state that does not allow it.
///
/// Surfaced to the caller as a warning, never as a fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {action} a subscriber that is {from:?}")]
pub struct TransitionError {
    pub from: SubscriberStatus,
    pub action: &'static str,
}

/// Subscriber aggregate - one user's position in the access lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    /// Platform-assigned stable identifier.
    pub id: SubscriberId,

    /// Current lifecycle state.
    pub status: SubscriberStatus,

    /// Normalized phone number, set when registration advances past
    /// `WaitingForPhone`.
    pub phone: Option<PhoneNumber>,

    /// Moment of the last status transition.
    pub updated_at: Timestamp,

    /// Single-use invite credential, present only while `Approved`.
    pub invite_token: Option<InviteToken>,
}

impl Subscriber {
    /// Creates a fresh record in `WaitingForPhone`.
    pub fn begin_registration(id: SubscriberId) -> Self {
        Self {
            id,
            status: SubscriberStatus::WaitingForPhone,
            phone: None,
            updated_at: Timestamp::now(),
            invite_token: None,
        }
    }

    /// Resets this record to the start of a new registration cycle.
    ///
    /// Discards any previously submitted phone and credential.
    pub fn reset_registration(&mut self) {
        self.status = SubscriberStatus::WaitingForPhone;
        self.phone = None;
        self.invite_token = None;
        self.updated_at = Timestamp::now();
    }

    /// Stores a validated phone and advances to `PendingConfirmation`.
    ///
    /// Any prior phone value is discarded.
    pub fn set_phone(&mut self, phone: PhoneNumber) -> Result<(), TransitionError> {
        self.transition(SubscriberStatus::PendingConfirmation, "submit a phone for")?;
        self.phone = Some(phone);
        Ok(())
    }

    /// Marks the payment as claimed and advances to `PendingAdminReview`.
    pub fn confirm(&mut self) -> Result<(), TransitionError> {
        self.transition(SubscriberStatus::PendingAdminReview, "confirm payment for")
    }

    /// Grants access, recording the issued credential.
    pub fn approve(&mut self, token: InviteToken) -> Result<(), TransitionError> {
        self.transition(SubscriberStatus::Approved, "approve")?;
        self.invite_token = Some(token);
        Ok(())
    }

    /// Denies a pending request.
    pub fn reject(&mut self) -> Result<(), TransitionError> {
        if self.status != SubscriberStatus::PendingAdminReview {
            return Err(TransitionError {
                from: self.status,
                action: "reject",
            });
        }
        self.transition(SubscriberStatus::Rejected, "reject")
    }

    /// Withdraws granted access, clearing the credential.
    pub fn revoke(&mut self) -> Result<(), TransitionError> {
        if self.status != SubscriberStatus::Approved {
            return Err(TransitionError {
                from: self.status,
                action: "revoke",
            });
        }
        self.transition(SubscriberStatus::Rejected, "revoke")?;
        self.invite_token = None;
        Ok(())
    }

    fn transition(
        &mut self,
        target: SubscriberStatus,
        action: &'static str,
    ) -> Result<(), TransitionError> {
        self.status = self
            .status
            .transition_to(target)
            .map_err(|_| TransitionError {
                from: self.status,
                action,
            })?;
        self.updated_at = Timestamp::now();
        Ok(())
    }
}
