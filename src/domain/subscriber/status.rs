//! Subscriber status state machine.
//!
//! Defines all states of the access-request lifecycle and the valid
//! transitions between them. A subscriber with no stored record has
//! never started; `WaitingForPhone` is the entry state.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};

/// Current state of a subscriber in the access-request lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriberStatus {
    /// Registration started; waiting for the subscriber's phone number.
    WaitingForPhone,

    /// Phone received; waiting for the subscriber to confirm payment
    /// was sent.
    PendingConfirmation,

    /// Payment claimed; waiting for an admin to verify and decide.
    PendingAdminReview,

    /// Access granted; an invite credential was issued.
    Approved,

    /// Access denied or revoked. Re-registration is allowed.
    Rejected,
}

impl SubscriberStatus {
    /// Returns true if an admin decision is still possible from this state.
    pub fn is_reviewable(&self) -> bool {
        matches!(self, SubscriberStatus::PendingAdminReview)
    }

    /// Human-readable label used in status replies and reports.
    pub fn label(&self) -> &'static str {
        match self {
            SubscriberStatus::WaitingForPhone => "waiting for phone number",
            SubscriberStatus::PendingConfirmation => "waiting for payment confirmation",
            SubscriberStatus::PendingAdminReview => "under review",
            SubscriberStatus::Approved => "approved",
            SubscriberStatus::Rejected => "rejected",
        }
    }
}

impl StateMachine for SubscriberStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SubscriberStatus::*;
        matches!(
            (self, target),
            // Registration flow
            (WaitingForPhone, PendingConfirmation)
                | (WaitingForPhone, WaitingForPhone) // restart resets phone
                | (PendingConfirmation, PendingAdminReview)
                | (PendingConfirmation, WaitingForPhone) // restart before confirm
            // Admin decisions
                | (PendingAdminReview, Approved)
                | (PendingAdminReview, Rejected)
                | (Approved, Rejected) // revocation
            // Re-registration
                | (Rejected, WaitingForPhone)
                | (Approved, WaitingForPhone) // only when no longer a member
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SubscriberStatus::*;
        match self {
            WaitingForPhone => vec![PendingConfirmation, WaitingForPhone],
            PendingConfirmation => vec![PendingAdminReview, WaitingForPhone],
            PendingAdminReview => vec![Approved, Rejected],
            Approved => vec![Rejected, WaitingForPhone],
            Rejected => vec![WaitingForPhone],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waiting_can_move_to_pending_confirmation() {
        let status = SubscriberStatus::WaitingForPhone;
        assert_eq!(
            status.transition_to(SubscriberStatus::PendingConfirmation),
            Ok(SubscriberStatus::PendingConfirmation)
        );
    }

    #[test]
    fn pending_confirmation_can_move_to_review() {
        let status = SubscriberStatus::PendingConfirmation;
        assert_eq!(
            status.transition_to(SubscriberStatus::PendingAdminReview),
            Ok(SubscriberStatus::PendingAdminReview)
        );
    }

    #[test]
    fn review_can_be_approved_or_rejected() {
        let status = SubscriberStatus::PendingAdminReview;
        assert!(status.can_transition_to(&SubscriberStatus::Approved));
        assert!(status.can_transition_to(&SubscriberStatus::Rejected));
    }

    #[test]
    fn approved_can_be_revoked() {
        assert!(SubscriberStatus::Approved.can_transition_to(&SubscriberStatus::Rejected));
    }

    #[test]
    fn rejected_can_reregister() {
        assert!(SubscriberStatus::Rejected.can_transition_to(&SubscriberStatus::WaitingForPhone));
    }

    #[test]
    fn waiting_cannot_skip_to_review() {
        let status = SubscriberStatus::WaitingForPhone;
        assert!(!status.can_transition_to(&SubscriberStatus::PendingAdminReview));
        assert!(status
            .transition_to(SubscriberStatus::PendingAdminReview)
            .is_err());
    }

    #[test]
    fn review_cannot_be_reset_by_restart() {
        // A restart while under review is informational only.
        assert!(!SubscriberStatus::PendingAdminReview
            .can_transition_to(&SubscriberStatus::WaitingForPhone));
    }

    #[test]
    fn rejected_cannot_be_approved_directly() {
        assert!(!SubscriberStatus::Rejected.can_transition_to(&SubscriberStatus::Approved));
    }

    #[test]
    fn no_state_is_terminal() {
        // Every state can eventually re-enter the registration flow.
        for status in [
            SubscriberStatus::WaitingForPhone,
            SubscriberStatus::PendingConfirmation,
            SubscriberStatus::PendingAdminReview,
            SubscriberStatus::Approved,
            SubscriberStatus::Rejected,
        ] {
            assert!(!status.is_terminal(), "{:?} should not be terminal", status);
        }
    }

    #[test]
    fn valid_transitions_are_consistent_with_can_transition_to() {
        for status in [
            SubscriberStatus::WaitingForPhone,
            SubscriberStatus::PendingConfirmation,
            SubscriberStatus::PendingAdminReview,
            SubscriberStatus::Approved,
            SubscriberStatus::Rejected,
        ] {
            for target in status.valid_transitions() {
                assert!(
                    status.can_transition_to(&target),
                    "can_transition_to should return true for {:?} -> {:?}",
                    status,
                    target
                );
            }
        }
    }

    #[test]
    fn status_serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&SubscriberStatus::PendingAdminReview).unwrap();
        assert_eq!(json, "\"PENDING_ADMIN_REVIEW\"");
    }
}
