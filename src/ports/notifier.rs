//! Notification channel port.
//!
//! Covers everything the core asks of the messaging platform: message
//! delivery, single-use invite credentials, membership removal, and
//! membership/lookup queries. Transport, markup, and localization live
//! behind the adapter.

use async_trait::async_trait;
use thiserror::Error;

use crate::application::Reply;
use crate::domain::foundation::{ChannelId, SubscriberId};
use crate::domain::subscriber::InviteToken;

/// Errors surfaced by notification channel implementations.
#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    #[error("notification channel rejected the request: {0}")]
    Rejected(String),

    #[error("notification channel unavailable: {0}")]
    Unavailable(String),
}

/// A member's live standing in the gated channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipState {
    /// Currently a member of the channel.
    Member,
    /// Left the channel voluntarily.
    Left,
    /// Removed or banned from the channel.
    Removed,
}

impl MembershipState {
    /// True only for a confirmed current member.
    pub fn is_member(&self) -> bool {
        matches!(self, MembershipState::Member)
    }
}

/// Notification channel port.
///
/// All operations are blocking, independent, and non-retried from the
/// core's perspective; retry policy, if any, belongs to the adapter.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a reply to a recipient's chat.
    async fn send_message(&self, recipient: SubscriberId, reply: &Reply)
        -> Result<(), NotifyError>;

    /// Edit a previously delivered message in place.
    async fn edit_message(
        &self,
        recipient: SubscriberId,
        message_id: i64,
        reply: &Reply,
    ) -> Result<(), NotifyError>;

    /// Create a single-use invite credential scoped to the channel.
    ///
    /// The credential is single-use by construction of the platform
    /// API; the core does not track consumption.
    async fn create_invite_link(
        &self,
        channel: ChannelId,
        label: &str,
    ) -> Result<InviteToken, NotifyError>;

    /// Invalidate a previously issued invite credential.
    async fn revoke_invite_link(
        &self,
        channel: ChannelId,
        token: &InviteToken,
    ) -> Result<(), NotifyError>;

    /// Remove a subscriber from the channel's membership.
    async fn remove_member(
        &self,
        channel: ChannelId,
        member: SubscriberId,
    ) -> Result<(), NotifyError>;

    /// Query a subscriber's live standing in the channel.
    async fn membership_state(
        &self,
        channel: ChannelId,
        member: SubscriberId,
    ) -> Result<MembershipState, NotifyError>;

    /// Human-readable display name for a subscriber.
    async fn display_name(&self, member: SubscriberId) -> Result<String, NotifyError>;
}
