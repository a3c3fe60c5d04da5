//! RevokeHandler - withdraw granted access.
//!
//! Enforcement actions (invalidating the invite link, removing the
//! member) are best-effort; the state write recording the revocation
//! is unconditional. The system of record is the state store, not the
//! channel's live membership list, so the authorization decision must
//! land even when mechanical enforcement could not.

use std::sync::Arc;

use tracing::warn;

use crate::application::{GateError, RegistryStore, Reply, SubscriberStore};
use crate::domain::foundation::SubscriberId;
use crate::domain::subscriber::{SubscriberStatus, TransitionError};
use crate::ports::Notifier;

/// What happened during one revocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokeOutcome {
    pub target: SubscriberId,
    /// The record carried no invite token, so only the kick was attempted.
    pub kick_only: bool,
    /// Membership removal failed; an operator may need to retry manually.
    pub kick_failed: bool,
}

impl RevokeOutcome {
    /// Renders the outcome for the acting admin.
    pub fn to_reply(&self) -> Reply {
        let mut text = format!("Revoked access for {}.", self.target);
        if self.kick_only {
            text.push_str(" No invite token was on record, so only removal was attempted.");
        }
        if self.kick_failed {
            text.push_str(
                " Removing them from the channel failed; please remove them manually.",
            );
        }
        Reply::text(text)
    }
}

/// Handler for an admin revoking granted access.
#[derive(Clone)]
pub struct RevokeHandler {
    subscribers: SubscriberStore,
    registry: RegistryStore,
    notifier: Arc<dyn Notifier>,
}

impl RevokeHandler {
    pub fn new(
        subscribers: SubscriberStore,
        registry: RegistryStore,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            subscribers,
            registry,
            notifier,
        }
    }

    pub async fn handle(&self, target: SubscriberId) -> Result<RevokeOutcome, GateError> {
        let mut subscriber = self
            .subscribers
            .load(target)
            .await?
            .ok_or(GateError::UnknownSubscriber(target))?;

        if subscriber.status != SubscriberStatus::Approved {
            return Err(TransitionError {
                from: subscriber.status,
                action: "revoke",
            }
            .into());
        }

        let channel = self.registry.settings().await?.channel_id;
        let token = subscriber.invite_token.clone();
        let kick_only = token.is_none();
        let mut kick_failed = false;

        if let Some(channel) = channel {
            // (a) Invalidate the invite link; it may already have been
            // consumed, so failure is only logged.
            if let Some(token) = &token {
                if let Err(err) = self.notifier.revoke_invite_link(channel, token).await {
                    warn!(%target, %err, "invite link revocation failed");
                }
            }

            // (b) Remove membership; failure is reported distinctly so
            // an operator can retry.
            if let Err(err) = self.notifier.remove_member(channel, target).await {
                warn!(%target, %err, "member removal failed");
                kick_failed = true;
            }
        } else {
            warn!(%target, "no channel configured; revoking record only");
            kick_failed = true;
        }

        // (c) Tell the subscriber, best-effort.
        let notice = Reply::text("Your access to the channel has been revoked.");
        if let Err(err) = self.notifier.send_message(target, &notice).await {
            warn!(%target, %err, "revocation notice delivery failed");
        }

        // (d) The unconditional state write.
        subscriber.revoke()?;
        self.subscribers.save(&subscriber).await?;

        Ok(RevokeOutcome {
            target,
            kick_only,
            kick_failed,
        })
    }
}
