//! ApproveHandler - grant access to a reviewed subscriber.
//!
//! Ordered steps with explicit per-step failure policy:
//!
//! 1. create the single-use invite credential - abort before any state
//!    change on failure (safe to retry);
//! 2. deliver the credential to the subscriber - log and continue;
//! 3. persist `Approved` with the credential - mandatory;
//! 4. report the outcome to the acting admin via the returned reply.
//!
//! Once step 3 completes the subscriber is durably approved even if
//! delivery failed; recovery for a lost message is manual.

use std::sync::Arc;

use tracing::warn;

use crate::application::{GateError, RegistryStore, Reply, SubscriberStore};
use crate::domain::foundation::SubscriberId;
use crate::domain::subscriber::TransitionError;
use crate::ports::Notifier;

/// Handler for an admin approving a pending request.
pub struct ApproveHandler {
    subscribers: SubscriberStore,
    registry: RegistryStore,
    notifier: Arc<dyn Notifier>,
}

impl ApproveHandler {
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

    pub async fn handle(&self, target: SubscriberId) -> Result<Reply, GateError> {
        let mut subscriber = self
            .subscribers
            .load(target)
            .await?
            .ok_or(GateError::UnknownSubscriber(target))?;

        if !subscriber.status.is_reviewable() {
            return Err(TransitionError {
                from: subscriber.status,
                action: "approve",
            }
            .into());
        }

        let settings = self.registry.settings().await?;
        let channel = settings
            .channel_id
            .ok_or(GateError::MissingConfiguration("channel_id"))?;

        // Step 1: no state change has happened yet, so a failure here
        // leaves the request safely retryable.
        let token = self
            .notifier
            .create_invite_link(channel, &target.to_string())
            .await?;

        // Step 2: best-effort delivery.
        let invite = Reply::text(format!(
            "Your access request was approved. Join with this single-use link: {}",
            token
        ));
        let delivered = match self.notifier.send_message(target, &invite).await {
            Ok(()) => true,
            Err(err) => {
                warn!(%target, %err, "invite delivery failed");
                false
            }
        };

        // Step 3: the mandatory state write.
        subscriber.approve(token)?;
        self.subscribers.save(&subscriber).await?;

        // Step 4: outcome for the acting admin.
        let text = if delivered {
            format!("Approved {} and delivered the invite link.", target)
        } else {
            format!(
                "Approved {} but the invite link could not be delivered; \
                 ask them to request it again.",
                target
            )
        };
        Ok(Reply::text(text))
    }
}
