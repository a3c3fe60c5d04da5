//! StartHandler - entry point of the registration flow.
//!
//! Branches on the subscriber's current state: fresh and rejected
//! subscribers (re-)enter the flow, a subscriber under review is only
//! informed, and an approved subscriber is probed against the channel's
//! live membership before any reset.

use std::sync::Arc;

use crate::application::{GateError, RegistryStore, Reply, SubscriberStore};
use crate::domain::foundation::SubscriberId;
use crate::domain::subscriber::{Subscriber, SubscriberStatus};
use crate::ports::Notifier;

use super::PHONE_PROMPT;

/// Handler for the registration entry command.
pub struct StartHandler {
    subscribers: SubscriberStore,
    registry: RegistryStore,
    notifier: Arc<dyn Notifier>,
}

impl StartHandler {
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

    pub async fn handle(&self, id: SubscriberId) -> Result<Reply, GateError> {
        // Every entry is recorded for reporting, regardless of outcome.
        self.registry.record_user(id).await?;

        let existing = self.subscribers.load(id).await?;
        let Some(mut subscriber) = existing else {
            let subscriber = Subscriber::begin_registration(id);
            self.subscribers.save(&subscriber).await?;
            return Ok(Reply::text(format!(
                "Welcome! To request access to the channel: {}",
                PHONE_PROMPT
            )));
        };

        match subscriber.status {
            // Restarting before review always resets phone and timestamp.
            SubscriberStatus::WaitingForPhone
            | SubscriberStatus::PendingConfirmation
            | SubscriberStatus::Rejected => {
                subscriber.reset_registration();
                self.subscribers.save(&subscriber).await?;
                Ok(Reply::text(format!(
                    "Starting a new access request. {}",
                    PHONE_PROMPT
                )))
            }

            // A command while under review is informational only.
            SubscriberStatus::PendingAdminReview => Ok(Reply::text(
                "Your request is already waiting for an admin to review it.",
            )),

            SubscriberStatus::Approved => self.handle_approved(subscriber).await,
        }
    }

    /// An approved subscriber restarting is either still a member
    /// (no-op) or has lost membership and may re-register.
    async fn handle_approved(&self, mut subscriber: Subscriber) -> Result<Reply, GateError> {
        let settings = self.registry.settings().await?;
        let Some(channel) = settings.channel_id else {
            // Cannot probe membership without a configured channel;
            // keep the approved state untouched.
            return Ok(Reply::text("You are already approved for the channel."));
        };

        let state = self
            .notifier
            .membership_state(channel, subscriber.id)
            .await?;
        if state.is_member() {
            return Ok(Reply::text(
                "You are already a member of the channel. Nothing to do.",
            ));
        }

        subscriber.reset_registration();
        self.subscribers.save(&subscriber).await?;
        Ok(Reply::text(format!(
            "You are no longer in the channel. Starting a new access request. {}",
            PHONE_PROMPT
        )))
    }
}
