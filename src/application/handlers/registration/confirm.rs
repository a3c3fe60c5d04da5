//! ConfirmHandler - payment confirmation and admin fan-out.
//!
//! The state transition and the admin fan-out are one unit in intent
//! but not transactionally: once the record is persisted as
//! `PendingAdminReview`, notification failures never roll it back.

use std::sync::Arc;

use tracing::warn;

use crate::application::{
    Button, ButtonAction, GateError, RegistryStore, Reply, SubscriberStore,
};
use crate::domain::foundation::SubscriberId;
use crate::domain::subscriber::{Subscriber, SubscriberStatus};
use crate::ports::Notifier;

/// Handler for the subscriber's "I have paid" confirmation.
pub struct ConfirmHandler {
    subscribers: SubscriberStore,
    registry: RegistryStore,
    notifier: Arc<dyn Notifier>,
}

impl ConfirmHandler {
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
        let Some(mut subscriber) = self.subscribers.load(id).await? else {
            return Ok(Reply::text("Send /start to begin an access request."));
        };

        match subscriber.status {
            SubscriberStatus::PendingConfirmation => {
                subscriber.confirm()?;
                self.subscribers.save(&subscriber).await?;

                // Exactly one fan-out per successful transition,
                // best-effort per admin.
                self.notify_admins(&subscriber).await;

                Ok(Reply::text(
                    "Thanks. Your payment claim was sent for review; you will \
                     be notified once an admin decides.",
                ))
            }

            // Duplicate button press or a replayed event: no-op.
            SubscriberStatus::PendingAdminReview => {
                Ok(Reply::text("Your request is already pending review."))
            }

            other => Err(crate::domain::subscriber::TransitionError {
                from: other,
                action: "confirm payment for",
            }
            .into()),
        }
    }

    async fn notify_admins(&self, subscriber: &Subscriber) {
        let admins = match self.registry.admins().await {
            Ok(admins) => admins,
            Err(err) => {
                warn!(%err, "could not load admin set for review fan-out");
                return;
            }
        };

        let name = self
            .notifier
            .display_name(subscriber.id)
            .await
            .unwrap_or_else(|_| subscriber.id.to_string());
        let phone = subscriber
            .phone
            .as_ref()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let review = Reply::text(format!(
            "Access request from {} ({}), paying from {}.",
            name, subscriber.id, phone
        ))
        .with_button(Button::new("Approve", ButtonAction::Approve(subscriber.id)))
        .with_button(Button::new("Reject", ButtonAction::Reject(subscriber.id)));

        for admin in admins.iter() {
            let recipient = SubscriberId::new(admin.as_i64());
            if let Err(err) = self.notifier.send_message(recipient, &review).await {
                warn!(%admin, %err, "review notification to admin failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryStateStore, RecordingNotifier};
    use crate::domain::foundation::AdminId;
    use crate::domain::subscriber::PhoneNumber;
    use crate::ports::StateStore;

    struct Fixture {
        handler: ConfirmHandler,
        subscribers: SubscriberStore,
        registry: RegistryStore,
        notifier: Arc<RecordingNotifier>,
    }

    fn fixture() -> Fixture {
        let store: Arc<dyn StateStore> = Arc::new(InMemoryStateStore::new());
        let subscribers = SubscriberStore::new(store.clone());
        let registry = RegistryStore::new(store);
        let notifier = Arc::new(RecordingNotifier::new());
        Fixture {
            handler: ConfirmHandler::new(
                subscribers.clone(),
                registry.clone(),
                notifier.clone(),
            ),
            subscribers,
            registry,
            notifier,
        }
    }

    async fn pending_confirmation(fx: &Fixture, id: SubscriberId) {
        let mut sub = Subscriber::begin_registration(id);
        sub.set_phone(PhoneNumber::parse("0911223344").unwrap()).unwrap();
        fx.subscribers.save(&sub).await.unwrap();
    }

    #[tokio::test]
    async fn confirm_advances_to_review() {
        let fx = fixture();
        let id = SubscriberId::new(1);
        pending_confirmation(&fx, id).await;

        let reply = fx.handler.handle(id).await.unwrap();
        assert!(reply.text.contains("review"));

        let sub = fx.subscribers.load(id).await.unwrap().unwrap();
        assert_eq!(sub.status, SubscriberStatus::PendingAdminReview);
    }

    #[tokio::test]
    async fn confirm_fans_out_to_every_admin_with_decision_buttons() {
        let fx = fixture();
        let id = SubscriberId::new(1);
        pending_confirmation(&fx, id).await;
        fx.registry.add_admin(AdminId::new(100)).await.unwrap();
        fx.registry.add_admin(AdminId::new(200)).await.unwrap();

        fx.handler.handle(id).await.unwrap();

        for admin in [100, 200] {
            let messages = fx.notifier.sent_to(SubscriberId::new(admin));
            assert_eq!(messages.len(), 1);
            let actions: Vec<_> =
                messages[0].buttons.iter().map(|b| b.action).collect();
            assert_eq!(
                actions,
                vec![ButtonAction::Approve(id), ButtonAction::Reject(id)]
            );
            assert!(messages[0].text.contains("+251911223344"));
        }
    }

    #[tokio::test]
    async fn fanout_failure_does_not_roll_back_the_transition() {
        let fx = fixture();
        let id = SubscriberId::new(1);
        pending_confirmation(&fx, id).await;
        fx.registry.add_admin(AdminId::new(100)).await.unwrap();
        fx.notifier.fail_send(true);

        let reply = fx.handler.handle(id).await.unwrap();
        assert!(reply.text.contains("review"));

        let sub = fx.subscribers.load(id).await.unwrap().unwrap();
        assert_eq!(sub.status, SubscriberStatus::PendingAdminReview);
    }

    #[tokio::test]
    async fn duplicate_confirm_is_an_already_pending_noop() {
        let fx = fixture();
        let id = SubscriberId::new(1);
        pending_confirmation(&fx, id).await;
        fx.registry.add_admin(AdminId::new(100)).await.unwrap();

        fx.handler.handle(id).await.unwrap();
        let reply = fx.handler.handle(id).await.unwrap();
        assert!(reply.text.contains("already pending"));

        // Fan-out happened exactly once.
        assert_eq!(fx.notifier.sent_to(SubscriberId::new(100)).len(), 1);
    }

    #[tokio::test]
    async fn confirm_without_phone_is_a_precondition_warning() {
        let fx = fixture();
        let id = SubscriberId::new(1);
        fx.subscribers
            .save(&Subscriber::begin_registration(id))
            .await
            .unwrap();

        let result = fx.handler.handle(id).await;
        assert!(matches!(result, Err(GateError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn confirm_for_unknown_subscriber_points_to_start() {
        let fx = fixture();
        let reply = fx.handler.handle(SubscriberId::new(404)).await.unwrap();
        assert!(reply.text.contains("/start"));
    }
}
