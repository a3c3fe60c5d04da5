//! RejectHandler - deny a pending request.

use std::sync::Arc;

use tracing::warn;

use crate::application::{GateError, Reply, SubscriberStore};
use crate::domain::foundation::SubscriberId;
use crate::ports::Notifier;

/// Handler for an admin rejecting a pending request.
///
/// No credential is involved; the subscriber is notified best-effort.
pub struct RejectHandler {
    subscribers: SubscriberStore,
    notifier: Arc<dyn Notifier>,
}

impl RejectHandler {
    pub fn new(subscribers: SubscriberStore, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            subscribers,
            notifier,
        }
    }

    pub async fn handle(&self, target: SubscriberId) -> Result<Reply, GateError> {
        let mut subscriber = self
            .subscribers
            .load(target)
            .await?
            .ok_or(GateError::UnknownSubscriber(target))?;

        subscriber.reject()?;
        self.subscribers.save(&subscriber).await?;

        let notice = Reply::text(
            "Your access request was rejected. If you believe the payment \
             was valid, contact the admins or send /start to apply again.",
        );
        if let Err(err) = self.notifier.send_message(target, &notice).await {
            warn!(%target, %err, "rejection notice delivery failed");
        }

        Ok(Reply::text(format!("Rejected the request from {}.", target)))
    }
}
