//! StatusQueryHandler - renderable status for the asking subscriber.

use crate::application::{GateError, Reply, SubscriberStore};
use crate::domain::foundation::SubscriberId;
use crate::domain::subscriber::SubscriberStatus;

/// Handler for a subscriber asking where their request stands.
pub struct StatusQueryHandler {
    subscribers: SubscriberStore,
}

impl StatusQueryHandler {
    pub fn new(subscribers: SubscriberStore) -> Self {
        Self { subscribers }
    }

    pub async fn handle(&self, id: SubscriberId) -> Result<Reply, GateError> {
        let Some(subscriber) = self.subscribers.load(id).await? else {
            return Ok(Reply::text(
                "You have no access request yet. Send /start to begin.",
            ));
        };

        let mut text = format!("Your request is {}.", subscriber.status.label());
        if let Some(phone) = &subscriber.phone {
            text.push_str(&format!(" Registered phone: {}.", phone));
        }
        if subscriber.status == SubscriberStatus::Rejected {
            text.push_str(" You can send /start to apply again.");
        }
        Ok(Reply::text(text))
    }
}
