//! SubmitPhoneHandler - phone capture and normalization.

use crate::application::{Button, ButtonAction, GateError, RegistryStore, Reply, SubscriberStore};
use crate::domain::foundation::SubscriberId;
use crate::domain::subscriber::{PhoneNumber, SubscriberStatus};

/// Handler for free text arriving while the flow waits for a phone.
///
/// Invalid input leaves the record untouched; valid input stores the
/// canonical international number and advances to payment
/// confirmation. Stray input in the two pending states replays the
/// relevant prompt.
pub struct SubmitPhoneHandler {
    subscribers: SubscriberStore,
    registry: RegistryStore,
}

impl SubmitPhoneHandler {
    pub fn new(subscribers: SubscriberStore, registry: RegistryStore) -> Self {
        Self {
            subscribers,
            registry,
        }
    }

    pub async fn handle(&self, id: SubscriberId, raw: &str) -> Result<Reply, GateError> {
        let Some(mut subscriber) = self.subscribers.load(id).await? else {
            return Ok(Reply::text("Send /start to begin an access request."));
        };

        match subscriber.status {
            SubscriberStatus::WaitingForPhone => {
                // Validation errors propagate; the record is untouched.
                let phone = PhoneNumber::parse(raw)?;
                subscriber.set_phone(phone)?;
                self.subscribers.save(&subscriber).await?;

                let settings = self.registry.settings().await?;
                Ok(
                    Reply::text(settings.payment_instructions()).with_button(Button::new(
                        "I have paid - Confirm",
                        ButtonAction::Confirm,
                    )),
                )
            }

            SubscriberStatus::PendingConfirmation => {
                let settings = self.registry.settings().await?;
                Ok(
                    Reply::text(settings.payment_instructions()).with_button(Button::new(
                        "I have paid - Confirm",
                        ButtonAction::Confirm,
                    )),
                )
            }

            SubscriberStatus::PendingAdminReview => Ok(Reply::text(
                "Your request is waiting for an admin to review it.",
            )),

            SubscriberStatus::Approved | SubscriberStatus::Rejected => {
                Ok(Reply::text("Send /start to begin a new access request."))
            }
        }
    }
}
