//! ApplySettingHandler - consume a pending session with a free-text value.

use crate::application::{GateError, RegistryStore, Reply, SessionStore};
use crate::domain::foundation::{AdminId, ChannelId, ValidationError};
use crate::domain::session::PendingSetting;
use crate::domain::subscriber::PhoneNumber;

/// Handler for an admin's free-text message while a guided flow is live.
///
/// Consuming the session is read-then-delete, so an invalid value still
/// ends the flow; the admin re-runs the command to try again.
pub struct ApplySettingHandler {
    sessions: SessionStore,
    registry: RegistryStore,
}

impl ApplySettingHandler {
    pub fn new(sessions: SessionStore, registry: RegistryStore) -> Self {
        Self { sessions, registry }
    }

    /// Returns `Ok(None)` when the admin has no live session, so the
    /// dispatcher can treat the text as ordinary chat.
    pub async fn handle(
        &self,
        admin: AdminId,
        raw: &str,
    ) -> Result<Option<Reply>, GateError> {
        let Some(session) = self.sessions.take(admin).await? else {
            return Ok(None);
        };

        let mut settings = self.registry.settings().await?;
        let confirmation = match session.pending {
            PendingSetting::GateChannel => {
                let id: i64 = raw.trim().parse().map_err(|_| {
                    ValidationError::invalid_format("channel_id", "expected a numeric channel id")
                })?;
                settings.channel_id = Some(ChannelId::new(id));
                format!("Gate channel set to {}.", id)
            }
            PendingSetting::PaymentAmount => {
                let amount: u64 = raw.trim().parse().map_err(|_| {
                    ValidationError::invalid_format("payment_amount", "expected a whole number")
                })?;
                if amount == 0 {
                    return Err(ValidationError::not_positive("payment_amount").into());
                }
                settings.payment_amount = Some(amount);
                format!("Payment amount set to {}.", amount)
            }
            PendingSetting::PaymentPhone => {
                let phone = PhoneNumber::parse(raw)?;
                let text = format!("Payment phone set to {}.", phone);
                settings.payment_phone = Some(phone);
                text
            }
        };

        self.registry.save_settings(&settings).await?;
        Ok(Some(Reply::text(confirmation)))
    }
}
