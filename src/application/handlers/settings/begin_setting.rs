//! BeginSettingHandler - start a guided configuration flow.

use crate::application::{GateError, Reply, SessionStore};
use crate::domain::foundation::AdminId;
use crate::domain::session::{AdminSession, PendingSetting};

/// Handler for an admin activating a guided free-text flow.
///
/// Writes the admin's single session slot unconditionally: starting a
/// new flow silently abandons an old one.
pub struct BeginSettingHandler {
    sessions: SessionStore,
}

impl BeginSettingHandler {
    pub fn new(sessions: SessionStore) -> Self {
        Self { sessions }
    }

    pub async fn handle(
        &self,
        admin: AdminId,
        setting: PendingSetting,
    ) -> Result<Reply, GateError> {
        self.sessions
            .begin(admin, AdminSession::new(setting))
            .await?;
        Ok(Reply::text(setting.prompt()))
    }
}
