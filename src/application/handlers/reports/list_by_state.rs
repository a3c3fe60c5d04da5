//! ListByStateHandler - enumerate subscribers in a given state.
//!
//! The only O(n)-over-all-subscribers read in the core. A batch/report
//! operation, not part of the interactive path, and it holds no locks
//! while scanning.

use std::sync::Arc;

use crate::application::{GateError, RegistryStore, Reply, SubscriberStore};
use crate::domain::subscriber::SubscriberStatus;
use crate::ports::Notifier;

/// Handler for the pending/approved listing reports.
pub struct ListByStateHandler {
    subscribers: SubscriberStore,
    registry: RegistryStore,
    notifier: Arc<dyn Notifier>,
}

impl ListByStateHandler {
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

    pub async fn handle(&self, status: SubscriberStatus) -> Result<Reply, GateError> {
        let mut matching: Vec<_> = self
            .subscribers
            .list_all()
            .await?
            .into_iter()
            .filter(|s| s.status == status)
            .collect();
        matching.sort_by_key(|s| s.updated_at);

        let total_seen = self.registry.user_registry().await?.len();
        let mut text = format!(
            "{} subscriber(s) {} ({} ever registered).",
            matching.len(),
            status.label(),
            total_seen
        );

        for subscriber in &matching {
            let name = self
                .notifier
                .display_name(subscriber.id)
                .await
                .unwrap_or_else(|_| subscriber.id.to_string());
            let phone = subscriber
                .phone
                .as_ref()
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string());
            text.push_str(&format!("\n{} ({}) {}", name, subscriber.id, phone));
        }

        Ok(Reply::text(text))
    }
}
