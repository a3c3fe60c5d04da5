//! SweepExpiredHandler - revoke grants older than a threshold.
//!
//! Sequential and best-effort: one subscriber's failure never aborts
//! the sweep for the rest. A subscriber revoked mid-sweep by an
//! interactive admin action is seen as already rejected and skipped
//! via the revoke precondition.

use std::time::Duration;

use tracing::warn;

use crate::application::handlers::review::RevokeHandler;
use crate::application::{GateError, Reply, SubscriberStore};
use crate::domain::foundation::{SubscriberId, Timestamp};
use crate::domain::subscriber::SubscriberStatus;

/// Default grant lifetime before a sweep revokes it.
pub const DEFAULT_SWEEP_MAX_AGE: Duration = Duration::from_secs(30 * 24 * 3600);

/// Accumulated result of one expiry sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Subscribers whose grant age exceeded the threshold.
    pub attempted: usize,
    /// Successfully revoked by this sweep.
    pub revoked: usize,
    /// Settled by a concurrent decision between scan and revoke; the
    /// sweep performed no revocation for these.
    pub skipped: usize,
    /// Failed revocations with a reason, in scan order.
    pub failed: Vec<(SubscriberId, String)>,
}

impl SweepReport {
    /// Renders the report for the requesting admin.
    pub fn to_reply(&self) -> Reply {
        let mut text = format!(
            "Expiry sweep: {} expired, {} revoked, {} already settled, {} failed.",
            self.attempted,
            self.revoked,
            self.skipped,
            self.failed.len()
        );
        for (id, reason) in &self.failed {
            text.push_str(&format!("\n{}: {}", id, reason));
        }
        Reply::text(text)
    }
}

/// Handler for the periodic/requested expiry sweep.
pub struct SweepExpiredHandler {
    subscribers: SubscriberStore,
    revoke: RevokeHandler,
}

impl SweepExpiredHandler {
    pub fn new(subscribers: SubscriberStore, revoke: RevokeHandler) -> Self {
        Self { subscribers, revoke }
    }

    pub async fn handle(&self, max_age: Duration) -> Result<SweepReport, GateError> {
        let now = Timestamp::now();
        let expired: Vec<SubscriberId> = self
            .subscribers
            .list_all()
            .await?
            .into_iter()
            .filter(|s| s.status == SubscriberStatus::Approved)
            .filter(|s| s.updated_at.age(&now) > max_age)
            .map(|s| s.id)
            .collect();

        let mut report = SweepReport {
            attempted: expired.len(),
            ..Default::default()
        };

        for id in expired {
            match self.revoke.handle(id).await {
                Ok(_) => report.revoked += 1,
                // Raced with an interactive decision: a no-op, not a
                // revocation this sweep can claim.
                Err(GateError::InvalidTransition(_)) | Err(GateError::UnknownSubscriber(_)) => {
                    report.skipped += 1;
                }
                Err(err) => {
                    warn!(%id, %err, "sweep revocation failed");
                    report.failed.push((id, err.to_string()));
                }
            }
        }

        Ok(report)
    }
}
