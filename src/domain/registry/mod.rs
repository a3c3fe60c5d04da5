//! Registry - deployment-wide singleton records.
//!
//! These are explicit records loaded from the state store and passed
//! into handlers; there are no ambient globals. None of them is
//! authoritative for access state - that is always the subscriber
//! record itself.

use crate::domain::foundation::{AdminId, ChannelId, SubscriberId};
use crate::domain::subscriber::PhoneNumber;
use serde::{Deserialize, Serialize};

/// The set of reviewer identifiers.
///
/// An absent or empty set means nobody is admin: the deployment fails
/// closed until the first admin is provisioned out-of-band.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSet {
    admins: Vec<AdminId>,
}

impl AdminSet {
    /// Returns true if the id is a provisioned admin.
    pub fn contains(&self, id: AdminId) -> bool {
        self.admins.contains(&id)
    }

    /// Adds an admin; duplicates are ignored.
    pub fn add(&mut self, id: AdminId) {
        if !self.admins.contains(&id) {
            self.admins.push(id);
        }
    }

    /// All provisioned admins, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = AdminId> + '_ {
        self.admins.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.admins.is_empty()
    }
}

/// Gate configuration. Each value is independently settable and may be
/// absent; absent values degrade messaging but do not hard-fail the
/// registration flow. Approval does require a configured channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateSettings {
    /// The gated channel access is granted to.
    pub channel_id: Option<ChannelId>,

    /// Payment amount quoted to subscribers.
    pub payment_amount: Option<u64>,

    /// Mobile-money phone payments are sent to.
    pub payment_phone: Option<PhoneNumber>,
}

impl GateSettings {
    /// Renders the payment instructions with whatever is configured.
    pub fn payment_instructions(&self) -> String {
        let amount = self
            .payment_amount
            .map(|a| a.to_string())
            .unwrap_or_else(|| "the agreed amount".to_string());
        let phone = self
            .payment_phone
            .as_ref()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "the payment number announced by the admins".to_string());
        format!("Send {} to {} and then press Confirm.", amount, phone)
    }
}

/// Append-only set of every subscriber id ever seen.
///
/// Used purely for enumeration and reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRegistry {
    users: Vec<SubscriberId>,
}

impl UserRegistry {
    /// Records a subscriber id; duplicates are ignored.
    ///
    /// Returns true if the id was newly recorded.
    pub fn record(&mut self, id: SubscriberId) -> bool {
        if self.users.contains(&id) {
            false
        } else {
            self.users.push(id);
            true
        }
    }

    /// Number of distinct subscribers ever seen.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
