//! Renderable reply content.
//!
//! Handlers never deliver or format messages themselves; they return a
//! `Reply` (text plus optional action buttons) and the dispatcher's
//! caller performs delivery.

use crate::domain::foundation::SubscriberId;
use serde::{Deserialize, Serialize};

/// Action carried by a pressed button.
///
/// A closed set; the dispatcher matches exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum ButtonAction {
    /// Subscriber confirms the payment was sent.
    Confirm,
    /// Admin approves the target's pending request.
    Approve(SubscriberId),
    /// Admin rejects the target's pending request.
    Reject(SubscriberId),
    /// Admin revokes the target's granted access.
    Revoke(SubscriberId),
}

/// A single action button attached to a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub action: ButtonAction,
}

impl Button {
    pub fn new(label: impl Into<String>, action: ButtonAction) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

/// Structured content for one outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    pub buttons: Vec<Button>,
}

impl Reply {
    /// A plain text reply with no buttons.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            buttons: Vec::new(),
        }
    }

    /// Attaches a button to the reply.
    pub fn with_button(mut self, button: Button) -> Self {
        self.buttons.push(button);
        self
    }
}
