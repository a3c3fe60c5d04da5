//! Recording notifier for tests and development.
//!
//! Records every outbound message and credential operation, with
//! per-operation failure switches so handler tests can simulate a
//! misbehaving channel API.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use crate::application::Reply;
use crate::domain::foundation::{ChannelId, SubscriberId};
use crate::domain::subscriber::InviteToken;
use crate::ports::{MembershipState, Notifier, NotifyError};

/// One delivered (or edited) message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub recipient: SubscriberId,
    pub reply: Reply,
}

/// Notifier double that records calls and can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentMessage>>,
    revoked_tokens: Mutex<Vec<InviteToken>>,
    removed_members: Mutex<Vec<SubscriberId>>,
    membership: Mutex<HashMap<SubscriberId, MembershipState>>,
    invite_counter: AtomicU64,
    fail_send: AtomicBool,
    fail_create_invite: AtomicBool,
    fail_revoke_invite: AtomicBool,
    fail_remove_member: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_send(&self, fail: bool) {
        self.fail_send.store(fail, Ordering::SeqCst);
    }

    pub fn fail_create_invite(&self, fail: bool) {
        self.fail_create_invite.store(fail, Ordering::SeqCst);
    }

    pub fn fail_revoke_invite(&self, fail: bool) {
        self.fail_revoke_invite.store(fail, Ordering::SeqCst);
    }

    pub fn fail_remove_member(&self, fail: bool) {
        self.fail_remove_member.store(fail, Ordering::SeqCst);
    }

    /// Sets what the membership query will report for a subscriber.
    pub fn set_membership(&self, member: SubscriberId, state: MembershipState) {
        self.membership.lock().unwrap().insert(member, state);
    }

    pub fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Messages delivered to one recipient, in order.
    pub fn sent_to(&self, recipient: SubscriberId) -> Vec<Reply> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.recipient == recipient)
            .map(|m| m.reply.clone())
            .collect()
    }

    pub fn revoked_tokens(&self) -> Vec<InviteToken> {
        self.revoked_tokens.lock().unwrap().clone()
    }

    pub fn removed_members(&self) -> Vec<SubscriberId> {
        self.removed_members.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_message(
        &self,
        recipient: SubscriberId,
        reply: &Reply,
    ) -> Result<(), NotifyError> {
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(NotifyError::Unavailable("simulated send failure".into()));
        }
        self.sent.lock().unwrap().push(SentMessage {
            recipient,
            reply: reply.clone(),
        });
        Ok(())
    }

    async fn edit_message(
        &self,
        recipient: SubscriberId,
        _message_id: i64,
        reply: &Reply,
    ) -> Result<(), NotifyError> {
        self.send_message(recipient, reply).await
    }

    async fn create_invite_link(
        &self,
        _channel: ChannelId,
        label: &str,
    ) -> Result<InviteToken, NotifyError> {
        if self.fail_create_invite.load(Ordering::SeqCst) {
            return Err(NotifyError::Rejected("simulated invite failure".into()));
        }
        let n = self.invite_counter.fetch_add(1, Ordering::SeqCst);
        Ok(InviteToken::new(format!("invite-{}-{}", label, n)))
    }

    async fn revoke_invite_link(
        &self,
        _channel: ChannelId,
        token: &InviteToken,
    ) -> Result<(), NotifyError> {
        if self.fail_revoke_invite.load(Ordering::SeqCst) {
            return Err(NotifyError::Rejected("simulated revoke failure".into()));
        }
        self.revoked_tokens.lock().unwrap().push(token.clone());
        Ok(())
    }

    async fn remove_member(
        &self,
        _channel: ChannelId,
        member: SubscriberId,
    ) -> Result<(), NotifyError> {
        if self.fail_remove_member.load(Ordering::SeqCst) {
            return Err(NotifyError::Rejected("simulated kick failure".into()));
        }
        self.removed_members.lock().unwrap().push(member);
        self.membership
            .lock()
            .unwrap()
            .insert(member, MembershipState::Removed);
        Ok(())
    }

    async fn membership_state(
        &self,
        _channel: ChannelId,
        member: SubscriberId,
    ) -> Result<MembershipState, NotifyError> {
        Ok(self
            .membership
            .lock()
            .unwrap()
            .get(&member)
            .copied()
            .unwrap_or(MembershipState::Left))
    }

    async fn display_name(&self, member: SubscriberId) -> Result<String, NotifyError> {
        Ok(format!("user-{}", member))
    }
}
