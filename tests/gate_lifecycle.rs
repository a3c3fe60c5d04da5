//! Integration tests for the full access-grant lifecycle.
//!
//! These tests drive the dispatcher end to end:
//! 1. Subscriber registers, submits a phone number, and confirms payment
//! 2. Admins are fanned out a review notification
//! 3. An admin approves, which issues a single-use invite link
//! 4. An admin revokes, which enforces removal and records rejection
//!
//! Uses in-memory implementations to exercise the flow without external
//! dependencies.

use std::sync::Arc;

use channel_warden::adapters::memory::{InMemoryStateStore, RecordingNotifier};
use channel_warden::application::{
    ButtonAction, Dispatcher, InboundEvent, RegistryStore, SubscriberStore,
};
use channel_warden::domain::foundation::{AdminId, ChannelId, SubscriberId};
use channel_warden::domain::registry::GateSettings;
use channel_warden::domain::subscriber::SubscriberStatus;
use channel_warden::ports::{MembershipState, StateStore};

struct Harness {
    dispatcher: Dispatcher,
    registry: RegistryStore,
    subscribers: SubscriberStore,
    notifier: Arc<RecordingNotifier>,
}

/// Makes the handlers' best-effort `warn!` lines visible under
/// `RUST_LOG`. Safe to call from every test; only the first wins.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

impl Harness {
    fn new() -> Self {
        init_tracing();
        let store: Arc<dyn StateStore> = Arc::new(InMemoryStateStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        Self {
            dispatcher: Dispatcher::new(store.clone(), notifier.clone()),
            registry: RegistryStore::new(store.clone()),
            subscribers: SubscriberStore::new(store),
            notifier,
        }
    }

    async fn with_admins(self, admins: &[i64]) -> Self {
        for id in admins {
            self.registry.add_admin(AdminId::new(*id)).await.unwrap();
        }
        self.registry
            .save_settings(&GateSettings {
                channel_id: Some(ChannelId::new(-1001234567890)),
                payment_amount: Some(500),
                ..Default::default()
            })
            .await
            .unwrap();
        self
    }

    async fn text(&self, sender: i64, text: &str) -> String {
        self.dispatcher
            .dispatch(InboundEvent::text(SubscriberId::new(sender), text))
            .await
            .text
    }

    async fn button(&self, sender: i64, action: ButtonAction) -> String {
        self.dispatcher
            .dispatch(InboundEvent::button(SubscriberId::new(sender), action))
            .await
            .text
    }

    async fn status_of(&self, id: i64) -> SubscriberStatus {
        self.subscribers
            .load(SubscriberId::new(id))
            .await
            .unwrap()
            .unwrap()
            .status
    }
}

const ADMIN_A: i64 = 9001;
const ADMIN_B: i64 = 9002;
const USER: i64 = 42;

#[tokio::test]
async fn register_confirm_approve_revoke_round_trip() {
    let h = Harness::new().with_admins(&[ADMIN_A, ADMIN_B]).await;

    // Registration.
    let welcome = h.text(USER, "/start").await;
    assert!(welcome.contains("phone"));
    assert_eq!(h.status_of(USER).await, SubscriberStatus::WaitingForPhone);

    // Phone submission normalizes the local form.
    let instructions = h.text(USER, "0911223344").await;
    assert!(instructions.contains("500"));
    assert_eq!(
        h.status_of(USER).await,
        SubscriberStatus::PendingConfirmation
    );
    let stored = h
        .subscribers
        .load(SubscriberId::new(USER))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.phone.unwrap().as_str(), "+251911223344");

    // Payment confirmation fans out to every admin.
    h.button(USER, ButtonAction::Confirm).await;
    assert_eq!(h.status_of(USER).await, SubscriberStatus::PendingAdminReview);
    assert_eq!(h.notifier.sent_to(SubscriberId::new(ADMIN_A)).len(), 1);
    assert_eq!(h.notifier.sent_to(SubscriberId::new(ADMIN_B)).len(), 1);

    // Approval issues a single-use invite and delivers it.
    let approved = h
        .button(ADMIN_A, ButtonAction::Approve(SubscriberId::new(USER)))
        .await;
    assert!(approved.contains("Approved"));
    assert_eq!(h.status_of(USER).await, SubscriberStatus::Approved);
    let stored = h
        .subscribers
        .load(SubscriberId::new(USER))
        .await
        .unwrap()
        .unwrap();
    assert!(stored.invite_token.is_some());

    let inbox = h.notifier.sent_to(SubscriberId::new(USER));
    assert!(inbox
        .iter()
        .any(|reply| reply.text.contains("approved")));

    // Revocation removes the member and clears the token.
    h.notifier
        .set_membership(SubscriberId::new(USER), MembershipState::Member);
    let revoked = h
        .button(ADMIN_B, ButtonAction::Revoke(SubscriberId::new(USER)))
        .await;
    assert!(revoked.contains("Revoked"));
    assert_eq!(h.status_of(USER).await, SubscriberStatus::Rejected);
    assert_eq!(
        h.notifier.removed_members(),
        vec![SubscriberId::new(USER)]
    );
    let stored = h
        .subscribers
        .load(SubscriberId::new(USER))
        .await
        .unwrap()
        .unwrap();
    assert!(stored.invite_token.is_none());

    // A rejected subscriber can start over.
    h.text(USER, "/start").await;
    assert_eq!(h.status_of(USER).await, SubscriberStatus::WaitingForPhone);
}

#[tokio::test]
async fn phone_shapes_normalize_to_the_same_canonical_form() {
    for raw in ["0911223344", "+251911223344", "251911223344"] {
        let h = Harness::new().with_admins(&[ADMIN_A]).await;
        h.text(USER, "/start").await;
        h.text(USER, raw).await;

        let stored = h
            .subscribers
            .load(SubscriberId::new(USER))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            stored.phone.unwrap().as_str(),
            "+251911223344",
            "raw input {:?}",
            raw
        );
    }
}

#[tokio::test]
async fn rejection_notifies_the_subscriber_and_allows_restart() {
    let h = Harness::new().with_admins(&[ADMIN_A]).await;
    h.text(USER, "/start").await;
    h.text(USER, "0911223344").await;
    h.button(USER, ButtonAction::Confirm).await;

    h.button(ADMIN_A, ButtonAction::Reject(SubscriberId::new(USER)))
        .await;
    assert_eq!(h.status_of(USER).await, SubscriberStatus::Rejected);

    let status = h.text(USER, "/status").await;
    assert!(status.contains("/start"));

    h.text(USER, "/start").await;
    assert_eq!(h.status_of(USER).await, SubscriberStatus::WaitingForPhone);
}

#[tokio::test]
async fn duplicate_decisions_warn_instead_of_corrupting_state() {
    let h = Harness::new().with_admins(&[ADMIN_A, ADMIN_B]).await;
    h.text(USER, "/start").await;
    h.text(USER, "0911223344").await;
    h.button(USER, ButtonAction::Confirm).await;

    h.button(ADMIN_A, ButtonAction::Approve(SubscriberId::new(USER)))
        .await;
    // The second admin's click lands after the decision was made.
    let late = h
        .button(ADMIN_B, ButtonAction::Reject(SubscriberId::new(USER)))
        .await;
    assert!(late.contains("Warning"));
    assert_eq!(h.status_of(USER).await, SubscriberStatus::Approved);
}

#[tokio::test]
async fn non_admins_cannot_operate_the_gate() {
    let h = Harness::new().with_admins(&[ADMIN_A]).await;
    h.text(USER, "/start").await;
    h.text(USER, "0911223344").await;
    h.button(USER, ButtonAction::Confirm).await;

    // A subscriber pressing a leaked decision button gets refused.
    let refused = h
        .button(USER, ButtonAction::Approve(SubscriberId::new(USER)))
        .await;
    assert!(refused.contains("not authorized"));
    assert_eq!(h.status_of(USER).await, SubscriberStatus::PendingAdminReview);

    let refused = h.text(USER, "/pending").await;
    assert!(refused.contains("not authorized"));
}

#[tokio::test]
async fn reports_reflect_lifecycle_progress() {
    let h = Harness::new().with_admins(&[ADMIN_A]).await;
    for id in [1, 2, 3] {
        h.text(id, "/start").await;
        h.text(id, "0911223344").await;
        h.button(id, ButtonAction::Confirm).await;
    }
    h.button(ADMIN_A, ButtonAction::Approve(SubscriberId::new(2)))
        .await;

    let pending = h.text(ADMIN_A, "/pending").await;
    assert!(pending.starts_with("2 subscriber(s)"));
    assert!(pending.contains("3 ever registered"));

    let approved = h.text(ADMIN_A, "/approved").await;
    assert!(approved.starts_with("1 subscriber(s)"));
}

#[tokio::test]
async fn guided_settings_flow_configures_the_gate() {
    let h = Harness::new().with_admins(&[ADMIN_A]).await;

    h.text(ADMIN_A, "/setchannel").await;
    h.text(ADMIN_A, "-1009876543210").await;
    h.text(ADMIN_A, "/setamount").await;
    h.text(ADMIN_A, "750").await;
    h.text(ADMIN_A, "/setphone").await;
    h.text(ADMIN_A, "0911000000").await;

    let settings = h.registry.settings().await.unwrap();
    assert_eq!(settings.channel_id, Some(ChannelId::new(-1009876543210)));
    assert_eq!(settings.payment_amount, Some(750));
    assert_eq!(settings.payment_phone.unwrap().as_str(), "+251911000000");

    // The new amount shows up in the next subscriber's instructions.
    h.text(USER, "/start").await;
    let instructions = h.text(USER, "0911223344").await;
    assert!(instructions.contains("750"));
}

#[tokio::test]
async fn approve_without_configured_channel_is_refused_cleanly() {
    let h = Harness::new();
    h.registry.add_admin(AdminId::new(ADMIN_A)).await.unwrap();

    h.text(USER, "/start").await;
    h.text(USER, "0911223344").await;
    h.button(USER, ButtonAction::Confirm).await;

    let reply = h
        .button(ADMIN_A, ButtonAction::Approve(SubscriberId::new(USER)))
        .await;
    assert!(reply.contains("Not configured"));
    // The record is untouched and can be approved once configured.
    assert_eq!(h.status_of(USER).await, SubscriberStatus::PendingAdminReview);
}

#[tokio::test]
async fn invite_issuance_failure_aborts_the_approval() {
    let h = Harness::new().with_admins(&[ADMIN_A]).await;
    h.text(USER, "/start").await;
    h.text(USER, "0911223344").await;
    h.button(USER, ButtonAction::Confirm).await;

    h.notifier.fail_create_invite(true);
    let reply = h
        .button(ADMIN_A, ButtonAction::Approve(SubscriberId::new(USER)))
        .await;
    assert!(reply.contains("went wrong"));
    assert_eq!(h.status_of(USER).await, SubscriberStatus::PendingAdminReview);

    // A retry after the upstream recovers succeeds.
    h.notifier.fail_create_invite(false);
    h.button(ADMIN_A, ButtonAction::Approve(SubscriberId::new(USER)))
        .await;
    assert_eq!(h.status_of(USER).await, SubscriberStatus::Approved);
}
