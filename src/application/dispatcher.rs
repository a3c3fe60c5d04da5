//! Event dispatcher - classifies one inbound event and routes it.
//!
//! Each event is handled to completion before the next one for the
//! same chat; the dispatcher holds no locks and keeps no per-event
//! state. Command strings are resolved into a closed enum exactly once
//! here; handlers never re-parse text. Errors never escape: every
//! [`GateError`] is mapped to a user-facing reply per the propagation
//! policy.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::config::GateConfig;
use crate::domain::foundation::{AdminId, SubscriberId};
use crate::domain::session::PendingSetting;
use crate::domain::subscriber::SubscriberStatus;
use crate::ports::{Notifier, StateStore};

use super::handlers::registration::{
    ConfirmHandler, StartHandler, StatusQueryHandler, SubmitPhoneHandler,
};
use super::handlers::reports::{ListByStateHandler, SweepExpiredHandler};
use super::handlers::review::{ApproveHandler, RejectHandler, RevokeHandler};
use super::handlers::settings::{ApplySettingHandler, BeginSettingHandler};
use super::{
    ButtonAction, GateError, RegistryStore, Reply, SessionStore, SubscriberStore,
};

/// Chat commands, resolved once at the dispatcher boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Status,
    Pending,
    Approved,
    Sweep,
    SetChannel,
    SetAmount,
    SetPhone,
    Cancel,
}

impl Command {
    /// Parses a leading-slash command; `None` for unknown commands.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "/start" => Some(Command::Start),
            "/status" => Some(Command::Status),
            "/pending" => Some(Command::Pending),
            "/approved" => Some(Command::Approved),
            "/sweep" => Some(Command::Sweep),
            "/setchannel" => Some(Command::SetChannel),
            "/setamount" => Some(Command::SetAmount),
            "/setphone" => Some(Command::SetPhone),
            "/cancel" => Some(Command::Cancel),
            _ => None,
        }
    }

    /// True if only admins may run this command.
    fn is_admin_only(&self) -> bool {
        matches!(
            self,
            Command::Pending
                | Command::Approved
                | Command::Sweep
                | Command::SetChannel
                | Command::SetAmount
                | Command::SetPhone
        )
    }
}

/// Payload of one inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPayload {
    /// A free-text message (commands included; classified here).
    Text(String),
    /// A pressed action button.
    Button(ButtonAction),
}

/// One external interaction entering the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub sender: SubscriberId,
    pub payload: EventPayload,
}

impl InboundEvent {
    pub fn text(sender: SubscriberId, text: impl Into<String>) -> Self {
        Self {
            sender,
            payload: EventPayload::Text(text.into()),
        }
    }

    pub fn button(sender: SubscriberId, action: ButtonAction) -> Self {
        Self {
            sender,
            payload: EventPayload::Button(action),
        }
    }
}

/// Routes inbound events to the handlers.
pub struct Dispatcher {
    registry: RegistryStore,
    sessions: SessionStore,
    subscribers: SubscriberStore,
    start: StartHandler,
    submit_phone: SubmitPhoneHandler,
    confirm: ConfirmHandler,
    status_query: StatusQueryHandler,
    approve: ApproveHandler,
    reject: RejectHandler,
    revoke: RevokeHandler,
    list_by_state: ListByStateHandler,
    sweep: SweepExpiredHandler,
    begin_setting: BeginSettingHandler,
    apply_setting: ApplySettingHandler,
    sweep_max_age: Duration,
}

impl Dispatcher {
    /// Wires every handler over the two ports with default timing.
    pub fn new(store: Arc<dyn StateStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_config(store, notifier, &GateConfig::default())
    }

    /// Wires every handler with the configured timing knobs.
    pub fn with_config(
        store: Arc<dyn StateStore>,
        notifier: Arc<dyn Notifier>,
        config: &GateConfig,
    ) -> Self {
        let subscribers = SubscriberStore::with_ttl(store.clone(), config.subscriber_ttl());
        let sessions = SessionStore::with_ttl(store.clone(), config.session_ttl());
        let registry = RegistryStore::new(store);

        let revoke = RevokeHandler::new(
            subscribers.clone(),
            registry.clone(),
            notifier.clone(),
        );

        Self {
            start: StartHandler::new(subscribers.clone(), registry.clone(), notifier.clone()),
            submit_phone: SubmitPhoneHandler::new(subscribers.clone(), registry.clone()),
            confirm: ConfirmHandler::new(subscribers.clone(), registry.clone(), notifier.clone()),
            status_query: StatusQueryHandler::new(subscribers.clone()),
            approve: ApproveHandler::new(subscribers.clone(), registry.clone(), notifier.clone()),
            reject: RejectHandler::new(subscribers.clone(), notifier.clone()),
            list_by_state: ListByStateHandler::new(
                subscribers.clone(),
                registry.clone(),
                notifier,
            ),
            sweep: SweepExpiredHandler::new(subscribers.clone(), revoke.clone()),
            begin_setting: BeginSettingHandler::new(sessions.clone()),
            apply_setting: ApplySettingHandler::new(sessions.clone(), registry.clone()),
            revoke,
            registry,
            sessions,
            subscribers,
            sweep_max_age: config.sweep_max_age(),
        }
    }

    /// Handles one event to completion and returns the reply for the
    /// sender. Never fails outward.
    pub async fn dispatch(&self, event: InboundEvent) -> Reply {
        let sender = event.sender;
        let is_admin = self.sender_is_admin(sender).await;
        debug!(%sender, is_admin, ?event.payload, "dispatching event");

        let result = match event.payload {
            EventPayload::Text(text) => self.dispatch_text(sender, is_admin, &text).await,
            EventPayload::Button(action) => {
                self.dispatch_button(sender, is_admin, action).await
            }
        };

        result.unwrap_or_else(|err| Self::error_reply(err))
    }

    /// Role check. A store failure reads as "not admin": the gate
    /// fails closed, matching the empty-admin-set rule.
    async fn sender_is_admin(&self, sender: SubscriberId) -> bool {
        match self.registry.is_admin(AdminId::new(sender.as_i64())).await {
            Ok(is_admin) => is_admin,
            Err(err) => {
                warn!(%sender, %err, "admin lookup failed; treating sender as non-admin");
                false
            }
        }
    }

    async fn dispatch_text(
        &self,
        sender: SubscriberId,
        is_admin: bool,
        text: &str,
    ) -> Result<Reply, GateError> {
        if text.trim_start().starts_with('/') {
            return match Command::parse(text) {
                Some(command) => self.dispatch_command(sender, is_admin, command).await,
                None => Ok(Self::help_reply(is_admin)),
            };
        }

        // An admin's free text feeds a live guided flow first.
        if is_admin {
            if let Some(reply) = self
                .apply_setting
                .handle(AdminId::new(sender.as_i64()), text)
                .await?
            {
                return Ok(reply);
            }
        }

        // Otherwise route by the sender's registration state.
        match self.subscribers.load(sender).await?.map(|s| s.status) {
            Some(
                SubscriberStatus::WaitingForPhone
                | SubscriberStatus::PendingConfirmation
                | SubscriberStatus::PendingAdminReview,
            ) => self.submit_phone.handle(sender, text).await,
            _ => Ok(Reply::text("Send /start to begin an access request.")),
        }
    }

    async fn dispatch_command(
        &self,
        sender: SubscriberId,
        is_admin: bool,
        command: Command,
    ) -> Result<Reply, GateError> {
        if command.is_admin_only() && !is_admin {
            return Ok(Self::not_authorized());
        }
        let admin = AdminId::new(sender.as_i64());

        match command {
            Command::Start => self.start.handle(sender).await,
            Command::Status => self.status_query.handle(sender).await,
            Command::Pending => {
                self.list_by_state
                    .handle(SubscriberStatus::PendingAdminReview)
                    .await
            }
            Command::Approved => self.list_by_state.handle(SubscriberStatus::Approved).await,
            Command::Sweep => Ok(self.sweep.handle(self.sweep_max_age).await?.to_reply()),
            Command::SetChannel => {
                self.begin_setting
                    .handle(admin, PendingSetting::GateChannel)
                    .await
            }
            Command::SetAmount => {
                self.begin_setting
                    .handle(admin, PendingSetting::PaymentAmount)
                    .await
            }
            Command::SetPhone => {
                self.begin_setting
                    .handle(admin, PendingSetting::PaymentPhone)
                    .await
            }
            Command::Cancel => {
                if is_admin {
                    self.sessions.cancel(admin).await?;
                }
                Ok(Reply::text("Cancelled."))
            }
        }
    }

    async fn dispatch_button(
        &self,
        sender: SubscriberId,
        is_admin: bool,
        action: ButtonAction,
    ) -> Result<Reply, GateError> {
        match action {
            ButtonAction::Confirm => self.confirm.handle(sender).await,
            ButtonAction::Approve(target) => {
                if !is_admin {
                    return Ok(Self::not_authorized());
                }
                self.approve.handle(target).await
            }
            ButtonAction::Reject(target) => {
                if !is_admin {
                    return Ok(Self::not_authorized());
                }
                self.reject.handle(target).await
            }
            ButtonAction::Revoke(target) => {
                if !is_admin {
                    return Ok(Self::not_authorized());
                }
                Ok(self.revoke.handle(target).await?.to_reply())
            }
        }
    }

    /// Maps a handler error to a user-facing reply.
    fn error_reply(err: GateError) -> Reply {
        match err {
            GateError::Validation(err) => Reply::text(format!("{} Please try again.", err)),
            GateError::InvalidTransition(err) => Reply::text(format!("Warning: {}.", err)),
            GateError::UnknownSubscriber(id) => {
                Reply::text(format!("No access request on record for {}.", id))
            }
            GateError::MissingConfiguration(setting) => Reply::text(format!(
                "Not configured yet: {}. Set it before retrying.",
                setting
            )),
            GateError::Upstream(reason) => {
                error!(%reason, "request aborted by upstream failure");
                Reply::text("Something went wrong. Please try again.")
            }
        }
    }

    fn not_authorized() -> Reply {
        Reply::text("You are not authorized to do that.")
    }

    fn help_reply(is_admin: bool) -> Reply {
        let mut text = String::from("Unknown command. Available: /start, /status");
        if is_admin {
            text.push_str(
                ", /pending, /approved, /sweep, /setchannel, /setamount, /setphone, /cancel",
            );
        }
        Reply::text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryStateStore, RecordingNotifier};
    use crate::domain::foundation::ChannelId;
    use crate::ports::MembershipState;

    struct Fixture {
        dispatcher: Dispatcher,
        registry: RegistryStore,
        subscribers: SubscriberStore,
        notifier: Arc<RecordingNotifier>,
    }

    fn fixture() -> Fixture {
        let store: Arc<dyn StateStore> = Arc::new(InMemoryStateStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        Fixture {
            dispatcher: Dispatcher::new(store.clone(), notifier.clone()),
            registry: RegistryStore::new(store.clone()),
            subscribers: SubscriberStore::new(store),
            notifier,
        }
    }

    const ADMIN: i64 = 9000;
    const USER: i64 = 1;

    async fn with_admin(fx: &Fixture) {
        fx.registry.add_admin(AdminId::new(ADMIN)).await.unwrap();
        fx.registry
            .save_settings(&crate::domain::registry::GateSettings {
                channel_id: Some(ChannelId::new(-100)),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    #[test]
    fn command_parse_covers_the_closed_set() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse(" /sweep "), Some(Command::Sweep));
        assert_eq!(Command::parse("/unknown"), None);
        assert_eq!(Command::parse("hello"), None);
    }

    #[tokio::test]
    async fn unknown_command_yields_help() {
        let fx = fixture();
        let reply = fx
            .dispatcher
            .dispatch(InboundEvent::text(SubscriberId::new(USER), "/frobnicate"))
            .await;
        assert!(reply.text.contains("Unknown command"));
    }

    #[tokio::test]
    async fn admin_commands_from_non_admin_are_refused() {
        let fx = fixture();
        with_admin(&fx).await;
        for cmd in ["/pending", "/approved", "/sweep", "/setchannel"] {
            let reply = fx
                .dispatcher
                .dispatch(InboundEvent::text(SubscriberId::new(USER), cmd))
                .await;
            assert!(
                reply.text.contains("not authorized"),
                "{} should be refused",
                cmd
            );
        }
    }

    #[tokio::test]
    async fn empty_admin_set_refuses_everyone() {
        let fx = fixture();
        let reply = fx
            .dispatcher
            .dispatch(InboundEvent::text(SubscriberId::new(ADMIN), "/pending"))
            .await;
        assert!(reply.text.contains("not authorized"));
    }

    #[tokio::test]
    async fn decision_buttons_from_non_admin_are_refused() {
        let fx = fixture();
        with_admin(&fx).await;
        let target = SubscriberId::new(USER);
        for action in [
            ButtonAction::Approve(target),
            ButtonAction::Reject(target),
            ButtonAction::Revoke(target),
        ] {
            let reply = fx
                .dispatcher
                .dispatch(InboundEvent::button(SubscriberId::new(USER), action))
                .await;
            assert!(reply.text.contains("not authorized"));
        }
    }

    #[tokio::test]
    async fn free_text_in_waiting_state_is_a_phone_submission() {
        let fx = fixture();
        let user = SubscriberId::new(USER);
        fx.dispatcher.dispatch(InboundEvent::text(user, "/start")).await;

        let reply = fx
            .dispatcher
            .dispatch(InboundEvent::text(user, "0911223344"))
            .await;
        assert!(!reply.buttons.is_empty());

        let sub = fx.subscribers.load(user).await.unwrap().unwrap();
        assert_eq!(sub.status, SubscriberStatus::PendingConfirmation);
    }

    #[tokio::test]
    async fn invalid_phone_becomes_a_polite_validation_reply() {
        let fx = fixture();
        let user = SubscriberId::new(USER);
        fx.dispatcher.dispatch(InboundEvent::text(user, "/start")).await;

        let reply = fx
            .dispatcher
            .dispatch(InboundEvent::text(user, "call me maybe"))
            .await;
        assert!(reply.text.contains("Please try again"));

        let sub = fx.subscribers.load(user).await.unwrap().unwrap();
        assert_eq!(sub.status, SubscriberStatus::WaitingForPhone);
    }

    #[tokio::test]
    async fn free_text_from_stranger_points_to_start() {
        let fx = fixture();
        let reply = fx
            .dispatcher
            .dispatch(InboundEvent::text(SubscriberId::new(USER), "hello"))
            .await;
        assert!(reply.text.contains("/start"));
    }

    #[tokio::test]
    async fn admin_guided_flow_consumes_free_text() {
        let fx = fixture();
        with_admin(&fx).await;
        let admin = SubscriberId::new(ADMIN);

        let prompt = fx
            .dispatcher
            .dispatch(InboundEvent::text(admin, "/setamount"))
            .await;
        assert!(prompt.text.contains("amount"));

        let confirmation = fx
            .dispatcher
            .dispatch(InboundEvent::text(admin, "750"))
            .await;
        assert!(confirmation.text.contains("750"));

        let settings = fx.registry.settings().await.unwrap();
        assert_eq!(settings.payment_amount, Some(750));
    }

    #[tokio::test]
    async fn cancel_clears_a_live_guided_flow() {
        let fx = fixture();
        with_admin(&fx).await;
        let admin = SubscriberId::new(ADMIN);

        fx.dispatcher
            .dispatch(InboundEvent::text(admin, "/setamount"))
            .await;
        fx.dispatcher
            .dispatch(InboundEvent::text(admin, "/cancel"))
            .await;

        // Free text no longer feeds the flow.
        let reply = fx.dispatcher.dispatch(InboundEvent::text(admin, "750")).await;
        assert!(!reply.text.contains("Payment amount"));
        assert_eq!(fx.registry.settings().await.unwrap().payment_amount, None);
    }

    #[tokio::test]
    async fn full_lifecycle_through_the_dispatcher() {
        let fx = fixture();
        with_admin(&fx).await;
        let user = SubscriberId::new(USER);
        let admin = SubscriberId::new(ADMIN);

        fx.dispatcher.dispatch(InboundEvent::text(user, "/start")).await;
        fx.dispatcher
            .dispatch(InboundEvent::text(user, "0911223344"))
            .await;
        fx.dispatcher
            .dispatch(InboundEvent::button(user, ButtonAction::Confirm))
            .await;

        // The admin got a review notification.
        assert_eq!(fx.notifier.sent_to(admin).len(), 1);

        let reply = fx
            .dispatcher
            .dispatch(InboundEvent::button(admin, ButtonAction::Approve(user)))
            .await;
        assert!(reply.text.contains("Approved"));

        let sub = fx.subscribers.load(user).await.unwrap().unwrap();
        assert_eq!(sub.status, SubscriberStatus::Approved);
        assert!(sub.invite_token.is_some());

        fx.notifier.set_membership(user, MembershipState::Member);
        let reply = fx
            .dispatcher
            .dispatch(InboundEvent::button(admin, ButtonAction::Revoke(user)))
            .await;
        assert!(reply.text.contains("Revoked"));

        let sub = fx.subscribers.load(user).await.unwrap().unwrap();
        assert_eq!(sub.status, SubscriberStatus::Rejected);
        assert!(sub.invite_token.is_none());
    }

    #[tokio::test]
    async fn duplicate_approve_button_is_a_warning_not_a_fault() {
        let fx = fixture();
        with_admin(&fx).await;
        let user = SubscriberId::new(USER);
        let admin = SubscriberId::new(ADMIN);

        fx.dispatcher.dispatch(InboundEvent::text(user, "/start")).await;
        fx.dispatcher
            .dispatch(InboundEvent::text(user, "0911223344"))
            .await;
        fx.dispatcher
            .dispatch(InboundEvent::button(user, ButtonAction::Confirm))
            .await;
        fx.dispatcher
            .dispatch(InboundEvent::button(admin, ButtonAction::Approve(user)))
            .await;

        let second = fx
            .dispatcher
            .dispatch(InboundEvent::button(admin, ButtonAction::Approve(user)))
            .await;
        assert!(second.text.contains("Warning"));
    }

    #[tokio::test]
    async fn approve_button_for_unknown_target_reports_no_record() {
        let fx = fixture();
        with_admin(&fx).await;
        let reply = fx
            .dispatcher
            .dispatch(InboundEvent::button(
                SubscriberId::new(ADMIN),
                ButtonAction::Approve(SubscriberId::new(404)),
            ))
            .await;
        assert!(reply.text.contains("No access request on record"));
    }
}
