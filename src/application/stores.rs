//! Typed repositories over the raw state store port.
//!
//! These own the key scheme and serialization for every record the
//! core persists. A value that fails to deserialize is treated as
//! absent (fail-open to the default, logged) rather than poisoning the
//! flow; the store's TTL is a cleanup optimization, never a
//! state-machine signal.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::domain::foundation::{AdminId, SubscriberId};
use crate::domain::registry::{AdminSet, GateSettings, UserRegistry};
use crate::domain::session::{AdminSession, SESSION_TTL};
use crate::domain::subscriber::Subscriber;
use crate::ports::StateStore;

use super::GateError;

const SUBSCRIBER_PREFIX: &str = "subscriber:";
const SESSION_PREFIX: &str = "session:";
const ADMINS_KEY: &str = "registry:admins";
const USERS_KEY: &str = "registry:users";
const SETTINGS_KEY: &str = "settings:gate";

/// Cleanup TTL applied to subscriber records on every write.
const SUBSCRIBER_TTL: Duration = Duration::from_secs(180 * 24 * 3600);

fn decode<T: DeserializeOwned>(key: &str, value: Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            warn!(key, %err, "undecodable record treated as absent");
            None
        }
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Value, GateError> {
    serde_json::to_value(value).map_err(|err| GateError::Upstream(err.to_string()))
}

/// Repository for subscriber records.
#[derive(Clone)]
pub struct SubscriberStore {
    store: Arc<dyn StateStore>,
    ttl: Duration,
}

impl SubscriberStore {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self::with_ttl(store, SUBSCRIBER_TTL)
    }

    /// Overrides the default record retention.
    pub fn with_ttl(store: Arc<dyn StateStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    fn key(id: SubscriberId) -> String {
        format!("{}{}", SUBSCRIBER_PREFIX, id)
    }

    /// Loads a subscriber record, treating undecodable data as absent.
    pub async fn load(&self, id: SubscriberId) -> Result<Option<Subscriber>, GateError> {
        let key = Self::key(id);
        Ok(self
            .store
            .get(&key)
            .await?
            .and_then(|value| decode(&key, value)))
    }

    /// Writes a subscriber record, refreshing the cleanup TTL.
    pub async fn save(&self, subscriber: &Subscriber) -> Result<(), GateError> {
        self.store
            .put(
                &Self::key(subscriber.id),
                encode(subscriber)?,
                Some(self.ttl),
            )
            .await?;
        Ok(())
    }

    /// Lists every stored subscriber record.
    ///
    /// This is the only O(n)-over-all-subscribers operation in the
    /// core; it backs batch reports, not the interactive path.
    pub async fn list_all(&self) -> Result<Vec<Subscriber>, GateError> {
        let keys = self.store.list_keys(SUBSCRIBER_PREFIX).await?;
        let mut subscribers = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(value) = self.store.get(&key).await? {
                if let Some(subscriber) = decode::<Subscriber>(&key, value) {
                    subscribers.push(subscriber);
                }
            }
        }
        Ok(subscribers)
    }
}

/// Repository for per-admin pending-command sessions.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn StateStore>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self::with_ttl(store, SESSION_TTL)
    }

    /// Overrides the default session lifetime.
    pub fn with_ttl(store: Arc<dyn StateStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    fn key(admin: AdminId) -> String {
        format!("{}{}", SESSION_PREFIX, admin)
    }

    /// Starts a guided flow, overwriting any prior session (last
    /// writer wins).
    pub async fn begin(&self, admin: AdminId, session: AdminSession) -> Result<(), GateError> {
        self.store
            .put(&Self::key(admin), encode(&session)?, Some(self.ttl))
            .await?;
        Ok(())
    }

    /// Consumes the admin's session: read, then delete.
    ///
    /// Two concurrent consumes for the same admin is a benign race
    /// under single-threaded-per-chat delivery.
    pub async fn take(&self, admin: AdminId) -> Result<Option<AdminSession>, GateError> {
        let key = Self::key(admin);
        let session = self
            .store
            .get(&key)
            .await?
            .and_then(|value| decode(&key, value));
        if session.is_some() {
            self.store.delete(&key).await?;
        }
        Ok(session)
    }

    /// Abandons the admin's session unconditionally.
    pub async fn cancel(&self, admin: AdminId) -> Result<(), GateError> {
        self.store.delete(&Self::key(admin)).await?;
        Ok(())
    }
}

/// Repository for the deployment-wide singleton records.
#[derive(Clone)]
pub struct RegistryStore {
    store: Arc<dyn StateStore>,
}

impl RegistryStore {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    /// Loads the admin set; absent means nobody is admin (fails closed).
    pub async fn admins(&self) -> Result<AdminSet, GateError> {
        Ok(self
            .store
            .get(ADMINS_KEY)
            .await?
            .and_then(|value| decode(ADMINS_KEY, value))
            .unwrap_or_default())
    }

    /// Returns true if the id is a provisioned admin.
    pub async fn is_admin(&self, id: AdminId) -> Result<bool, GateError> {
        Ok(self.admins().await?.contains(id))
    }

    /// Provisions an admin. Intended for out-of-band bootstrap.
    pub async fn add_admin(&self, id: AdminId) -> Result<(), GateError> {
        let mut admins = self.admins().await?;
        admins.add(id);
        self.store.put(ADMINS_KEY, encode(&admins)?, None).await?;
        Ok(())
    }

    /// Loads the gate settings, defaulting every value to unset.
    pub async fn settings(&self) -> Result<GateSettings, GateError> {
        Ok(self
            .store
            .get(SETTINGS_KEY)
            .await?
            .and_then(|value| decode(SETTINGS_KEY, value))
            .unwrap_or_default())
    }

    /// Persists the gate settings.
    pub async fn save_settings(&self, settings: &GateSettings) -> Result<(), GateError> {
        self.store
            .put(SETTINGS_KEY, encode(settings)?, None)
            .await?;
        Ok(())
    }

    /// Records a subscriber id in the append-only user registry.
    pub async fn record_user(&self, id: SubscriberId) -> Result<(), GateError> {
        let mut registry = self.user_registry().await?;
        if registry.record(id) {
            self.store.put(USERS_KEY, encode(&registry)?, None).await?;
        }
        Ok(())
    }

    /// Loads the user registry (reporting only).
    pub async fn user_registry(&self) -> Result<UserRegistry, GateError> {
        Ok(self
            .store
            .get(USERS_KEY)
            .await?
            .and_then(|value| decode(USERS_KEY, value))
            .unwrap_or_default())
    }
}
