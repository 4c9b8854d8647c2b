//! Fixtures shared by unit and router tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use notely_shared::clients::email::EmailError;

use crate::clock::Clock;
use crate::config::{AppConfig, StorageMode};
use crate::services::identity::{ExternalIdentity, IdentityError, IdentityVerifier};
use crate::services::notifier::Notifier;
use crate::store::Stores;
use crate::AppState;

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Captures outgoing notifications instead of sending them.
#[derive(Default)]
pub struct RecordingNotifier {
    codes: Mutex<HashMap<String, String>>,
    welcomes: Mutex<Vec<String>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn last_code(&self, email: &str) -> Option<String> {
        self.codes.lock().unwrap().get(email).cloned()
    }

    pub fn welcomes(&self) -> Vec<String> {
        self.welcomes.lock().unwrap().clone()
    }

    pub fn fail_deliveries(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_otp(&self, to: &str, code: &str, _ttl_minutes: i64) -> Result<(), EmailError> {
        self.codes.lock().unwrap().insert(to.to_string(), code.to_string());
        if self.failing.load(Ordering::SeqCst) {
            return Err(EmailError::NotConfigured);
        }
        Ok(())
    }

    async fn send_welcome(&self, to: &str, _name: &str) -> Result<(), EmailError> {
        self.welcomes.lock().unwrap().push(to.to_string());
        Ok(())
    }
}

/// Never finishes a delivery, like a mail API that stops answering.
pub struct StalledNotifier;

#[async_trait]
impl Notifier for StalledNotifier {
    async fn send_otp(&self, _to: &str, _code: &str, _ttl_minutes: i64) -> Result<(), EmailError> {
        std::future::pending().await
    }

    async fn send_welcome(&self, _to: &str, _name: &str) -> Result<(), EmailError> {
        std::future::pending().await
    }
}

/// Accepts only tokens registered up front.
#[derive(Default)]
pub struct StubVerifier {
    identities: Mutex<HashMap<String, ExternalIdentity>>,
}

impl StubVerifier {
    pub fn register(&self, token: &str, identity: ExternalIdentity) {
        self.identities.lock().unwrap().insert(token.to_string(), identity);
    }
}

#[async_trait]
impl IdentityVerifier for StubVerifier {
    async fn verify(&self, token: &str) -> Result<ExternalIdentity, IdentityError> {
        self.identities
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or_else(|| IdentityError::Rejected("unknown token".into()))
    }
}

pub struct Harness {
    pub state: Arc<AppState>,
    pub stores: Stores,
    pub clock: Arc<ManualClock>,
    pub notifier: Arc<RecordingNotifier>,
    pub identity: Arc<StubVerifier>,
}

/// Settings for tests: in-memory storage and cheap password hashing.
pub fn test_config() -> AppConfig {
    AppConfig {
        storage: StorageMode::Memory,
        jwt_secret: "test-secret".into(),
        argon2_memory_kib: 8,
        argon2_iterations: 1,
        argon2_parallelism: 1,
        ..AppConfig::default()
    }
}

pub fn harness() -> Harness {
    let config = test_config();
    let stores = Stores::in_memory();
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let notifier = Arc::new(RecordingNotifier::default());
    let identity = Arc::new(StubVerifier::default());

    let state = AppState::new(
        config,
        stores.clone(),
        notifier.clone(),
        identity.clone(),
        clock.clone(),
    )
    .unwrap();

    Harness {
        state: Arc::new(state),
        stores,
        clock,
        notifier,
        identity,
    }
}
