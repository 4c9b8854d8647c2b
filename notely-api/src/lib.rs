pub mod clock;
pub mod config;
pub mod models;
pub mod routes;
pub mod schema;
pub mod services;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusHandle;

use notely_shared::errors::AppResult;
use notely_shared::session::{SessionIssuer, SessionState};

use clock::Clock;
use config::AppConfig;
use services::auth_service::AuthService;
use services::identity::IdentityVerifier;
use services::note_service::NoteService;
use services::notifier::Notifier;
use services::password::CredentialHasher;
use store::{StorageKind, Stores};

pub struct AppState {
    pub config: AppConfig,
    pub auth: AuthService,
    pub notes: NoteService,
    pub sessions: SessionIssuer,
    pub storage: StorageKind,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        stores: Stores,
        notifier: Arc<dyn Notifier>,
        identity: Arc<dyn IdentityVerifier>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        let sessions = SessionIssuer::new(&config.jwt_secret, config.session_ttl_secs);
        let hasher = CredentialHasher::new(
            config.argon2_memory_kib,
            config.argon2_iterations,
            config.argon2_parallelism,
        )?;

        let auth = AuthService::new(
            stores.users.clone(),
            stores.otps.clone(),
            sessions.clone(),
            hasher,
            notifier,
            identity,
            clock.clone(),
        )?
        .with_otp_policy(config.otp_ttl_secs, config.otp_max_attempts)
        .with_delivery_timeout(Duration::from_secs(config.email_timeout_secs));
        let notes = NoteService::new(stores.notes.clone(), clock);

        Ok(Self {
            config,
            auth,
            notes,
            sessions,
            storage: stores.kind,
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

impl SessionState for AppState {
    fn sessions(&self) -> &SessionIssuer {
        &self.sessions
    }
}
