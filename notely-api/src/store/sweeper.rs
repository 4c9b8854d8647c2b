//! Periodic purge of expired OTP entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::OtpStore;
use crate::clock::Clock;

const MIN_PERIOD: Duration = Duration::from_secs(1);

/// Background task that deletes expired OTP entries on a fixed interval
/// until [`OtpSweeper::shutdown`] is called.
pub struct OtpSweeper {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl OtpSweeper {
    /// Periods shorter than one second are raised to one second.
    pub fn spawn(store: Arc<dyn OtpStore>, clock: Arc<dyn Clock>, period: Duration) -> Self {
        let period = period.max(MIN_PERIOD);
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            tracing::info!(interval_ms = period.as_millis() as u64, "otp sweeper started");
            let mut interval = tokio::time::interval(period);

            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        tracing::info!("otp sweeper stopping");
                        break;
                    }
                    _ = interval.tick() => {
                        sweep_once(store.as_ref(), clock.as_ref()).await;
                    }
                }
            }
        });

        Self { cancel, handle }
    }

    /// Stop the loop and wait for the task to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            tracing::error!(error = %e, "otp sweeper task panicked");
        }
    }
}

/// One purge pass. Failures are logged and retried on the next tick.
pub async fn sweep_once(store: &dyn OtpStore, clock: &dyn Clock) -> u64 {
    match store.purge_expired(clock.now()).await {
        Ok(0) => {
            tracing::debug!("otp sweep: nothing to purge");
            0
        }
        Ok(purged) => {
            metrics::counter!("otp_purged_total").increment(purged);
            tracing::info!(purged, "otp sweep: purged expired codes");
            purged
        }
        Err(e) => {
            tracing::error!(error = %e, "otp sweep failed");
            0
        }
    }
}
