use std::sync::Arc;
use std::time::Duration;

use notely_api::clock::{Clock, SystemClock};
use notely_api::config::AppConfig;
use notely_api::services::identity::GoogleVerifier;
use notely_api::store::sweeper::OtpSweeper;
use notely_api::store::Stores;
use notely_api::{routes, AppState};
use notely_shared::clients::email::EmailClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    notely_shared::middleware::init_tracing("notely-api");

    let config = AppConfig::load()?;
    let port = config.port;

    let metrics_handle = notely_shared::middleware::init_metrics()?;

    let stores = Stores::from_config(&config)?;
    tracing::info!(storage = stores.kind.as_str(), "storage selected");

    let email = EmailClient::new(
        config.resend_api_key.clone(),
        config.from_email.clone(),
        config.from_name.clone(),
        config.app_url.clone(),
    )?;
    if !email.is_configured() {
        tracing::warn!("NOTELY__RESEND_API_KEY not set; OTP codes will only be logged");
    }
    let identity = GoogleVerifier::new(config.google_client_id.clone())?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let sweeper = OtpSweeper::spawn(
        stores.otps.clone(),
        clock.clone(),
        Duration::from_secs(config.otp_sweep_interval_secs),
    );

    let state = AppState::new(config, stores, Arc::new(email), Arc::new(identity), clock)?
        .with_metrics(metrics_handle);
    let app = routes::router(Arc::new(state));

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "notely-api starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.shutdown().await;
    tracing::info!("notely-api stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received SIGINT, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
