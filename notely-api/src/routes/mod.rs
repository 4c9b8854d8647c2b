pub mod health;
pub mod login;
pub mod me;
pub mod notes;
pub mod oauth;
pub mod register;
pub mod send_otp;
pub mod tags;
pub mod verify_otp;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use notely_shared::errors::AppError;
use notely_shared::middleware::metrics_middleware;

use crate::AppState;

const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

async fn unknown_route() -> AppError {
    AppError::not_found("route not found")
}

pub fn router(state: Arc<AppState>) -> Router {
    let auth = Router::new()
        .route("/signup", post(register::signup))
        .route("/login", post(login::login))
        .route("/send-otp", post(send_otp::send_otp))
        .route("/verify-otp", post(verify_otp::verify_otp))
        .route("/google", post(oauth::google_login))
        .route("/me", get(me::me));

    let notes = Router::new()
        .route("/", get(notes::list_notes).post(notes::create_note))
        .route(
            "/:id",
            get(notes::get_note).put(notes::update_note).delete(notes::delete_note),
        )
        .route("/:id/pin", post(notes::toggle_pin))
        .route("/:id/archive", post(notes::toggle_archive));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        .nest("/api/auth", auth)
        .nest("/api/notes", notes)
        .route("/api/tags", get(tags::list_tags))
        .fallback(unknown_route)
        .layer(axum::middleware::from_fn(metrics_middleware))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
