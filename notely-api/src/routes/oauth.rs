use axum::extract::State;
use axum::Json;
use std::sync::Arc;

use notely_shared::errors::AppResult;
use notely_shared::middleware::ApiJson;
use notely_shared::types::ApiResponse;

use crate::services::auth_service::{AuthSession, GoogleLoginInput};
use crate::AppState;

/// Sign in with a Google ID token obtained by the client.
pub async fn google_login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<GoogleLoginInput>,
) -> AppResult<Json<ApiResponse<AuthSession>>> {
    let session = state.auth.google_login(req).await?;
    Ok(Json(ApiResponse::ok(session)))
}
