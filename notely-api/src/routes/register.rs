use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use notely_shared::errors::AppResult;
use notely_shared::middleware::ApiJson;
use notely_shared::types::ApiResponse;

use crate::services::auth_service::{AuthSession, SignupInput};
use crate::AppState;

pub async fn signup(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SignupInput>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthSession>>)> {
    let session = state.auth.signup(req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(session))))
}
