use axum::extract::State;
use axum::Json;
use std::sync::Arc;

use notely_shared::errors::AppResult;
use notely_shared::middleware::ApiJson;
use notely_shared::types::ApiResponse;

use crate::services::auth_service::{AuthSession, LoginInput};
use crate::AppState;

pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginInput>,
) -> AppResult<Json<ApiResponse<AuthSession>>> {
    let session = state.auth.login(req).await?;
    Ok(Json(ApiResponse::ok(session)))
}
