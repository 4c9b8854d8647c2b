use axum::extract::State;
use axum::Json;
use std::sync::Arc;

use notely_shared::errors::AppResult;
use notely_shared::middleware::ApiJson;
use notely_shared::types::ApiResponse;

use super::MessageResponse;
use crate::services::auth_service::SendOtpInput;
use crate::AppState;

pub async fn send_otp(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SendOtpInput>,
) -> AppResult<Json<ApiResponse<MessageResponse>>> {
    let message = state.auth.send_otp(req).await?;
    Ok(Json(ApiResponse::ok(MessageResponse { message })))
}
