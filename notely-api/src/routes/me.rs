use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use notely_shared::errors::AppResult;
use notely_shared::types::auth::AuthUser;
use notely_shared::types::ApiResponse;

use crate::models::UserProfile;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserProfile,
}

pub async fn me(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<MeResponse>>> {
    let profile = state.auth.current_user(user.id).await?;
    Ok(Json(ApiResponse::ok(MeResponse { user: profile })))
}
