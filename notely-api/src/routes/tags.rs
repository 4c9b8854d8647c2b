use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use notely_shared::errors::AppResult;
use notely_shared::types::auth::AuthUser;
use notely_shared::types::ApiResponse;

use crate::models::TagCount;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct TagsResponse {
    pub tags: Vec<TagCount>,
}

pub async fn list_tags(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<TagsResponse>>> {
    let tags = state.notes.tags(user.id).await?;
    Ok(Json(ApiResponse::ok(TagsResponse { tags })))
}
