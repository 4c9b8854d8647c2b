use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use notely_shared::errors::AppResult;
use notely_shared::middleware::{ApiJson, ApiQuery};
use notely_shared::types::auth::AuthUser;
use notely_shared::types::ApiResponse;

use super::MessageResponse;
use crate::models::Note;
use crate::services::note_service::{parse_note_id, CreateNoteInput, NoteList, NoteQuery, UpdateNoteInput};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct NoteResponse {
    pub note: Note,
}

fn wrap(note: Note) -> Json<ApiResponse<NoteResponse>> {
    Json(ApiResponse::ok(NoteResponse { note }))
}

pub async fn list_notes(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<NoteQuery>,
) -> AppResult<Json<ApiResponse<NoteList>>> {
    let list = state.notes.list(user.id, query).await?;
    Ok(Json(ApiResponse::ok(list)))
}

pub async fn create_note(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateNoteInput>,
) -> AppResult<(StatusCode, Json<ApiResponse<NoteResponse>>)> {
    let note = state.notes.create(user.id, req).await?;
    Ok((StatusCode::CREATED, wrap(note)))
}

pub async fn get_note(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<NoteResponse>>> {
    let note = state.notes.get(user.id, parse_note_id(&id)?).await?;
    Ok(wrap(note))
}

pub async fn update_note(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateNoteInput>,
) -> AppResult<Json<ApiResponse<NoteResponse>>> {
    let note = state.notes.update(user.id, parse_note_id(&id)?, req).await?;
    Ok(wrap(note))
}

pub async fn delete_note(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<MessageResponse>>> {
    state.notes.delete(user.id, parse_note_id(&id)?).await?;
    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "note deleted successfully",
    })))
}

pub async fn toggle_pin(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<NoteResponse>>> {
    let note = state.notes.toggle_pin(user.id, parse_note_id(&id)?).await?;
    Ok(wrap(note))
}

pub async fn toggle_archive(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<NoteResponse>>> {
    let note = state.notes.toggle_archive(user.id, parse_note_id(&id)?).await?;
    Ok(wrap(note))
}
