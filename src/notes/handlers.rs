use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::AppError,
    extract::{AppJson, AppPath, AppQuery},
    state::AppState,
};

use super::dto::{CreateNoteRequest, NoteListQuery, NoteResponse, UpdateNoteRequest};
use super::services;

pub fn note_routes() -> Router<AppState> {
    Router::new()
        .route("/notes", get(list_notes).post(create_note))
        .route("/notes/:id", put(update_note).delete(delete_note))
}

#[instrument(skip(state))]
pub async fn list_notes(
    State(state): State<AppState>,
    caller: AuthUser,
    AppQuery(query): AppQuery<NoteListQuery>,
) -> Result<Json<Vec<NoteResponse>>, AppError> {
    let notes = services::list(state.store.as_ref(), &caller, query).await?;
    Ok(Json(notes.into_iter().map(NoteResponse::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_note(
    State(state): State<AppState>,
    caller: AuthUser,
    AppJson(payload): AppJson<CreateNoteRequest>,
) -> Result<(StatusCode, Json<NoteResponse>), AppError> {
    let note = services::create(state.store.as_ref(), &caller, payload.into()).await?;
    Ok((StatusCode::CREATED, Json(note.into())))
}

#[instrument(skip(state, payload))]
pub async fn update_note(
    State(state): State<AppState>,
    caller: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateNoteRequest>,
) -> Result<Json<NoteResponse>, AppError> {
    let note = services::update(state.store.as_ref(), &caller, id, payload.into()).await?;
    Ok(Json(note.into()))
}

#[instrument(skip(state))]
pub async fn delete_note(
    State(state): State<AppState>,
    caller: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    services::delete(state.store.as_ref(), &caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
