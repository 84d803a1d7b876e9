use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::AppError,
    extract::{AppJson, AppPath},
    state::AppState,
};

use super::dto::{CreateFolderRequest, FolderResponse};
use super::services;

pub fn folder_routes() -> Router<AppState> {
    Router::new()
        .route("/folders", get(list_folders).post(create_folder))
        .route("/folders/:id", delete(delete_folder))
}

#[instrument(skip(state))]
pub async fn list_folders(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<Vec<FolderResponse>>, AppError> {
    let folders = services::list(state.store.as_ref(), &caller).await?;
    Ok(Json(folders.into_iter().map(FolderResponse::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_folder(
    State(state): State<AppState>,
    caller: AuthUser,
    AppJson(payload): AppJson<CreateFolderRequest>,
) -> Result<(StatusCode, Json<FolderResponse>), AppError> {
    let folder = services::create(state.store.as_ref(), &caller, &payload.name).await?;
    Ok((StatusCode::CREATED, Json(folder.into())))
}

#[instrument(skip(state))]
pub async fn delete_folder(
    State(state): State<AppState>,
    caller: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    services::delete(state.store.as_ref(), &caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
