use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    access,
    auth::{AuthUser, User},
    error::AppError,
    state::AppState,
    store::Store,
};

#[derive(Debug, Serialize)]
pub struct ChildSummary {
    pub id: Uuid,
    pub username: String,
}

impl From<User> for ChildSummary {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/children", get(list_children))
}

/// Children whose parent is the caller.
pub async fn children_of(store: &dyn Store, caller: &AuthUser) -> Result<Vec<User>, AppError> {
    access::require_parent(caller)?;
    Ok(store.list_children(caller.user_id).await?)
}

#[instrument(skip(state))]
pub async fn list_children(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<Vec<ChildSummary>>, AppError> {
    let children = children_of(state.store.as_ref(), &caller).await?;
    Ok(Json(children.into_iter().map(ChildSummary::from).collect()))
}
