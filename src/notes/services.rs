use tracing::info;
use uuid::Uuid;

use crate::access;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::notes::dto::NoteListQuery;
use crate::notes::repo_types::{NewNote, Note, NotePatch};
use crate::store::Store;

pub async fn list(
    store: &dyn Store,
    caller: &AuthUser,
    query: NoteListQuery,
) -> Result<Vec<Note>, AppError> {
    let filter =
        access::note_scope(store, caller, query.child_id, query.folder_id, query.is_todo).await?;
    Ok(store.list_notes(filter).await?)
}

pub async fn create(store: &dyn Store, caller: &AuthUser, new: NewNote) -> Result<Note, AppError> {
    access::require_child(caller)?;

    if new.title.trim().is_empty() {
        return Err(AppError::Validation("Title must not be empty".into()));
    }
    if let Some(folder_id) = new.folder_id {
        access::folder_owned_by(
            store,
            caller.user_id,
            folder_id,
            AppError::InvalidReference("folder_id does not refer to one of your folders"),
        )
        .await?;
    }

    let note = store.create_note(caller.user_id, new).await?;
    info!(user_id = %caller.user_id, note_id = %note.id, folder_id = ?note.folder_id, "note created");
    Ok(note)
}

pub async fn update(
    store: &dyn Store,
    caller: &AuthUser,
    note_id: Uuid,
    patch: NotePatch,
) -> Result<Note, AppError> {
    access::owned_note(store, caller, note_id).await?;
    if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(AppError::Validation("Title must not be empty".into()));
    }

    let note = store
        .update_note(note_id, patch)
        .await?
        .ok_or(AppError::NotFound("Note"))?;
    info!(user_id = %caller.user_id, %note_id, "note updated");
    Ok(note)
}

pub async fn delete(store: &dyn Store, caller: &AuthUser, note_id: Uuid) -> Result<(), AppError> {
    access::owned_note(store, caller, note_id).await?;
    if !store.delete_note(note_id).await? {
        return Err(AppError::NotFound("Note"));
    }
    info!(user_id = %caller.user_id, %note_id, "note deleted");
    Ok(())
}
