//! Authorization predicates. Every note, folder and child lookup made on behalf
//! of a caller passes through here before a store is asked to read or write.

use tracing::warn;
use uuid::Uuid;

use crate::auth::{AuthUser, Role, User};
use crate::error::AppError;
use crate::folders::repo_types::Folder;
use crate::notes::repo_types::{Note, NoteFilter};
use crate::store::Store;

pub fn require_parent(caller: &AuthUser) -> Result<(), AppError> {
    if caller.is_parent() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Only parents can access this resource"))
    }
}

pub fn require_child(caller: &AuthUser) -> Result<(), AppError> {
    if caller.is_child() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Only children can modify notes and folders"))
    }
}

/// The caller's own child with the given id.
pub async fn own_child(
    store: &dyn Store,
    caller: &AuthUser,
    child_id: Uuid,
) -> Result<User, AppError> {
    require_parent(caller)?;
    match store.find_user_by_id(child_id).await? {
        Some(child) if child.role == Role::Child && child.parent_id == Some(caller.user_id) => {
            Ok(child)
        }
        _ => {
            warn!(parent_id = %caller.user_id, %child_id, "parent asked for a child that is not theirs");
            Err(AppError::Forbidden("Not your child"))
        }
    }
}

/// Folder `folder_id` if `owner_id` owns it, otherwise `Err(on_miss)`.
///
/// Missing and foreign folders are indistinguishable to the caller.
pub async fn folder_owned_by(
    store: &dyn Store,
    owner_id: Uuid,
    folder_id: Uuid,
    on_miss: AppError,
) -> Result<Folder, AppError> {
    match store.find_folder(folder_id).await? {
        Some(folder) if folder.owner_id == owner_id => Ok(folder),
        _ => Err(on_miss),
    }
}

/// Which notes `caller` may list, given the optional query parameters.
pub async fn note_scope(
    store: &dyn Store,
    caller: &AuthUser,
    child_id: Option<Uuid>,
    folder_id: Option<Uuid>,
    is_todo: Option<bool>,
) -> Result<NoteFilter, AppError> {
    let owner_id = match caller.role {
        Role::Child => {
            if child_id.is_some_and(|id| id != caller.user_id) {
                return Err(AppError::Forbidden("Children can only read their own notes"));
            }
            caller.user_id
        }
        Role::Parent => {
            let child_id = child_id
                .ok_or_else(|| AppError::Validation("child_id is required for parents".into()))?;
            own_child(store, caller, child_id).await?.id
        }
    };

    if let Some(folder_id) = folder_id {
        folder_owned_by(
            store,
            owner_id,
            folder_id,
            AppError::Forbidden("Folder does not belong to this user"),
        )
        .await?;
    }

    Ok(NoteFilter {
        owner_id,
        folder_id,
        is_todo,
    })
}

/// A note the caller may modify: caller is a child and owns it.
pub async fn owned_note(
    store: &dyn Store,
    caller: &AuthUser,
    note_id: Uuid,
) -> Result<Note, AppError> {
    require_child(caller)?;
    let note = store
        .find_note(note_id)
        .await?
        .ok_or(AppError::NotFound("Note"))?;
    if note.owner_id != caller.user_id {
        warn!(user_id = %caller.user_id, %note_id, "note owned by someone else");
        return Err(AppError::Forbidden("Not authorized"));
    }
    Ok(note)
}

/// A folder the caller may modify: caller is a child and owns it.
pub async fn owned_folder(
    store: &dyn Store,
    caller: &AuthUser,
    folder_id: Uuid,
) -> Result<Folder, AppError> {
    require_child(caller)?;
    let folder = store
        .find_folder(folder_id)
        .await?
        .ok_or(AppError::NotFound("Folder"))?;
    if folder.owner_id != caller.user_id {
        warn!(user_id = %caller.user_id, %folder_id, "folder owned by someone else");
        return Err(AppError::Forbidden("Not authorized"));
    }
    Ok(folder)
}
