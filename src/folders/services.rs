use tracing::{info, warn};
use uuid::Uuid;

use crate::access;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::folders::repo_types::Folder;
use crate::store::Store;

pub async fn list(store: &dyn Store, caller: &AuthUser) -> Result<Vec<Folder>, AppError> {
    access::require_child(caller)?;
    Ok(store.list_folders(caller.user_id).await?)
}

pub async fn create(store: &dyn Store, caller: &AuthUser, name: &str) -> Result<Folder, AppError> {
    access::require_child(caller)?;

    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Folder name must not be empty".into()));
    }
    if store
        .list_folders(caller.user_id)
        .await?
        .iter()
        .any(|f| f.name == name)
    {
        warn!(user_id = %caller.user_id, %name, "duplicate folder name");
        return Err(AppError::DuplicateFolderName);
    }

    let folder = store
        .create_folder(caller.user_id, name)
        .await
        .map_err(AppError::from_store)?;
    info!(user_id = %caller.user_id, folder_id = %folder.id, "folder created");
    Ok(folder)
}

/// Delete a folder; its notes stay and lose their folder.
pub async fn delete(store: &dyn Store, caller: &AuthUser, folder_id: Uuid) -> Result<(), AppError> {
    access::owned_folder(store, caller, folder_id).await?;
    if !store.delete_folder(folder_id).await? {
        return Err(AppError::NotFound("Folder"));
    }
    info!(user_id = %caller.user_id, %folder_id, "folder deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::repo_types::{NewNote, NoteFilter};
    use crate::store::MemoryStore;
    use crate::test_support::Family;

    #[tokio::test]
    async fn children_only_see_their_own_folders() {
        let store = MemoryStore::new();
        let f = Family::create(&store).await;
        create(&store, &f.kid_a, "School").await.unwrap();
        create(&store, &f.kid_b, "Personal").await.unwrap();

        let names: Vec<String> = list(&store, &f.kid_a)
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["School"]);
    }

    #[tokio::test]
    async fn parents_cannot_list_or_create_folders() {
        let store = MemoryStore::new();
        let f = Family::create(&store).await;
        assert!(matches!(list(&store, &f.parent).await, Err(AppError::Forbidden(_))));
        assert!(matches!(
            create(&store, &f.parent, "Mine").await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn rejects_blank_and_duplicate_names() {
        let store = MemoryStore::new();
        let f = Family::create(&store).await;
        assert!(matches!(
            create(&store, &f.kid_a, "   ").await,
            Err(AppError::Validation(_))
        ));
        create(&store, &f.kid_a, "Ideas").await.unwrap();
        assert!(matches!(
            create(&store, &f.kid_a, " Ideas ").await,
            Err(AppError::DuplicateFolderName)
        ));
        // another child may reuse the name
        create(&store, &f.kid_b, "Ideas").await.unwrap();
    }

    #[tokio::test]
    async fn delete_keeps_notes_and_rejects_siblings() {
        let store = MemoryStore::new();
        let f = Family::create(&store).await;
        let folder = create(&store, &f.kid_a, "To-Do").await.unwrap();
        store
            .create_note(
                f.kid_a.user_id,
                NewNote {
                    title: "Gift List".into(),
                    content: "Buy gifts".into(),
                    tags: "family,gifts".into(),
                    is_todo: true,
                    folder_id: Some(folder.id),
                },
            )
            .await
            .unwrap();

        assert!(matches!(
            delete(&store, &f.kid_b, folder.id).await,
            Err(AppError::Forbidden(_))
        ));
        delete(&store, &f.kid_a, folder.id).await.unwrap();
        assert!(matches!(
            delete(&store, &f.kid_a, folder.id).await,
            Err(AppError::NotFound(_))
        ));

        let notes = store.list_notes(NoteFilter::owner(f.kid_a.user_id)).await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].folder_id, None);
    }
}
