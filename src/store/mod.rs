use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, User};
use crate::folders::repo_types::Folder;
use crate::notes::repo_types::{NewNote, Note, NoteFilter, NotePatch};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Account, folder and note persistence.
///
/// Implementations do no authorization: callers go through `crate::access`
/// first and hand the store already-scoped ids and filters.
#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> anyhow::Result<()>;

    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
    async fn find_user_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn parent_email_exists(&self, email: &str) -> anyhow::Result<bool>;
    async fn create_user(&self, new: NewUser) -> anyhow::Result<User>;
    async fn list_children(&self, parent_id: Uuid) -> anyhow::Result<Vec<User>>;

    async fn list_folders(&self, owner_id: Uuid) -> anyhow::Result<Vec<Folder>>;
    async fn find_folder(&self, id: Uuid) -> anyhow::Result<Option<Folder>>;
    async fn create_folder(&self, owner_id: Uuid, name: &str) -> anyhow::Result<Folder>;
    /// Deletes the folder and sets `folder_id = NULL` on its notes.
    async fn delete_folder(&self, id: Uuid) -> anyhow::Result<bool>;

    async fn list_notes(&self, filter: NoteFilter) -> anyhow::Result<Vec<Note>>;
    async fn find_note(&self, id: Uuid) -> anyhow::Result<Option<Note>>;
    async fn create_note(&self, owner_id: Uuid, new: NewNote) -> anyhow::Result<Note>;
    async fn update_note(&self, id: Uuid, patch: NotePatch) -> anyhow::Result<Option<Note>>;
    async fn delete_note(&self, id: Uuid) -> anyhow::Result<bool>;
}

/// Unique constraint a write ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueKey {
    Username,
    ParentEmail,
    FolderName,
}

impl UniqueKey {
    /// Maps constraint names declared in `migrations/0001_init.sql`.
    fn from_constraint(name: &str) -> Option<Self> {
        match name {
            "users_username_key" => Some(Self::Username),
            "users_parent_email_idx" => Some(Self::ParentEmail),
            "folders_owner_name_key" => Some(Self::FolderName),
            _ => None,
        }
    }
}

/// Store errors that callers translate into domain errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreConflict {
    #[error("unique constraint violated: {0:?}")]
    Unique(UniqueKey),
}

/// Which unique constraint the error chain reports, either from Postgres or
/// from the in-memory store. Unknown Postgres constraints yield `None`.
pub fn unique_violation(err: &anyhow::Error) -> Option<UniqueKey> {
    err.chain().find_map(|cause| {
        if let Some(StoreConflict::Unique(key)) = cause.downcast_ref::<StoreConflict>() {
            return Some(*key);
        }
        cause
            .downcast_ref::<sqlx::Error>()
            .and_then(|e| e.as_database_error())
            .filter(|db| db.is_unique_violation())
            .and_then(|db| db.constraint())
            .and_then(UniqueKey::from_constraint)
    })
}
