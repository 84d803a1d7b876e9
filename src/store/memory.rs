use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreConflict, UniqueKey};
use crate::auth::repo_types::{NewUser, Role, User};
use crate::folders::repo_types::Folder;
use crate::notes::repo_types::{NewNote, Note, NoteFilter, NotePatch};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    folders: HashMap<Uuid, Folder>,
    // insertion order; listing walks it backwards for newest-first
    notes: Vec<Note>,
}

/// Process-local store used for tests, demos and `STORE_BACKEND=memory`.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn parent_email_exists(&self, email: &str) -> anyhow::Result<bool> {
        let t = self.tables.read().await;
        Ok(t.users
            .values()
            .any(|u| u.role == Role::Parent && u.email.as_deref() == Some(email)))
    }

    async fn create_user(&self, new: NewUser) -> anyhow::Result<User> {
        let mut t = self.tables.write().await;
        if t.users.values().any(|u| u.username == new.username) {
            return Err(StoreConflict::Unique(UniqueKey::Username).into());
        }
        if new.role == Role::Parent
            && t.users
                .values()
                .any(|u| u.role == Role::Parent && u.email.is_some() && u.email == new.email)
        {
            return Err(StoreConflict::Unique(UniqueKey::ParentEmail).into());
        }
        if let Some(parent_id) = new.parent_id {
            let parent_ok = t
                .users
                .get(&parent_id)
                .map(|p| p.role == Role::Parent)
                .unwrap_or(false);
            anyhow::ensure!(parent_ok, "parent {parent_id} does not exist");
        }
        let user = User {
            id: Uuid::new_v4(),
            username: new.username,
            password_hash: new.password_hash,
            role: new.role,
            email: new.email,
            parent_id: new.parent_id,
            created_at: OffsetDateTime::now_utc(),
        };
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn list_children(&self, parent_id: Uuid) -> anyhow::Result<Vec<User>> {
        let t = self.tables.read().await;
        let mut children: Vec<User> = t
            .users
            .values()
            .filter(|u| u.role == Role::Child && u.parent_id == Some(parent_id))
            .cloned()
            .collect();
        children.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(children)
    }

    async fn list_folders(&self, owner_id: Uuid) -> anyhow::Result<Vec<Folder>> {
        let t = self.tables.read().await;
        let mut folders: Vec<Folder> = t
            .folders
            .values()
            .filter(|f| f.owner_id == owner_id)
            .cloned()
            .collect();
        folders.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(folders)
    }

    async fn find_folder(&self, id: Uuid) -> anyhow::Result<Option<Folder>> {
        Ok(self.tables.read().await.folders.get(&id).cloned())
    }

    async fn create_folder(&self, owner_id: Uuid, name: &str) -> anyhow::Result<Folder> {
        let mut t = self.tables.write().await;
        if t.folders
            .values()
            .any(|f| f.owner_id == owner_id && f.name == name)
        {
            return Err(StoreConflict::Unique(UniqueKey::FolderName).into());
        }
        let folder = Folder {
            id: Uuid::new_v4(),
            owner_id,
            name: name.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        t.folders.insert(folder.id, folder.clone());
        Ok(folder)
    }

    async fn delete_folder(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut t = self.tables.write().await;
        if t.folders.remove(&id).is_none() {
            return Ok(false);
        }
        let now = OffsetDateTime::now_utc();
        for note in t.notes.iter_mut().filter(|n| n.folder_id == Some(id)) {
            note.folder_id = None;
            note.updated_at = now;
        }
        Ok(true)
    }

    async fn list_notes(&self, filter: NoteFilter) -> anyhow::Result<Vec<Note>> {
        let t = self.tables.read().await;
        Ok(t.notes
            .iter()
            .rev()
            .filter(|n| filter.matches(n))
            .cloned()
            .collect())
    }

    async fn find_note(&self, id: Uuid) -> anyhow::Result<Option<Note>> {
        let t = self.tables.read().await;
        Ok(t.notes.iter().find(|n| n.id == id).cloned())
    }

    async fn create_note(&self, owner_id: Uuid, new: NewNote) -> anyhow::Result<Note> {
        let mut t = self.tables.write().await;
        if let Some(folder_id) = new.folder_id {
            anyhow::ensure!(
                t.folders.contains_key(&folder_id),
                "folder {folder_id} does not exist"
            );
        }
        let now = OffsetDateTime::now_utc();
        let note = Note {
            id: Uuid::new_v4(),
            owner_id,
            folder_id: new.folder_id,
            title: new.title,
            content: new.content,
            tags: new.tags,
            is_todo: new.is_todo,
            is_completed: false,
            created_at: now,
            updated_at: now,
        };
        t.notes.push(note.clone());
        Ok(note)
    }

    async fn update_note(&self, id: Uuid, patch: NotePatch) -> anyhow::Result<Option<Note>> {
        let mut t = self.tables.write().await;
        let Some(note) = t.notes.iter_mut().find(|n| n.id == id) else {
            return Ok(None);
        };
        if let Some(title) = patch.title {
            note.title = title;
        }
        if let Some(content) = patch.content {
            note.content = content;
        }
        if let Some(tags) = patch.tags {
            note.tags = tags;
        }
        if let Some(is_todo) = patch.is_todo {
            note.is_todo = is_todo;
        }
        if let Some(is_completed) = patch.is_completed {
            note.is_completed = is_completed;
        }
        note.updated_at = OffsetDateTime::now_utc();
        Ok(Some(note.clone()))
    }

    async fn delete_note(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut t = self.tables.write().await;
        let before = t.notes.len();
        t.notes.retain(|n| n.id != id);
        Ok(t.notes.len() != before)
    }
}
