use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Note record. Tags are opaque text.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Note {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub folder_id: Option<Uuid>,
    pub title: String,
    pub content: String,
    pub tags: String,
    pub is_todo: bool,
    pub is_completed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub tags: String,
    pub is_todo: bool,
    pub folder_id: Option<Uuid>,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<String>,
    pub is_todo: Option<bool>,
    pub is_completed: Option<bool>,
}

/// Already-authorized selection of notes: one owner, optionally narrowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteFilter {
    pub owner_id: Uuid,
    pub folder_id: Option<Uuid>,
    pub is_todo: Option<bool>,
}

impl NoteFilter {
    pub fn owner(owner_id: Uuid) -> Self {
        Self {
            owner_id,
            folder_id: None,
            is_todo: None,
        }
    }

    pub fn matches(&self, note: &Note) -> bool {
        note.owner_id == self.owner_id
            && self.folder_id.map_or(true, |f| note.folder_id == Some(f))
            && self.is_todo.map_or(true, |t| note.is_todo == t)
    }
}
