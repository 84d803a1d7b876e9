use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{NewNote, Note, NotePatch};

/// `GET /notes` query. Absent parameters mean "no filter".
#[derive(Debug, Default, Deserialize)]
pub struct NoteListQuery {
    pub child_id: Option<Uuid>,
    pub folder_id: Option<Uuid>,
    pub is_todo: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub is_todo: bool,
    #[serde(default)]
    pub folder_id: Option<Uuid>,
}

impl From<CreateNoteRequest> for NewNote {
    fn from(r: CreateNoteRequest) -> Self {
        Self {
            title: r.title,
            content: r.content,
            tags: r.tags,
            is_todo: r.is_todo,
            folder_id: r.folder_id,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<String>,
    pub is_todo: Option<bool>,
    pub is_completed: Option<bool>,
}

impl From<UpdateNoteRequest> for NotePatch {
    fn from(r: UpdateNoteRequest) -> Self {
        Self {
            title: r.title,
            content: r.content,
            tags: r.tags,
            is_todo: r.is_todo,
            is_completed: r.is_completed,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NoteResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub tags: String,
    pub is_todo: bool,
    pub is_completed: bool,
    pub folder_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Note> for NoteResponse {
    fn from(n: Note) -> Self {
        Self {
            id: n.id,
            title: n.title,
            content: n.content,
            tags: n.tags,
            is_todo: n.is_todo,
            is_completed: n.is_completed,
            folder_id: n.folder_id,
            created_at: n.created_at,
            updated_at: n.updated_at,
        }
    }
}
