use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use crate::notes::repo_types::{NewNote, Note, NoteFilter, NotePatch};

const NOTE_COLUMNS: &str =
    "id, owner_id, folder_id, title, content, tags, is_todo, is_completed, created_at, updated_at";

/// Notes matching the filter, newest first.
pub async fn list(db: &PgPool, filter: NoteFilter) -> anyhow::Result<Vec<Note>> {
    let sql = format!(
        r#"
        SELECT {NOTE_COLUMNS}
          FROM notes
         WHERE owner_id = $1
           AND ($2::uuid IS NULL OR folder_id = $2)
           AND ($3::bool IS NULL OR is_todo = $3)
         ORDER BY created_at DESC, id
        "#
    );
    let rows = sqlx::query_as::<_, Note>(&sql)
        .bind(filter.owner_id)
        .bind(filter.folder_id)
        .bind(filter.is_todo)
        .fetch_all(db)
        .await
        .context("list notes")?;
    Ok(rows)
}

pub async fn find(db: &PgPool, note_id: Uuid) -> anyhow::Result<Option<Note>> {
    let sql = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1");
    let row = sqlx::query_as::<_, Note>(&sql)
        .bind(note_id)
        .fetch_optional(db)
        .await
        .context("find note")?;
    Ok(row)
}

pub async fn insert(db: &PgPool, owner_id: Uuid, new: &NewNote) -> anyhow::Result<Note> {
    let sql = format!(
        r#"
        INSERT INTO notes (id, owner_id, folder_id, title, content, tags, is_todo)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {NOTE_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, Note>(&sql)
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(new.folder_id)
        .bind(&new.title)
        .bind(&new.content)
        .bind(&new.tags)
        .bind(new.is_todo)
        .fetch_one(db)
        .await
        .context("insert note")?;
    Ok(row)
}

pub async fn update(db: &PgPool, note_id: Uuid, patch: &NotePatch) -> anyhow::Result<Option<Note>> {
    let sql = format!(
        r#"
        UPDATE notes
           SET title        = COALESCE($2, title),
               content      = COALESCE($3, content),
               tags         = COALESCE($4, tags),
               is_todo      = COALESCE($5, is_todo),
               is_completed = COALESCE($6, is_completed),
               updated_at   = now()
         WHERE id = $1
        RETURNING {NOTE_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, Note>(&sql)
        .bind(note_id)
        .bind(&patch.title)
        .bind(&patch.content)
        .bind(&patch.tags)
        .bind(patch.is_todo)
        .bind(patch.is_completed)
        .fetch_optional(db)
        .await
        .context("update note")?;
    Ok(row)
}

pub async fn delete(db: &PgPool, note_id: Uuid) -> anyhow::Result<bool> {
    let deleted = sqlx::query(r#"DELETE FROM notes WHERE id = $1"#)
        .bind(note_id)
        .execute(db)
        .await
        .context("delete note")?
        .rows_affected();
    Ok(deleted > 0)
}
