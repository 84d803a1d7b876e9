use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use crate::folders::repo_types::Folder;

pub async fn list_by_owner(db: &PgPool, owner_id: Uuid) -> anyhow::Result<Vec<Folder>> {
    let rows = sqlx::query_as::<_, Folder>(
        r#"
        SELECT id, owner_id, name, created_at
          FROM folders
         WHERE owner_id = $1
         ORDER BY name ASC
        "#,
    )
    .bind(owner_id)
    .fetch_all(db)
    .await
    .context("list folders by owner")?;
    Ok(rows)
}

pub async fn find(db: &PgPool, folder_id: Uuid) -> anyhow::Result<Option<Folder>> {
    let row = sqlx::query_as::<_, Folder>(
        r#"SELECT id, owner_id, name, created_at FROM folders WHERE id = $1"#,
    )
    .bind(folder_id)
    .fetch_optional(db)
    .await
    .context("find folder")?;
    Ok(row)
}

pub async fn insert(db: &PgPool, owner_id: Uuid, name: &str) -> anyhow::Result<Folder> {
    let row = sqlx::query_as::<_, Folder>(
        r#"
        INSERT INTO folders (id, owner_id, name)
        VALUES ($1, $2, $3)
        RETURNING id, owner_id, name, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(owner_id)
    .bind(name)
    .fetch_one(db)
    .await
    .context("insert folder")?;
    Ok(row)
}

/// Detach the folder's notes, then delete it. Returns false if no such folder.
pub async fn delete_detaching_notes(db: &PgPool, folder_id: Uuid) -> anyhow::Result<bool> {
    let mut tx = db.begin().await.context("begin tx")?;

    sqlx::query(r#"UPDATE notes SET folder_id = NULL, updated_at = now() WHERE folder_id = $1"#)
        .bind(folder_id)
        .execute(&mut *tx)
        .await
        .context("detach notes from folder")?;

    let deleted = sqlx::query(r#"DELETE FROM folders WHERE id = $1"#)
        .bind(folder_id)
        .execute(&mut *tx)
        .await
        .context("delete folder")?
        .rows_affected();

    tx.commit().await.context("commit tx")?;
    Ok(deleted > 0)
}
