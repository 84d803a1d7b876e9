use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use super::Store;
use crate::auth::repo_types::{NewUser, User};
use crate::folders::{repo as folders_repo, repo_types::Folder};
use crate::notes::{
    repo as notes_repo,
    repo_types::{NewNote, Note, NoteFilter, NotePatch},
};

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { db })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .context("run migrations")?;
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.db)
            .await
            .context("ping database")?;
        Ok(())
    }

    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        User::find_by_username(&self.db, username).await
    }

    async fn find_user_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        User::find_by_id(&self.db, id).await
    }

    async fn parent_email_exists(&self, email: &str) -> anyhow::Result<bool> {
        User::parent_email_exists(&self.db, email).await
    }

    async fn create_user(&self, new: NewUser) -> anyhow::Result<User> {
        User::create(&self.db, &new).await
    }

    async fn list_children(&self, parent_id: Uuid) -> anyhow::Result<Vec<User>> {
        User::list_children(&self.db, parent_id).await
    }

    async fn list_folders(&self, owner_id: Uuid) -> anyhow::Result<Vec<Folder>> {
        folders_repo::list_by_owner(&self.db, owner_id).await
    }

    async fn find_folder(&self, id: Uuid) -> anyhow::Result<Option<Folder>> {
        folders_repo::find(&self.db, id).await
    }

    async fn create_folder(&self, owner_id: Uuid, name: &str) -> anyhow::Result<Folder> {
        folders_repo::insert(&self.db, owner_id, name).await
    }

    async fn delete_folder(&self, id: Uuid) -> anyhow::Result<bool> {
        folders_repo::delete_detaching_notes(&self.db, id).await
    }

    async fn list_notes(&self, filter: NoteFilter) -> anyhow::Result<Vec<Note>> {
        notes_repo::list(&self.db, filter).await
    }

    async fn find_note(&self, id: Uuid) -> anyhow::Result<Option<Note>> {
        notes_repo::find(&self.db, id).await
    }

    async fn create_note(&self, owner_id: Uuid, new: NewNote) -> anyhow::Result<Note> {
        notes_repo::insert(&self.db, owner_id, &new).await
    }

    async fn update_note(&self, id: Uuid, patch: NotePatch) -> anyhow::Result<Option<Note>> {
        notes_repo::update(&self.db, id, &patch).await
    }

    async fn delete_note(&self, id: Uuid) -> anyhow::Result<bool> {
        notes_repo::delete(&self.db, id).await
    }
}
