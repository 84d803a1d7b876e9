use crate::auth::repo_types::{NewUser, Role, User};
use sqlx::PgPool;
use uuid::Uuid;

impl User {
    /// Find a user by username.
    pub async fn find_by_username(db: &PgPool, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, role, email, parent_id, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, role, email, parent_id, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Whether a parent account already uses this email.
    pub async fn parent_email_exists(db: &PgPool, email: &str) -> anyhow::Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"SELECT EXISTS (SELECT 1 FROM users WHERE email = $1 AND role = $2)"#,
        )
        .bind(email)
        .bind(Role::Parent)
        .fetch_one(db)
        .await?;
        Ok(exists)
    }

    /// Create a new user with an already hashed password.
    pub async fn create(db: &PgPool, new: &NewUser) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, password_hash, role, email, parent_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, username, password_hash, role, email, parent_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.username)
        .bind(&new.password_hash)
        .bind(new.role)
        .bind(&new.email)
        .bind(new.parent_id)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Children linked to a parent, ordered by username.
    pub async fn list_children(db: &PgPool, parent_id: Uuid) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, role, email, parent_id, created_at
            FROM users
            WHERE parent_id = $1 AND role = $2
            ORDER BY username ASC
            "#,
        )
        .bind(parent_id)
        .bind(Role::Child)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
