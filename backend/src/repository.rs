//! Storage access for users and their group permissions.
//!
//! Handlers never talk to the pool directly; they go through `AuthService`,
//! which holds an `Arc<dyn UserRepository>`. Emails reaching this layer are
//! already trimmed and lower-cased.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::Result,
    models::user::{NewUser, User},
};

pub type DynUserRepository = Arc<dyn UserRepository>;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User>;

    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn get_by_id(&self, id: i32) -> Result<Option<User>>;

    /// Inserts a password-less account owned by the Google provider.
    async fn create_oauth_user(&self, first_name: &str, last_name: &str, email: &str)
        -> Result<User>;

    /// Permission codes granted to the user's group. Empty when the user has
    /// no group or does not exist.
    async fn get_group_permissions(&self, user_id: i32) -> Result<Vec<String>>;

    async fn list(&self) -> Result<Vec<User>>;
}

const USER_COLUMNS: &str =
    "id, first_name, last_name, email, password_hash, provider, group_id, created_at, updated_at";

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> Result<User> {
        let sql = format!(
            "INSERT INTO auth.users (first_name, last_name, email, password_hash, provider) \
             VALUES ($1, $2, lower($3), $4, 'local') \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM auth.users WHERE lower(email) = lower($1)");
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM auth.users WHERE id = $1");
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create_oauth_user(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> Result<User> {
        let sql = format!(
            "INSERT INTO auth.users (first_name, last_name, email, password_hash, provider) \
             VALUES ($1, $2, lower($3), NULL, 'google') \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(first_name)
            .bind(last_name)
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_group_permissions(&self, user_id: i32) -> Result<Vec<String>> {
        let codes = sqlx::query_scalar::<_, String>(
            r#"
            SELECT p.code
            FROM auth.users u
            JOIN auth.group_permissions gp ON gp.group_id = u.group_id
            JOIN auth.permissions p ON p.id = gp.permission_id
            WHERE u.id = $1
            ORDER BY p.code
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(codes)
    }

    async fn list(&self) -> Result<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM auth.users ORDER BY created_at DESC, id DESC");
        let rows = sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }
}
