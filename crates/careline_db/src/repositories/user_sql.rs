//! SQL implementation of the user repository

use crate::error::DbError;
use crate::repositories::user::{NewUser, User, UserRepository};
use crate::DbClient;
use async_trait::async_trait;
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error, info};

#[derive(Debug, Clone)]
pub struct SqlUserRepository {
    db_client: DbClient,
}

impl SqlUserRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

fn user_from_row(row: &AnyRow) -> Result<User, DbError> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
    })
}

#[async_trait]
impl UserRepository for SqlUserRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing user schema");

        let query = r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL
            )
        "#;
        self.db_client.execute(query).await?;

        info!("User schema initialized successfully");
        Ok(())
    }

    async fn create(&self, user: NewUser) -> Result<User, DbError> {
        debug!("Creating user: {}", user.username);

        let query = r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, password_hash
        "#;

        let row = sqlx::query(query)
            .bind(&user.username)
            .bind(&user.password_hash)
            .fetch_one(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to insert user: {}", e);
                DbError::from_write(e)
            })?;

        user_from_row(&row)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        debug!("Finding user: {}", username);

        let query = r#"
            SELECT id, username, password_hash
            FROM users
            WHERE username = $1
        "#;

        let result = sqlx::query(query)
            .bind(username)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to find user: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        result.as_ref().map(user_from_row).transpose()
    }
}
