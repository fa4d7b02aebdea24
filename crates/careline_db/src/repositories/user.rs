//! Repository for user accounts

use crate::error::DbError;
use async_trait::async_trait;

pub use careline_common::models::{NewUser, User};

/// Storage for user accounts. Usernames are unique.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create the `users` table if it doesn't exist.
    async fn init_schema(&self) -> Result<(), DbError>;

    /// Insert a user.
    ///
    /// Fails with [`DbError::UniqueViolation`] when the username is taken.
    async fn create(&self, user: NewUser) -> Result<User, DbError>;

    /// Look up a user by exact username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DbError>;
}
