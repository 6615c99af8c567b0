//! Persistence collaborator.
//!
//! Services only see the [`UserRepo`] and [`ArticleRepo`] traits. Every write is
//! a single SQL statement, so a write either commits as a whole or not at all.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::articles::repo_types::{Article, NewArticle};
use crate::users::repo_types::{NewUser, User};

#[cfg(test)]
pub mod memory;
mod postgres;

pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("email already registered")]
    EmailTaken,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;
    /// Exact, case-sensitive match.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
    async fn list_users(&self) -> Result<Vec<User>, RepoError>;
    async fn insert_user(&self, new: NewUser) -> Result<User, RepoError>;
    /// Overwrites every mutable column. Returns `false` if the row is gone.
    async fn save_user(&self, user: &User) -> Result<bool, RepoError>;
    /// Writes only `avatar_key`. Returns `false` if the row is gone.
    async fn set_avatar_key(&self, id: Uuid, key: &str) -> Result<bool, RepoError>;
    /// Swaps the password hash only while the stored one still equals
    /// `expected`. Returns `false` if the row is gone or the hash moved on.
    async fn set_password_hash(
        &self,
        id: Uuid,
        new_hash: &str,
        expected: &str,
    ) -> Result<bool, RepoError>;
    /// Deletes the user and, through the foreign key, the user's articles.
    async fn delete_user(&self, id: Uuid) -> Result<bool, RepoError>;
}

#[async_trait]
pub trait ArticleRepo: Send + Sync {
    async fn find_article_by_id(&self, id: Uuid) -> Result<Option<Article>, RepoError>;
    async fn list_articles(&self) -> Result<Vec<Article>, RepoError>;
    async fn list_articles_by_user(&self, user_id: Uuid) -> Result<Vec<Article>, RepoError>;
    async fn insert_article(&self, new: NewArticle) -> Result<Article, RepoError>;
    async fn save_article(&self, article: &Article) -> Result<bool, RepoError>;
    async fn delete_article(&self, id: Uuid) -> Result<bool, RepoError>;
}
