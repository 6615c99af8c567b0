use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use super::{ArticleRepo, RepoError, UserRepo};
use crate::articles::repo_types::{Article, NewArticle};
use crate::users::repo_types::{NewUser, User};

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn map_write_err(e: sqlx::Error) -> RepoError {
    if let sqlx::Error::Database(db) = &e {
        if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return RepoError::EmailTaken;
        }
    }
    RepoError::Database(e)
}

#[async_trait]
impl UserRepo for PgStore {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, last_name, email, password_hash, is_admin, avatar_key, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, last_name, email, password_hash, is_admin, avatar_key, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, RepoError> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, last_name, email, password_hash, is_admin, avatar_key, created_at
            FROM users
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_user(&self, new: NewUser) -> Result<User, RepoError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, last_name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, last_name, email, password_hash, is_admin, avatar_key, created_at
            "#,
        )
        .bind(&new.name)
        .bind(&new.last_name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_err)
    }

    async fn save_user(&self, user: &User) -> Result<bool, RepoError> {
        let res = sqlx::query(
            r#"
            UPDATE users
               SET name = $2, last_name = $3, email = $4, password_hash = $5,
                   is_admin = $6, avatar_key = $7
             WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .bind(&user.avatar_key)
        .execute(&self.pool)
        .await
        .map_err(map_write_err)?;
        Ok(res.rows_affected() == 1)
    }

    async fn set_avatar_key(&self, id: Uuid, key: &str) -> Result<bool, RepoError> {
        let res = sqlx::query("UPDATE users SET avatar_key = $2 WHERE id = $1")
            .bind(id)
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn set_password_hash(
        &self,
        id: Uuid,
        new_hash: &str,
        expected: &str,
    ) -> Result<bool, RepoError> {
        let res = sqlx::query(
            r#"
            UPDATE users
               SET password_hash = $2
             WHERE id = $1 AND password_hash = $3
            "#,
        )
        .bind(id)
        .bind(new_hash)
        .bind(expected)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, RepoError> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() == 1)
    }
}

#[async_trait]
impl ArticleRepo for PgStore {
    async fn find_article_by_id(&self, id: Uuid) -> Result<Option<Article>, RepoError> {
        let article = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, title, description, url_font, user_id, created_at
            FROM articles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(article)
    }

    async fn list_articles(&self) -> Result<Vec<Article>, RepoError> {
        let rows = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, title, description, url_font, user_id, created_at
            FROM articles
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_articles_by_user(&self, user_id: Uuid) -> Result<Vec<Article>, RepoError> {
        let rows = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, title, description, url_font, user_id, created_at
            FROM articles
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_article(&self, new: NewArticle) -> Result<Article, RepoError> {
        let article = sqlx::query_as::<_, Article>(
            r#"
            INSERT INTO articles (title, description, url_font, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, url_font, user_id, created_at
            "#,
        )
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.url_font)
        .bind(new.user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(article)
    }

    async fn save_article(&self, article: &Article) -> Result<bool, RepoError> {
        let res = sqlx::query(
            r#"
            UPDATE articles
               SET title = $2, description = $3, url_font = $4, user_id = $5
             WHERE id = $1
            "#,
        )
        .bind(article.id)
        .bind(&article.title)
        .bind(&article.description)
        .bind(&article.url_font)
        .bind(article.user_id)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn delete_article(&self, id: Uuid) -> Result<bool, RepoError> {
        let res = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() == 1)
    }
}
