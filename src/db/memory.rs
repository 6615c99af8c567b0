//! In-process store used by unit tests in place of Postgres.

use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{ArticleRepo, RepoError, UserRepo};
use crate::articles::repo_types::{Article, NewArticle};
use crate::users::repo_types::{NewUser, User};

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    articles: Mutex<Vec<Article>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn article_count(&self) -> usize {
        self.articles.lock().unwrap().len()
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, RepoError> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn insert_user(&self, new: NewUser) -> Result<User, RepoError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == new.email) {
            return Err(RepoError::EmailTaken);
        }
        let user = User {
            id: Uuid::new_v4(),
            name: new.name,
            last_name: new.last_name,
            email: new.email,
            password_hash: new.password_hash,
            is_admin: false,
            avatar_key: None,
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn save_user(&self, user: &User) -> Result<bool, RepoError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.id != user.id && u.email == user.email) {
            return Err(RepoError::EmailTaken);
        }
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(slot) => {
                *slot = user.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_avatar_key(&self, id: Uuid, key: &str) -> Result<bool, RepoError> {
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|u| u.id == id) {
            Some(slot) => {
                slot.avatar_key = Some(key.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_password_hash(
        &self,
        id: Uuid,
        new_hash: &str,
        expected: &str,
    ) -> Result<bool, RepoError> {
        let mut users = self.users.lock().unwrap();
        match users
            .iter_mut()
            .find(|u| u.id == id && u.password_hash == expected)
        {
            Some(slot) => {
                slot.password_hash = new_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        let removed = users.len() != before;
        if removed {
            self.articles.lock().unwrap().retain(|a| a.user_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl ArticleRepo for MemoryStore {
    async fn find_article_by_id(&self, id: Uuid) -> Result<Option<Article>, RepoError> {
        Ok(self
            .articles
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn list_articles(&self) -> Result<Vec<Article>, RepoError> {
        Ok(self.articles.lock().unwrap().clone())
    }

    async fn list_articles_by_user(&self, user_id: Uuid) -> Result<Vec<Article>, RepoError> {
        Ok(self
            .articles
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert_article(&self, new: NewArticle) -> Result<Article, RepoError> {
        let article = Article {
            id: Uuid::new_v4(),
            title: new.title,
            description: new.description,
            url_font: new.url_font,
            user_id: new.user_id,
            created_at: OffsetDateTime::now_utc(),
        };
        self.articles.lock().unwrap().push(article.clone());
        Ok(article)
    }

    async fn save_article(&self, article: &Article) -> Result<bool, RepoError> {
        let mut articles = self.articles.lock().unwrap();
        match articles.iter_mut().find(|a| a.id == article.id) {
            Some(slot) => {
                *slot = article.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_article(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut articles = self.articles.lock().unwrap();
        let before = articles.len();
        articles.retain(|a| a.id != id);
        Ok(articles.len() != before)
    }
}
