use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::articles::repo_types::Article;

/// Request body for signup. An `is_admin` field, if sent, is ignored.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Partial update. Absent and empty fields leave the stored value alone.
#[derive(Debug, Default, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub is_admin: Option<bool>,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserWithArticles {
    #[serde(flatten)]
    pub user: UserResponse,
    pub articles: Vec<Article>,
}

#[derive(Debug, Serialize)]
pub struct AvatarResponse {
    pub avatar_url: String,
}
