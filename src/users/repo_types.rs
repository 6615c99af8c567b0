use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database. Never serialized directly; see `dto::UserResponse`.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,       // Argon2 PHC string
    pub is_admin: bool,
    pub avatar_key: Option<String>,  // object key, not a URL
    pub created_at: OffsetDateTime,
}

/// Columns supplied at signup; everything else is defaulted by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}
