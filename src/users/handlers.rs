use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::avatar::{upload_avatar, UploadItem};
use super::dto::{AvatarResponse, UserResponse, UserUpdate, UserWithArticles};
use super::services::{self, find_user, to_response};
use crate::{auth::extractors::CurrentUser, error::AppError, state::AppState};

const AVATAR_BODY_LIMIT: usize = 5 * 1024 * 1024;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route(
            "/users/:id",
            get(get_user).put(put_user).delete(delete_user),
        )
        .route(
            "/users/:id/avatar",
            post(post_avatar).layer(DefaultBodyLimit::max(AVATAR_BODY_LIMIT)),
        )
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = state.users.list_users().await?;
    let mut out = Vec::with_capacity(users.len());
    for u in users {
        out.push(to_response(&state, u).await);
    }
    Ok(Json(out))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserWithArticles>, AppError> {
    let user = find_user(&state, id).await?;
    let articles = state.articles.list_articles_by_user(user.id).await?;
    Ok(Json(UserWithArticles {
        user: to_response(&state, user).await,
        articles,
    }))
}

#[instrument(skip(state, actor, payload), fields(actor_id = %actor.id))]
pub async fn put_user(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UserUpdate>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = services::update_user(&state, &actor, id, payload).await?;
    Ok((StatusCode::ACCEPTED, Json(to_response(&state, user).await)))
}

#[instrument(skip(state, actor), fields(actor_id = %actor.id))]
pub async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    services::delete_user(&state, &actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /users/:id/avatar (multipart, field `file`)
#[instrument(skip(state, actor, mp), fields(actor_id = %actor.id))]
pub async fn post_avatar(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<Uuid>,
    mut mp: Multipart,
) -> Result<(StatusCode, Json<AvatarResponse>), AppError> {
    while let Some(field) = mp.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(|s| s.to_string());
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".into());
        let body = field.bytes().await?;

        let avatar_url = upload_avatar(
            &state,
            &actor,
            id,
            UploadItem {
                body,
                content_type: &content_type,
                file_name: file_name.as_deref(),
            },
        )
        .await?;
        return Ok((StatusCode::ACCEPTED, Json(AvatarResponse { avatar_url })));
    }
    Err(AppError::Validation("file is required".into()))
}
