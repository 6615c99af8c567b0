use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::ArticlePayload;
use super::repo_types::Article;
use super::services;
use crate::{auth::extractors::CurrentUser, error::AppError, state::AppState};

pub fn article_routes() -> Router<AppState> {
    Router::new()
        .route("/articles", get(list_articles).post(post_article))
        .route(
            "/articles/:id",
            get(get_article).put(put_article).delete(delete_article),
        )
}

#[instrument(skip(state))]
pub async fn list_articles(
    State(state): State<AppState>,
) -> Result<Json<Vec<Article>>, AppError> {
    Ok(Json(state.articles.list_articles().await?))
}

#[instrument(skip(state))]
pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Article>, AppError> {
    Ok(Json(services::find_article(&state, id).await?))
}

#[instrument(skip(state, actor, payload), fields(actor_id = %actor.id))]
pub async fn post_article(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Json(payload): Json<ArticlePayload>,
) -> Result<(StatusCode, HeaderMap, Json<Article>), AppError> {
    let article = services::create_article(&state, &actor, payload).await?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = format!("/api/v1/articles/{}", article.id).parse() {
        headers.insert(axum::http::header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(article)))
}

#[instrument(skip(state, actor, payload), fields(actor_id = %actor.id))]
pub async fn put_article(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ArticlePayload>,
) -> Result<(StatusCode, Json<Article>), AppError> {
    let article = services::update_article(&state, &actor, id, payload).await?;
    Ok((StatusCode::ACCEPTED, Json(article)))
}

#[instrument(skip(state, actor), fields(actor_id = %actor.id))]
pub async fn delete_article(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    services::delete_article(&state, &actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
