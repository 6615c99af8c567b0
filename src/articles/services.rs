//! Article side of the Mutation Service. Same order as for users: existence,
//! then policy, then validation, then a single write.

use tracing::info;
use url::Url;
use uuid::Uuid;

use super::dto::ArticlePayload;
use super::repo_types::{Article, NewArticle};
use crate::auth::policy;
use crate::error::AppError;
use crate::state::AppState;
use crate::users::{repo_types::User, services::present};

/// Accepts absolute http(s) URLs with a host and returns the normalized form.
pub(crate) fn normalize_url(raw: &str) -> Result<String, AppError> {
    let invalid = || AppError::Validation("url_font must be a valid http(s) URL".into());
    let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid());
    }
    Ok(url.to_string())
}

fn required(field: &str, v: Option<String>) -> Result<String, AppError> {
    present(v).ok_or_else(|| AppError::Validation(format!("{} is required", field)))
}

pub async fn find_article(st: &AppState, id: Uuid) -> Result<Article, AppError> {
    st.articles
        .find_article_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Article"))
}

/// New articles always belong to the caller.
pub async fn create_article(
    st: &AppState,
    actor: &User,
    payload: ArticlePayload,
) -> Result<Article, AppError> {
    let title = required("title", payload.title)?;
    let description = required("description", payload.description)?;
    let url_font = normalize_url(&required("url_font", payload.url_font)?)?;

    let article = st
        .articles
        .insert_article(NewArticle {
            title,
            description,
            url_font,
            user_id: actor.id,
        })
        .await?;
    info!(article_id = %article.id, user_id = %actor.id, "article created");
    Ok(article)
}

pub async fn update_article(
    st: &AppState,
    actor: &User,
    id: Uuid,
    changes: ArticlePayload,
) -> Result<Article, AppError> {
    let mut article = find_article(st, id).await?;
    policy::ensure_can_modify_article(actor, &article)?;

    let url_font = present(changes.url_font)
        .map(|u| normalize_url(&u))
        .transpose()?;

    if let Some(title) = present(changes.title) {
        article.title = title;
    }
    if let Some(description) = present(changes.description) {
        article.description = description;
    }
    if let Some(url_font) = url_font {
        article.url_font = url_font;
    }
    article.user_id = policy::article_owner_after_update(actor, &article);

    if !st.articles.save_article(&article).await? {
        return Err(AppError::NotFound("Article"));
    }
    info!(article_id = %article.id, actor_id = %actor.id, "article updated");
    Ok(article)
}

pub async fn delete_article(st: &AppState, actor: &User, id: Uuid) -> Result<(), AppError> {
    let article = find_article(st, id).await?;
    policy::ensure_can_modify_article(actor, &article)?;

    if !st.articles.delete_article(article.id).await? {
        return Err(AppError::NotFound("Article"));
    }
    info!(article_id = %article.id, actor_id = %actor.id, "article deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::services::seed_user;

    fn payload(title: &str) -> ArticlePayload {
        ArticlePayload {
            title: Some(title.into()),
            description: Some("Some text".into()),
            url_font: Some("https://example.com/source".into()),
        }
    }

    #[test]
    fn url_validation() {
        assert_eq!(
            normalize_url("https://example.com").unwrap(),
            "https://example.com/"
        );
        assert!(normalize_url("http://example.com/a?b=c").is_ok());
        assert!(normalize_url("ftp://example.com").is_err());
        assert!(normalize_url("example.com").is_err());
        assert!(normalize_url("not a url").is_err());
    }

    #[tokio::test]
    async fn create_attributes_article_to_caller() {
        let st = AppState::fake();
        let user = seed_user(&st, "a@x.com", false).await;

        let article = create_article(&st, &user, payload("Hello")).await.unwrap();
        assert_eq!(article.user_id, user.id);
        assert_eq!(article.url_font, "https://example.com/source");
    }

    #[tokio::test]
    async fn create_requires_all_fields() {
        let st = AppState::fake();
        let user = seed_user(&st, "a@x.com", false).await;

        let res = create_article(
            &st,
            &user,
            ArticlePayload {
                title: Some("t".into()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(res, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn stranger_cannot_update_or_delete() {
        let st = AppState::fake();
        let owner = seed_user(&st, "owner@x.com", false).await;
        let stranger = seed_user(&st, "stranger@x.com", false).await;
        let article = create_article(&st, &owner, payload("Mine")).await.unwrap();

        let res = update_article(&st, &stranger, article.id, payload("Stolen")).await;
        assert!(matches!(res, Err(AppError::Forbidden(_))));
        let res = delete_article(&st, &stranger, article.id).await;
        assert!(matches!(res, Err(AppError::Forbidden(_))));

        let stored = find_article(&st, article.id).await.unwrap();
        assert_eq!(stored.title, "Mine");
        assert_eq!(stored.user_id, owner.id);
    }

    #[tokio::test]
    async fn owner_partial_update_keeps_other_fields() {
        let st = AppState::fake();
        let owner = seed_user(&st, "owner@x.com", false).await;
        let article = create_article(&st, &owner, payload("Draft")).await.unwrap();

        let changes = ArticlePayload {
            title: Some("Final".into()),
            description: Some(String::new()),
            ..Default::default()
        };
        let updated = update_article(&st, &owner, article.id, changes).await.unwrap();
        assert_eq!(updated.title, "Final");
        assert_eq!(updated.description, article.description);
        assert_eq!(updated.url_font, article.url_font);
        assert_eq!(updated.user_id, owner.id);
    }

    #[tokio::test]
    async fn admin_edit_transfers_ownership() {
        let st = AppState::fake();
        let owner = seed_user(&st, "owner@x.com", false).await;
        let admin = seed_user(&st, "root@x.com", true).await;
        let article = create_article(&st, &owner, payload("Mine")).await.unwrap();

        let updated = update_article(&st, &admin, article.id, payload("Edited"))
            .await
            .unwrap();
        assert_eq!(updated.user_id, admin.id);
        assert_eq!(find_article(&st, article.id).await.unwrap().user_id, admin.id);
    }

    #[tokio::test]
    async fn invalid_url_fails_the_whole_update() {
        let st = AppState::fake();
        let owner = seed_user(&st, "owner@x.com", false).await;
        let article = create_article(&st, &owner, payload("Mine")).await.unwrap();

        let changes = ArticlePayload {
            title: Some("New".into()),
            url_font: Some("nope".into()),
            ..Default::default()
        };
        let res = update_article(&st, &owner, article.id, changes).await;
        assert!(matches!(res, Err(AppError::Validation(_))));
        assert_eq!(find_article(&st, article.id).await.unwrap().title, "Mine");
    }

    #[tokio::test]
    async fn deleting_missing_article_is_not_found_and_changes_nothing() {
        let (st, store, _) = AppState::fake_with_store();
        let owner = seed_user(&st, "owner@x.com", false).await;
        create_article(&st, &owner, payload("Keep")).await.unwrap();

        let res = delete_article(&st, &owner, Uuid::new_v4()).await;
        assert!(matches!(res, Err(AppError::NotFound(_))));
        assert_eq!(store.article_count(), 1);
    }

    #[tokio::test]
    async fn owner_can_delete() {
        let (st, store, _) = AppState::fake_with_store();
        let owner = seed_user(&st, "owner@x.com", false).await;
        let article = create_article(&st, &owner, payload("Bye")).await.unwrap();

        delete_article(&st, &owner, article.id).await.unwrap();
        assert_eq!(store.article_count(), 0);
    }
}
