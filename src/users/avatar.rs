use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use super::repo_types::User;
use super::services::find_user;
use crate::auth::policy;
use crate::error::AppError;
use crate::state::AppState;

pub struct UploadItem<'a> {
    pub body: Bytes,
    pub content_type: &'a str,
    pub file_name: Option<&'a str>,
}

/// Stores a new avatar for `user_id` and returns a presigned URL for it.
///
/// The object is written before the row; if the row update fails the new
/// object is removed. Only the avatar column is written. The previous avatar
/// is removed once the row points at the new one.
pub async fn upload_avatar(
    st: &AppState,
    actor: &User,
    user_id: Uuid,
    item: UploadItem<'_>,
) -> Result<String, AppError> {
    let mut user = find_user(st, user_id).await?;
    if !policy::may_modify_user(actor, &user) {
        warn!(actor_id = %actor.id, user_id = %user.id, "avatar upload denied");
        return Err(AppError::Forbidden(
            "You do not have permission to upload this avatar.",
        ));
    }
    if item.body.is_empty() {
        return Err(AppError::Validation("file is empty".into()));
    }

    let ext = item
        .file_name
        .and_then(ext_from_file_name)
        .or_else(|| ext_from_mime(item.content_type))
        .unwrap_or("bin");
    let key = format!("avatars/{}-{}.{}", user.id, Uuid::new_v4(), ext);

    st.storage
        .put_object(&key, item.body, item.content_type)
        .await
        .map_err(AppError::Storage)?;

    let previous = user.avatar_key.replace(key.clone());
    let saved = st.users.set_avatar_key(user.id, &key).await;
    if !matches!(saved, Ok(true)) {
        if let Err(e) = st.storage.delete_object(&key).await {
            warn!(error = %e, key = %key, "orphaned avatar cleanup failed");
        }
        saved?;
        return Err(AppError::NotFound("User"));
    }
    info!(actor_id = %actor.id, user_id = %user.id, key = %key, "avatar stored");

    if let Some(old) = previous {
        if let Err(e) = st.storage.delete_object(&old).await {
            warn!(error = %e, key = %old, "previous avatar cleanup failed");
        }
    }

    st.storage
        .presign_get(&key, st.config.avatar_url_ttl_secs)
        .await
        .map_err(AppError::Storage)
}

fn ext_from_file_name(name: &str) -> Option<&str> {
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() || ext.len() > 8 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext)
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}
