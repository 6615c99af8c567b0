//! Account creation and the user side of the Mutation Service.
//!
//! Every mutation runs in the same order: load the target (`NotFound`), ask
//! the policy (`Forbidden`), validate the payload, then write once.

use tracing::{info, warn};
use uuid::Uuid;

use super::dto::{SignupRequest, UserResponse, UserUpdate};
use super::repo_types::{NewUser, User};
use crate::auth::{
    policy,
    services::{validate_email, validate_password},
};
use crate::error::AppError;
use crate::state::AppState;

/// Treats `None`, `""` and whitespace-only strings alike.
pub(crate) fn present(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

fn required(field: &str, v: String) -> Result<String, AppError> {
    present(Some(v)).ok_or_else(|| AppError::Validation(format!("{} is required", field)))
}

pub async fn signup(st: &AppState, req: SignupRequest) -> Result<User, AppError> {
    let name = required("name", req.name)?;
    let last_name = required("last_name", req.last_name)?;
    let email = required("email", req.email)?;
    validate_email(&email)?;
    validate_password(&req.password)?;

    if st.users.find_user_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::EmailTaken);
    }

    let password_hash = st.hasher.hash(&req.password)?;
    let user = st
        .users
        .insert_user(NewUser {
            name,
            last_name,
            email,
            password_hash,
        })
        .await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}

pub async fn find_user(st: &AppState, user_id: Uuid) -> Result<User, AppError> {
    st.users
        .find_user_by_id(user_id)
        .await?
        .ok_or(AppError::NotFound("User"))
}

pub async fn update_user(
    st: &AppState,
    actor: &User,
    user_id: Uuid,
    changes: UserUpdate,
) -> Result<User, AppError> {
    let mut user = find_user(st, user_id).await?;

    policy::ensure_can_modify_user(actor, &user)?;
    policy::ensure_can_set_admin(actor, changes.is_admin)?;

    let email = present(changes.email);
    if let Some(email) = &email {
        validate_email(email)?;
    }
    let password = present(changes.password);
    if let Some(pw) = &password {
        validate_password(pw)?;
    }

    if let Some(name) = present(changes.name) {
        user.name = name;
    }
    if let Some(last_name) = present(changes.last_name) {
        user.last_name = last_name;
    }
    if let Some(email) = email {
        user.email = email;
    }
    if let Some(pw) = password {
        user.password_hash = st.hasher.hash(&pw)?;
    }
    if let Some(is_admin) = changes.is_admin {
        user.is_admin = is_admin;
    }

    if !st.users.save_user(&user).await? {
        return Err(AppError::NotFound("User"));
    }
    info!(actor_id = %actor.id, user_id = %user.id, "user updated");
    Ok(user)
}

/// Deletes the user and their articles. The avatar object is removed
/// best-effort afterwards.
pub async fn delete_user(st: &AppState, actor: &User, user_id: Uuid) -> Result<(), AppError> {
    let user = find_user(st, user_id).await?;
    policy::ensure_can_modify_user(actor, &user)?;

    if !st.users.delete_user(user.id).await? {
        return Err(AppError::NotFound("User"));
    }
    info!(actor_id = %actor.id, user_id = %user.id, "user deleted");

    if let Some(key) = &user.avatar_key {
        if let Err(e) = st.storage.delete_object(key).await {
            warn!(error = %e, key = %key, "avatar cleanup failed");
        }
    }
    Ok(())
}

/// Builds the outward view, swapping the stored avatar key for a presigned URL.
pub async fn to_response(st: &AppState, user: User) -> UserResponse {
    let avatar_url = match &user.avatar_key {
        Some(key) => match st
            .storage
            .presign_get(key, st.config.avatar_url_ttl_secs)
            .await
        {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(error = %e, user_id = %user.id, "avatar presign failed");
                None
            }
        },
        None => None,
    };

    UserResponse {
        id: user.id,
        name: user.name,
        last_name: user.last_name,
        email: user.email,
        is_admin: user.is_admin,
        avatar_url,
    }
}

#[cfg(test)]
pub(crate) async fn seed_user(st: &AppState, email: &str, is_admin: bool) -> User {
    let user = signup(
        st,
        SignupRequest {
            name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: email.into(),
            password: "secret123".into(),
        },
    )
    .await
    .expect("signup");
    if !is_admin {
        return user;
    }
    let promoted = User {
        is_admin: true,
        ..user
    };
    st.users.save_user(&promoted).await.expect("promote");
    promoted
}
