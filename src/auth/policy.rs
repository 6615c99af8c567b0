//! Who may change what.
//!
//! Every check here is pure and runs before any write. A denial is always
//! [`AppError::Forbidden`]; callers must have already confirmed the target
//! exists so that `NotFound` is reported ahead of any permission decision.

use tracing::warn;
use uuid::Uuid;

use crate::articles::repo_types::Article;
use crate::error::AppError;
use crate::users::repo_types::User;

pub fn may_modify_user(actor: &User, target: &User) -> bool {
    actor.is_admin || actor.id == target.id
}

pub fn may_modify_article(actor: &User, article: &Article) -> bool {
    actor.is_admin || actor.id == article.user_id
}

pub fn ensure_can_modify_user(actor: &User, target: &User) -> Result<(), AppError> {
    if may_modify_user(actor, target) {
        return Ok(());
    }
    warn!(actor_id = %actor.id, target_id = %target.id, "user mutation denied");
    Err(AppError::Forbidden(
        "You do not have permission to modify this user.",
    ))
}

pub fn ensure_can_modify_article(actor: &User, article: &Article) -> Result<(), AppError> {
    if may_modify_article(actor, article) {
        return Ok(());
    }
    warn!(actor_id = %actor.id, article_id = %article.id, "article mutation denied");
    Err(AppError::Forbidden(
        "You do not have permission to modify this article.",
    ))
}

/// Granting the admin flag requires an admin actor. A denial fails the whole
/// update; the flag is never silently dropped.
pub fn ensure_can_set_admin(actor: &User, requested: Option<bool>) -> Result<(), AppError> {
    match requested {
        Some(true) if !actor.is_admin => {
            warn!(actor_id = %actor.id, "admin escalation denied");
            Err(AppError::Forbidden(
                "You do not have permission to make this user an admin.",
            ))
        }
        _ => Ok(()),
    }
}

/// Editing an article transfers it to the editor.
pub fn article_owner_after_update(actor: &User, _article: &Article) -> Uuid {
    actor.id
}


#[cfg(test)]
mod tests {
    use super::fixtures::{article_of, user};
    use super::*;

    #[test]
    fn users_may_modify_themselves_only() {
        let a = user(false);
        let b = user(false);
        assert!(may_modify_user(&a, &a));
        assert!(!may_modify_user(&a, &b));
        assert!(matches!(
            ensure_can_modify_user(&a, &b),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn admins_may_modify_anyone() {
        let admin = user(true);
        let other = user(false);
        assert!(may_modify_user(&admin, &other));
        assert!(may_modify_article(&admin, &article_of(&other)));
    }

    #[test]
    fn articles_belong_to_their_owner() {
        let owner = user(false);
        let stranger = user(false);
        let article = article_of(&owner);
        assert!(may_modify_article(&owner, &article));
        assert!(!may_modify_article(&stranger, &article));
        assert!(ensure_can_modify_article(&stranger, &article).is_err());
    }

    #[test]
    fn only_admins_grant_admin() {
        let plain = user(false);
        let admin = user(true);
        assert!(matches!(
            ensure_can_set_admin(&plain, Some(true)),
            Err(AppError::Forbidden(_))
        ));
        assert!(ensure_can_set_admin(&plain, None).is_ok());
        assert!(ensure_can_set_admin(&plain, Some(false)).is_ok());
        assert!(ensure_can_set_admin(&admin, Some(true)).is_ok());
    }

    #[test]
    fn editing_an_article_transfers_ownership_to_the_editor() {
        let owner = user(false);
        let admin = user(true);
        let article = article_of(&owner);
        assert_eq!(article_owner_after_update(&owner, &article), owner.id);
        assert_eq!(article_owner_after_update(&admin, &article), admin.id);
    }
}
