use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::auth::password::CredentialHasher;
use crate::db::UserRepo;
use crate::error::AppError;
use crate::users::repo_types::User;

pub const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn validate_email(email: &str) -> Result<(), AppError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(AppError::Validation("Invalid email".into()))
    }
}

pub(crate) fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Resolves an email/password pair to a user.
///
/// Unknown email and wrong password both come back as
/// [`AppError::InvalidCredentials`]. A hash made under older settings is
/// upgraded in place after a successful check.
pub async fn authenticate(
    users: &dyn UserRepo,
    hasher: &CredentialHasher,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    let Some(mut user) = users.find_user_by_email(email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !hasher.verify(password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    if hasher.needs_rehash(&user.password_hash) {
        match hasher.hash(password) {
            Ok(upgraded) => {
                match users
                    .set_password_hash(user.id, &upgraded, &user.password_hash)
                    .await
                {
                    Ok(true) => {
                        info!(user_id = %user.id, "password hash upgraded");
                        user.password_hash = upgraded;
                    }
                    Ok(false) => {
                        debug!(user_id = %user.id, "password changed during login; upgrade skipped")
                    }
                    Err(e) => {
                        warn!(error = %e, user_id = %user.id, "password hash upgrade not saved")
                    }
                }
            }
            Err(e) => warn!(error = %e, user_id = %user.id, "password rehash failed"),
        }
    }

    debug!(user_id = %user.id, "credentials accepted");
    Ok(user)
}
