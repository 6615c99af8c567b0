use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use crate::{error::AppError, state::AppState, users::repo_types::User};

/// The authenticated caller, loaded from storage.
///
/// A valid token whose subject no longer exists is rejected the same way as a
/// missing token.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AppError::Unauthenticated)?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or(AppError::Unauthenticated)?;

        let user_id = state.jwt.verify(token).map_err(|e| {
            warn!(error = %e, "bearer token rejected");
            AppError::Token(e)
        })?;

        match state.users.find_user_by_id(user_id).await? {
            Some(user) => Ok(CurrentUser(user)),
            None => {
                warn!(user_id = %user_id, "token subject no longer exists");
                Err(AppError::Unauthenticated)
            }
        }
    }
}
