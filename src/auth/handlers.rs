use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Form, Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{LoginForm, TokenResponse},
        extractors::CurrentUser,
        services::authenticate,
    },
    error::AppError,
    state::AppState,
    users::{
        dto::{SignupRequest, UserResponse},
        services::{signup, to_response},
    },
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/users/signup", post(register))
        .route("/users/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/users/logged", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = signup(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(to_response(&state, user).await)))
}

#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, AppError> {
    let user = authenticate(
        state.users.as_ref(),
        &state.hasher,
        &form.username,
        &form.password,
    )
    .await?;

    let access_token = state.jwt.issue(user.id)?;
    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(TokenResponse::bearer(access_token)))
}

#[instrument(skip(state, user))]
pub async fn get_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Json<UserResponse> {
    Json(to_response(&state, user).await)
}
