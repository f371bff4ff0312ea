//! Authentication request handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use axum_extra::extract::cookie::CookieJar;
use forum_core::models::auth::PublicUser;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{LoginRequest, MessageResponse, RegisterRequest, UserResponse};
use crate::services::{auth, cookies};

/// `POST /api/auth/login` — authenticate with email + password and set the token cookie.
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(body): AppJson<LoginRequest>,
) -> AppResult<(CookieJar, Json<UserResponse>)> {
    let (user, token) = auth::login(
        state.users.as_ref(),
        &body.email,
        &body.password,
        state.config.jwt_secret_bytes(),
    )
    .await?;

    let jar = jar.add(cookies::token_cookie(&token, state.config.secure_cookies));
    Ok((
        jar,
        Json(UserResponse {
            message: "Login successful".into(),
            user: PublicUser::from(&user),
        }),
    ))
}

/// `POST /api/auth/register` — create a new user account.
pub async fn register_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = auth::register(&state.pool, &body.username, &body.email, &body.password).await?;
    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            message: "Registration successful".into(),
            user: PublicUser::from(&user),
        }),
    ))
}

/// `POST /api/auth/logout` — clear the token cookie.
pub async fn logout_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    let jar = jar.add(cookies::clear_token_cookie(state.config.secure_cookies));
    (jar, Json(MessageResponse::new("Logged out")))
}

/// `GET /api/auth/me` — the authenticated user.
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<PublicUser>> {
    let record = state
        .users
        .find_by_id(user.0.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(Json(PublicUser::from(&record)))
}
