//! The caller's own account: profile, password, activity.

use axum::extract::State;
use axum::{Extension, Json};
use forum_core::auth::gate::{AccountAction, authorize_self_or_admin};
use forum_core::auth::queries::{self, UserOrder};
use forum_core::forum::{replies, stats, topics};
use forum_core::models::auth::PublicUser;
use forum_core::models::forum::{Topic, UserReply, UserStats};

use crate::AppState;
use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{ChangePasswordRequest, MessageResponse, UpdateProfileRequest, UserResponse};
use crate::services::auth;

/// Number of recent items on the profile page.
const RECENT_LIMIT: i64 = 10;

/// `GET /api/users` — member directory, by username.
pub async fn list_users_handler(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PublicUser>>> {
    Ok(Json(
        queries::list_users(&state.pool, UserOrder::Username, None).await?,
    ))
}

/// `PATCH /api/user/profile` — change the caller's username and email.
pub async fn update_profile_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    AppJson(body): AppJson<UpdateProfileRequest>,
) -> AppResult<Json<UserResponse>> {
    let me = &user.0;
    authorize_self_or_admin(me, me.user_id, AccountAction::Edit)?;
    let updated = auth::update_profile(&state.pool, me.user_id, &body.username, &body.email).await?;
    Ok(Json(UserResponse {
        message: "Profile updated".into(),
        user: PublicUser::from(&updated),
    }))
}

/// `PATCH /api/user/password` — change the caller's password.
pub async fn change_password_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    AppJson(body): AppJson<ChangePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    auth::change_password(
        &state.pool,
        user.0.user_id,
        &body.current_password,
        &body.new_password,
    )
    .await?;
    Ok(Json(MessageResponse::new("Password changed")))
}

/// `GET /api/user/stats`
pub async fn user_stats_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<UserStats>> {
    Ok(Json(stats::user_stats(&state.pool, user.0.user_id).await?))
}

/// `GET /api/user/topics` — the caller's recent topics.
pub async fn user_topics_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<Topic>>> {
    Ok(Json(
        topics::list_topics_by_author(&state.pool, user.0.user_id, Some(RECENT_LIMIT)).await?,
    ))
}

/// `GET /api/user/replies` — the caller's recent replies.
pub async fn user_replies_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<UserReply>>> {
    Ok(Json(
        replies::list_replies_by_author(&state.pool, user.0.user_id, RECENT_LIMIT).await?,
    ))
}
