//! Admin panel request handlers.
//!
//! Every route here sits behind `require_auth` + `require_admin`; account
//! operations additionally go through `authorize_self_or_admin`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use forum_core::auth::gate::{AccountAction, authorize_self_or_admin};
use forum_core::auth::queries::{self, UserOrder};
use forum_core::forum::{categories, stats, topics};
use forum_core::models::auth::{PublicUser, Role};
use forum_core::models::forum::{CategoryWithCount, SiteStats, Topic};
use tracing::info;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{CategoryRequest, ChangeRoleRequest, MessageResponse};

/// Rows shown in the dashboard's "recent" panels.
const RECENT_LIMIT: i64 = 10;

/// `GET /api/admin/stats`
pub async fn stats_handler(State(state): State<AppState>) -> AppResult<Json<SiteStats>> {
    Ok(Json(stats::site_stats(&state.pool).await?))
}

/// `GET /api/admin/recent-users`
pub async fn recent_users_handler(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PublicUser>>> {
    Ok(Json(
        queries::list_users(&state.pool, UserOrder::Newest, Some(RECENT_LIMIT)).await?,
    ))
}

/// `GET /api/admin/recent-topics`
pub async fn recent_topics_handler(State(state): State<AppState>) -> AppResult<Json<Vec<Topic>>> {
    Ok(Json(
        topics::list_topics(&state.pool, Some(RECENT_LIMIT)).await?,
    ))
}

/// `GET /api/admin/users` — all users, newest first.
pub async fn list_users_handler(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PublicUser>>> {
    Ok(Json(
        queries::list_users(&state.pool, UserOrder::Newest, None).await?,
    ))
}

/// `PATCH /api/admin/users/{id}/role` — change another user's role.
pub async fn change_role_handler(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthenticatedUser>,
    AppPath(id): AppPath<i64>,
    AppJson(body): AppJson<ChangeRoleRequest>,
) -> AppResult<Json<PublicUser>> {
    let role = body
        .role
        .parse::<Role>()
        .map_err(|_| AppError::Validation("Invalid role".into()))?;
    authorize_self_or_admin(&admin.0, id, AccountAction::ChangeRole)?;

    let updated = queries::set_role(&state.pool, id, role)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    info!(admin_id = admin.0.user_id, user_id = id, %role, "role changed");
    Ok(Json(PublicUser::from(&updated)))
}

/// `DELETE /api/admin/users/{id}` — delete another user and everything they wrote.
pub async fn delete_user_handler(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthenticatedUser>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<MessageResponse>> {
    authorize_self_or_admin(&admin.0, id, AccountAction::Delete)?;

    if !queries::delete_user_cascade(&state.pool, id).await? {
        return Err(AppError::NotFound("User not found".into()));
    }
    info!(admin_id = admin.0.user_id, user_id = id, "user deleted");
    Ok(Json(MessageResponse::new("User deleted")))
}

/// `GET /api/admin/topics`
pub async fn list_topics_handler(State(state): State<AppState>) -> AppResult<Json<Vec<Topic>>> {
    Ok(Json(topics::list_topics(&state.pool, None).await?))
}

/// `DELETE /api/admin/topics/{id}` — delete a topic and its replies.
pub async fn delete_topic_handler(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthenticatedUser>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<MessageResponse>> {
    topics::delete_topic(&state.pool, id).await?;
    info!(admin_id = admin.0.user_id, topic_id = id, "topic deleted");
    Ok(Json(MessageResponse::new("Topic and its replies deleted")))
}

/// `GET /api/admin/categories` — categories with topic counts.
pub async fn list_categories_handler(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CategoryWithCount>>> {
    Ok(Json(
        categories::list_categories_with_counts(&state.pool).await?,
    ))
}

/// `POST /api/admin/categories`
pub async fn create_category_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<CategoryRequest>,
) -> AppResult<(StatusCode, Json<CategoryWithCount>)> {
    let category = categories::create_category(&state.pool, &body.name).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// `PATCH /api/admin/categories/{id}` — rename.
pub async fn rename_category_handler(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(body): AppJson<CategoryRequest>,
) -> AppResult<Json<CategoryWithCount>> {
    Ok(Json(
        categories::rename_category(&state.pool, id, &body.name).await?,
    ))
}

/// `DELETE /api/admin/categories/{id}` — delete with all topics and replies.
pub async fn delete_category_handler(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthenticatedUser>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<MessageResponse>> {
    categories::delete_category(&state.pool, id).await?;
    info!(admin_id = admin.0.user_id, category_id = id, "category deleted");
    Ok(Json(MessageResponse::new("Category deleted")))
}
