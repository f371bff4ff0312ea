//! Topic and reply request handlers.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::{Extension, Json};
use chrono::Utc;
use forum_core::forum::{replies, topics};
use forum_core::models::forum::{Reply, Topic};
use tracing::debug;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{CreateReplyRequest, CreateTopicRequest, ViewResponse};

/// Client address from common proxy headers, or `"unknown"`.
pub fn client_ip(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if let Some(ip) = forwarded {
        return ip.to_string();
    }
    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

/// `GET /api/topics` — all topics, newest first.
pub async fn list_topics_handler(State(state): State<AppState>) -> AppResult<Json<Vec<Topic>>> {
    Ok(Json(topics::list_topics(&state.pool, None).await?))
}

/// `GET /api/topics/{id}`
pub async fn get_topic_handler(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Topic>> {
    Ok(Json(topics::get_topic(&state.pool, id).await?))
}

/// `POST /api/topics` — create a topic as the authenticated user.
pub async fn create_topic_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    AppJson(body): AppJson<CreateTopicRequest>,
) -> AppResult<(StatusCode, Json<Topic>)> {
    let topic = topics::create_topic(
        &state.pool,
        user.0.user_id,
        &body.title,
        &body.content,
        body.category_id,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(topic)))
}

/// `POST /api/topics/{id}/view` — count a view, at most once per client per window.
pub async fn record_view_handler(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    headers: HeaderMap,
) -> AppResult<Json<ViewResponse>> {
    let ip = client_ip(&headers);
    let counted = state.views.record_view(id, &ip, Utc::now());
    if counted {
        if let Err(e) = topics::increment_views(&state.pool, id).await {
            state.views.forget(id, &ip);
            return Err(e.into());
        }
        debug!(topic_id = id, "view counted");
    }
    Ok(Json(ViewResponse {
        success: true,
        counted,
    }))
}

/// `GET /api/topics/{id}/replies` — replies, oldest first.
pub async fn list_replies_handler(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Vec<Reply>>> {
    if !topics::topic_exists(&state.pool, id).await? {
        return Err(AppError::NotFound(format!("topic {id}")));
    }
    Ok(Json(replies::list_replies(&state.pool, id).await?))
}

/// `POST /api/topics/{id}/replies` — reply as the authenticated user.
pub async fn create_reply_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    AppPath(id): AppPath<i64>,
    AppJson(body): AppJson<CreateReplyRequest>,
) -> AppResult<(StatusCode, Json<Reply>)> {
    let reply = replies::create_reply(&state.pool, user.0.user_id, id, &body.content).await?;
    Ok((StatusCode::CREATED, Json(reply)))
}
