//! Direct message request handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use forum_core::forum::messages;
use forum_core::models::forum::Message;

use crate::AppState;
use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{MarkReadRequest, MarkReadResponse, SendMessageRequest};

/// `GET /api/messages` — every message the caller sent or received.
pub async fn list_messages_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<Message>>> {
    Ok(Json(
        messages::list_messages_for(&state.pool, user.0.user_id).await?,
    ))
}

/// `POST /api/messages` — send a message.
pub async fn send_message_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    AppJson(body): AppJson<SendMessageRequest>,
) -> AppResult<(StatusCode, Json<Message>)> {
    let message =
        messages::send_message(&state.pool, user.0.user_id, body.receiver_id, &body.content)
            .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// `POST /api/messages/mark-read` — mark messages from `senderId` to the caller as read.
pub async fn mark_read_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    AppJson(body): AppJson<MarkReadRequest>,
) -> AppResult<Json<MarkReadResponse>> {
    let updated = messages::mark_read(&state.pool, body.sender_id, user.0.user_id).await?;
    Ok(Json(MarkReadResponse {
        message: "Messages marked as read".into(),
        updated,
    }))
}
