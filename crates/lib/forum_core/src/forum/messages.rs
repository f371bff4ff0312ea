//! Direct message queries.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use super::{ForumError, is_foreign_key_violation, required};
use crate::models::forum::{AuthorRef, Message};

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: i64,
    content: String,
    sender_id: i64,
    receiver_id: i64,
    is_read: bool,
    created_at: DateTime<Utc>,
    sender_username: String,
    receiver_username: String,
}

impl From<MessageRow> for Message {
    fn from(r: MessageRow) -> Self {
        Self {
            id: r.id,
            content: r.content,
            sender_id: r.sender_id,
            receiver_id: r.receiver_id,
            is_read: r.is_read,
            created_at: r.created_at,
            sender: AuthorRef {
                id: r.sender_id,
                username: r.sender_username,
            },
            receiver: AuthorRef {
                id: r.receiver_id,
                username: r.receiver_username,
            },
        }
    }
}

const MESSAGE_SELECT: &str = "SELECT m.id, m.content, m.sender_id, m.receiver_id, m.is_read, \
     m.created_at, s.username AS sender_username, r.username AS receiver_username \
     FROM messages m \
     JOIN users s ON s.id = m.sender_id \
     JOIN users r ON r.id = m.receiver_id";

/// Messages sent or received by a user, oldest first.
pub async fn list_messages_for(pool: &PgPool, user_id: i64) -> Result<Vec<Message>, ForumError> {
    let rows = sqlx::query_as::<_, MessageRow>(&format!(
        "{MESSAGE_SELECT} WHERE m.sender_id = $1 OR m.receiver_id = $1 \
         ORDER BY m.created_at ASC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Message::from).collect())
}

/// Send a message. Content is trimmed and required; messaging oneself is rejected.
pub async fn send_message(
    pool: &PgPool,
    sender_id: i64,
    receiver_id: i64,
    content: &str,
) -> Result<Message, ForumError> {
    let content = required(content, "Content")?;
    if sender_id == receiver_id {
        return Err(ForumError::Validation(
            "You cannot send a message to yourself".into(),
        ));
    }

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO messages (content, sender_id, receiver_id) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(&content)
    .bind(sender_id)
    .bind(receiver_id)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if is_foreign_key_violation(&e) {
            ForumError::NotFound(format!("user {receiver_id}"))
        } else {
            ForumError::Db(e)
        }
    })?;

    let row = sqlx::query_as::<_, MessageRow>(&format!("{MESSAGE_SELECT} WHERE m.id = $1"))
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(row.into())
}

/// Mark every unread message from `sender_id` to `receiver_id` as read.
///
/// Returns the number of messages updated.
pub async fn mark_read(pool: &PgPool, sender_id: i64, receiver_id: i64) -> Result<u64, ForumError> {
    let updated = sqlx::query(
        "UPDATE messages SET is_read = TRUE \
         WHERE sender_id = $1 AND receiver_id = $2 AND is_read = FALSE",
    )
    .bind(sender_id)
    .bind(receiver_id)
    .execute(pool)
    .await?
    .rows_affected();
    debug!(sender_id, receiver_id, updated, "messages marked read");
    Ok(updated)
}
