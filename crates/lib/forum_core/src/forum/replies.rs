//! Reply queries.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{ForumError, is_foreign_key_violation, required};
use crate::models::forum::{AuthorRef, Reply, TopicRef, UserReply};

#[derive(sqlx::FromRow)]
struct ReplyRow {
    id: i64,
    content: String,
    topic_id: i64,
    created_at: DateTime<Utc>,
    author_id: i64,
    author_username: String,
}

impl From<ReplyRow> for Reply {
    fn from(r: ReplyRow) -> Self {
        Self {
            id: r.id,
            content: r.content,
            topic_id: r.topic_id,
            created_at: r.created_at,
            author: AuthorRef {
                id: r.author_id,
                username: r.author_username,
            },
        }
    }
}

const REPLY_SELECT: &str = "SELECT r.id, r.content, r.topic_id, r.created_at, \
     u.id AS author_id, u.username AS author_username \
     FROM replies r JOIN users u ON u.id = r.author_id";

/// List a topic's replies, oldest first.
pub async fn list_replies(pool: &PgPool, topic_id: i64) -> Result<Vec<Reply>, ForumError> {
    let rows = sqlx::query_as::<_, ReplyRow>(&format!(
        "{REPLY_SELECT} WHERE r.topic_id = $1 ORDER BY r.created_at ASC"
    ))
    .bind(topic_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Reply::from).collect())
}

/// Post a reply. Content is trimmed and required.
pub async fn create_reply(
    pool: &PgPool,
    author_id: i64,
    topic_id: i64,
    content: &str,
) -> Result<Reply, ForumError> {
    let content = required(content, "Content")?;

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO replies (content, author_id, topic_id) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(&content)
    .bind(author_id)
    .bind(topic_id)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if is_foreign_key_violation(&e) {
            ForumError::NotFound(format!("topic {topic_id}"))
        } else {
            ForumError::Db(e)
        }
    })?;

    let row = sqlx::query_as::<_, ReplyRow>(&format!("{REPLY_SELECT} WHERE r.id = $1"))
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(row.into())
}

/// A user's most recent replies with their topics.
pub async fn list_replies_by_author(
    pool: &PgPool,
    author_id: i64,
    limit: i64,
) -> Result<Vec<UserReply>, ForumError> {
    let rows = sqlx::query_as::<_, (i64, String, DateTime<Utc>, i64, String)>(
        "SELECT r.id, r.content, r.created_at, t.id, t.title \
         FROM replies r JOIN topics t ON t.id = r.topic_id \
         WHERE r.author_id = $1 \
         ORDER BY r.created_at DESC LIMIT $2",
    )
    .bind(author_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|(id, content, created_at, topic_id, title)| UserReply {
            id,
            content,
            created_at,
            topic: TopicRef { id: topic_id, title },
        })
        .collect())
}
