//! Topic queries.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use super::{ForumError, is_foreign_key_violation, required};
use crate::models::forum::{AuthorRef, CategoryRef, Topic};

#[derive(sqlx::FromRow)]
struct TopicRow {
    id: i64,
    title: String,
    content: String,
    views: i64,
    likes: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    author_id: i64,
    author_username: String,
    category_id: i64,
    category_name: String,
    reply_count: i64,
}

impl From<TopicRow> for Topic {
    fn from(r: TopicRow) -> Self {
        Self {
            id: r.id,
            title: r.title,
            content: r.content,
            views: r.views,
            likes: r.likes,
            created_at: r.created_at,
            updated_at: r.updated_at,
            author: AuthorRef {
                id: r.author_id,
                username: r.author_username,
            },
            category: CategoryRef {
                id: r.category_id,
                name: r.category_name,
            },
            reply_count: r.reply_count,
        }
    }
}

const TOPIC_SELECT: &str = "SELECT t.id, t.title, t.content, t.views, t.likes, \
     t.created_at, t.updated_at, \
     u.id AS author_id, u.username AS author_username, \
     c.id AS category_id, c.name AS category_name, \
     (SELECT COUNT(*) FROM replies r WHERE r.topic_id = t.id) AS reply_count \
     FROM topics t \
     JOIN users u ON u.id = t.author_id \
     JOIN categories c ON c.id = t.category_id";

/// List topics, newest first. `limit = None` returns all.
pub async fn list_topics(pool: &PgPool, limit: Option<i64>) -> Result<Vec<Topic>, ForumError> {
    let rows = sqlx::query_as::<_, TopicRow>(&format!(
        "{TOPIC_SELECT} ORDER BY t.created_at DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Topic::from).collect())
}

/// List the topics written by one user, newest first.
pub async fn list_topics_by_author(
    pool: &PgPool,
    author_id: i64,
    limit: Option<i64>,
) -> Result<Vec<Topic>, ForumError> {
    let rows = sqlx::query_as::<_, TopicRow>(&format!(
        "{TOPIC_SELECT} WHERE t.author_id = $1 ORDER BY t.created_at DESC LIMIT $2"
    ))
    .bind(author_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Topic::from).collect())
}

/// Fetch one topic.
pub async fn get_topic(pool: &PgPool, id: i64) -> Result<Topic, ForumError> {
    let row = sqlx::query_as::<_, TopicRow>(&format!("{TOPIC_SELECT} WHERE t.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(Topic::from)
        .ok_or_else(|| ForumError::NotFound(format!("topic {id}")))
}

/// Create a topic. Title and content are trimmed and required.
pub async fn create_topic(
    pool: &PgPool,
    author_id: i64,
    title: &str,
    content: &str,
    category_id: i64,
) -> Result<Topic, ForumError> {
    let title = required(title, "Title")?;
    let content = required(content, "Content")?;

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO topics (title, content, author_id, category_id) \
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(&title)
    .bind(&content)
    .bind(author_id)
    .bind(category_id)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if is_foreign_key_violation(&e) {
            ForumError::Validation(format!("Unknown category {category_id}"))
        } else {
            ForumError::Db(e)
        }
    })?;

    debug!(topic_id = id, author_id, "topic created");
    get_topic(pool, id).await
}

/// Add one to a topic's view count.
pub async fn increment_views(pool: &PgPool, id: i64) -> Result<(), ForumError> {
    let updated = sqlx::query("UPDATE topics SET views = views + 1 WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();
    if updated == 0 {
        return Err(ForumError::NotFound(format!("topic {id}")));
    }
    Ok(())
}

/// Check that a topic exists.
pub async fn topic_exists(pool: &PgPool, id: i64) -> Result<bool, ForumError> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM topics WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(exists)
}

/// Delete a topic and its replies.
pub async fn delete_topic(pool: &PgPool, id: i64) -> Result<(), ForumError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM replies WHERE topic_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let deleted = sqlx::query("DELETE FROM topics WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    if deleted == 0 {
        return Err(ForumError::NotFound(format!("topic {id}")));
    }

    tx.commit().await?;
    Ok(())
}
