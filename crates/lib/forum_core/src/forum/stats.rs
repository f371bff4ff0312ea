//! Aggregate counts for the dashboards.

use sqlx::PgPool;

use super::ForumError;
use crate::models::forum::{SiteStats, UserStats};

/// Totals across the whole site.
pub async fn site_stats(pool: &PgPool) -> Result<SiteStats, ForumError> {
    let (users, topics, messages, categories) = sqlx::query_as::<_, (i64, i64, i64, i64)>(
        "SELECT (SELECT COUNT(*) FROM users), \
                (SELECT COUNT(*) FROM topics), \
                (SELECT COUNT(*) FROM messages), \
                (SELECT COUNT(*) FROM categories)",
    )
    .fetch_one(pool)
    .await?;
    Ok(SiteStats {
        users,
        topics,
        messages,
        categories,
    })
}

/// Topics, replies and sent messages for one user.
pub async fn user_stats(pool: &PgPool, user_id: i64) -> Result<UserStats, ForumError> {
    let (topics, replies, messages) = sqlx::query_as::<_, (i64, i64, i64)>(
        "SELECT (SELECT COUNT(*) FROM topics WHERE author_id = $1), \
                (SELECT COUNT(*) FROM replies WHERE author_id = $1), \
                (SELECT COUNT(*) FROM messages WHERE sender_id = $1)",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(UserStats {
        topics,
        replies,
        messages,
    })
}
