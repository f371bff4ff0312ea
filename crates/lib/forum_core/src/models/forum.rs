//! Forum content models: categories, topics, replies, messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Topic category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Category with its topic count, for the admin panel.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithCount {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub topic_count: i64,
}

/// Author shown next to a topic, reply or message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRef {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRef {
    pub id: i64,
    pub title: String,
}

/// Topic with author, category and reply count.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub views: i64,
    pub likes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author: AuthorRef,
    pub category: CategoryRef,
    pub reply_count: i64,
}

/// Reply under a topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub id: i64,
    pub content: String,
    pub topic_id: i64,
    pub created_at: DateTime<Utc>,
    pub author: AuthorRef,
}

/// A user's reply with the topic it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReply {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub topic: TopicRef,
}

/// Direct message between two users.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    pub content: String,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub sender: AuthorRef,
    pub receiver: AuthorRef,
}

/// Site-wide totals for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteStats {
    pub users: i64,
    pub topics: i64,
    pub messages: i64,
    pub categories: i64,
}

/// Per-user activity totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub topics: i64,
    pub replies: i64,
    pub messages: i64,
}
