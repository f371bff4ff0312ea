//! Account queries: lookup, registration, profile and role changes.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::AuthError;
use crate::models::auth::{PublicUser, Role, UserRecord};

type UserRow = (i64, String, String, String, String, DateTime<Utc>);

const USER_COLUMNS: &str = "id, email, username, password_hash, role, created_at";

fn into_record(row: UserRow) -> Result<UserRecord, AuthError> {
    let (id, email, username, password_hash, role, created_at) = row;
    let role = role.parse::<Role>().map_err(AuthError::Internal)?;
    Ok(UserRecord {
        id,
        email,
        username,
        password_hash,
        role,
        created_at,
    })
}

/// Map a unique-constraint violation to a validation error.
fn unique_violation(e: sqlx::Error, message: &str) -> AuthError {
    match e.as_database_error() {
        Some(db) if db.is_unique_violation() => AuthError::Validation(message.to_string()),
        _ => AuthError::Db(e),
    }
}

/// Fetch a user by ID.
pub async fn find_user_by_id(pool: &PgPool, id: i64) -> Result<Option<UserRecord>, AuthError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.map(into_record).transpose()
}

/// Fetch a user by email.
pub async fn find_user_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<UserRecord>, AuthError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;
    row.map(into_record).transpose()
}

/// Check whether an email or username is held by an account other than `except_id`.
pub async fn identity_taken(
    pool: &PgPool,
    email: &str,
    username: &str,
    except_id: Option<i64>,
) -> Result<bool, AuthError> {
    let taken = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users \
         WHERE (email = $1 OR username = $2) AND ($3::bigint IS NULL OR id <> $3))",
    )
    .bind(email)
    .bind(username)
    .bind(except_id)
    .fetch_one(pool)
    .await?;
    Ok(taken)
}

/// Advisory lock key serializing registrations (`"forumreg"` as bytes).
const REGISTRATION_LOCK: i64 = 0x666f_7275_6d72_6567;

/// Create a new user, returning the stored record.
///
/// The first account on an empty database becomes [`Role::Admin`]. The count
/// and the insert run in one transaction holding [`REGISTRATION_LOCK`], so
/// concurrent registrations cannot both see an empty table.
pub async fn register_user(
    pool: &PgPool,
    email: &str,
    username: &str,
    password_hash: &str,
) -> Result<UserRecord, AuthError> {
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(REGISTRATION_LOCK)
        .execute(&mut *tx)
        .await?;

    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(&mut *tx)
        .await?;
    let role = if count == 0 { Role::Admin } else { Role::User };

    let row = sqlx::query_as::<_, UserRow>(&format!(
        "INSERT INTO users (email, username, password_hash, role) VALUES ($1, $2, $3, $4) \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(email)
    .bind(username)
    .bind(password_hash)
    .bind(role.as_str())
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| unique_violation(e, "Email or username already in use"))?;

    tx.commit().await?;
    into_record(row)
}

/// List all users without credential material.
pub async fn list_users(
    pool: &PgPool,
    order: UserOrder,
    limit: Option<i64>,
) -> Result<Vec<PublicUser>, AuthError> {
    let order_by = match order {
        UserOrder::Username => "username ASC",
        UserOrder::Newest => "created_at DESC",
    };
    let rows = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY {order_by} LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;
    rows.into_iter()
        .map(|r| into_record(r).map(|u| PublicUser::from(&u)))
        .collect()
}

/// Sort order for user listings.
#[derive(Debug, Clone, Copy)]
pub enum UserOrder {
    Username,
    Newest,
}

/// Update username and email.
pub async fn update_profile(
    pool: &PgPool,
    id: i64,
    username: &str,
    email: &str,
) -> Result<Option<UserRecord>, AuthError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "UPDATE users SET username = $2, email = $3 WHERE id = $1 RETURNING {USER_COLUMNS}"
    ))
    .bind(id)
    .bind(username)
    .bind(email)
    .fetch_optional(pool)
    .await
    .map_err(|e| unique_violation(e, "Username or email already in use"))?;
    row.map(into_record).transpose()
}

/// Replace a password hash.
pub async fn update_password_hash(
    pool: &PgPool,
    id: i64,
    password_hash: &str,
) -> Result<(), AuthError> {
    sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;
    Ok(())
}

/// Change a user's role. Returns `None` when the user does not exist.
pub async fn set_role(pool: &PgPool, id: i64, role: Role) -> Result<Option<UserRecord>, AuthError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "UPDATE users SET role = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
    ))
    .bind(id)
    .bind(role.as_str())
    .fetch_optional(pool)
    .await?;
    row.map(into_record).transpose()
}

/// Delete a user with their messages, replies and topics in one transaction.
///
/// Returns `false` when the user does not exist.
pub async fn delete_user_cascade(pool: &PgPool, id: i64) -> Result<bool, AuthError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM messages WHERE sender_id = $1 OR receiver_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    // Replies by the user, and replies under the user's topics.
    sqlx::query(
        "DELETE FROM replies WHERE author_id = $1 \
         OR topic_id IN (SELECT id FROM topics WHERE author_id = $1)",
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;
    sqlx::query("DELETE FROM topics WHERE author_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;
    Ok(deleted > 0)
}
