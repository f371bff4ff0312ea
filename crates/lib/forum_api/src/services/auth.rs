//! Authentication service — login/registration/credential flows delegating to
//! `forum_core::auth`.

use std::sync::LazyLock;

use forum_core::auth::jwt::issue_token;
use forum_core::auth::password::{
    hash_password, hash_password_blocking, verify_password, verify_password_blocking,
};
use forum_core::auth::queries;
use forum_core::auth::store::UserStore;
use forum_core::auth::{AuthError, Rejection};
use forum_core::models::auth::UserRecord;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};

/// Minimum password length.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Minimum username length.
pub const MIN_USERNAME_LEN: usize = 3;

/// Hash compared against when the email is unknown, so both failure paths cost one bcrypt check.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("forum-dummy-password").ok());

/// Build the dummy hash off the async workers. Called once at startup.
pub async fn prime_dummy_hash() {
    let _ = tokio::task::spawn_blocking(|| LazyLock::force(&DUMMY_HASH).is_some()).await;
}

/// Spend one bcrypt verification against [`DUMMY_HASH`] on the blocking pool.
async fn verify_against_dummy(password: &str) {
    let password = password.to_string();
    let _ = tokio::task::spawn_blocking(move || {
        DUMMY_HASH
            .as_deref()
            .map(|dummy| verify_password(&password, dummy))
    })
    .await;
}

/// Reject obviously malformed email addresses.
pub fn validate_email(email: &str) -> AppResult<()> {
    let valid = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
    });
    if !valid {
        return Err(AppError::Validation("A valid email address is required".into()));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> AppResult<()> {
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(AppError::Validation(format!(
            "Username must be at least {MIN_USERNAME_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Authenticate with email + password and issue an identity token.
///
/// Unknown email and wrong password fail identically.
pub async fn login<S>(
    store: &S,
    email: &str,
    password: &str,
    jwt_secret: &[u8],
) -> AppResult<(UserRecord, String)>
where
    S: UserStore + ?Sized,
{
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(AppError::Validation("Email and password are required".into()));
    }

    let user = store.find_by_email(email).await?;

    let Some(user) = user else {
        verify_against_dummy(password).await;
        debug!("login failed: unknown email");
        return Err(AuthError::Unauthenticated(Rejection::BadCredentials).into());
    };

    if !verify_password_blocking(password.to_string(), user.password_hash.clone()).await? {
        debug!(user_id = user.id, "login failed: wrong password");
        return Err(AuthError::Unauthenticated(Rejection::BadCredentials).into());
    }

    let token = issue_token(user.id, user.role, jwt_secret)?;
    info!(user_id = user.id, role = %user.role, "user logged in");
    Ok((user, token))
}

/// Register a new account. The first account on an empty forum becomes admin.
pub async fn register(
    pool: &PgPool,
    username: &str,
    email: &str,
    password: &str,
) -> AppResult<UserRecord> {
    let username = username.trim();
    let email = email.trim();
    if username.is_empty() || email.is_empty() || password.is_empty() {
        return Err(AppError::Validation(
            "Username, email and password are required".into(),
        ));
    }
    validate_username(username)?;
    validate_email(email)?;
    validate_password(password)?;

    if queries::identity_taken(pool, email, username, None).await? {
        return Err(AppError::Validation("Email or username already in use".into()));
    }

    let pw_hash = hash_password_blocking(password.to_string()).await?;
    let user = queries::register_user(pool, email, username, &pw_hash).await?;

    info!(user_id = user.id, role = %user.role, "user registered");
    Ok(user)
}

/// Change the caller's password after re-checking the current one.
pub async fn change_password(
    pool: &PgPool,
    user_id: i64,
    current_password: &str,
    new_password: &str,
) -> AppResult<()> {
    if current_password.is_empty() || new_password.is_empty() {
        return Err(AppError::Validation(
            "Current and new password are required".into(),
        ));
    }
    validate_password(new_password)?;

    let user = queries::find_user_by_id(pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if !verify_password_blocking(current_password.to_string(), user.password_hash).await? {
        return Err(AppError::Validation("Current password is incorrect".into()));
    }

    let pw_hash = hash_password_blocking(new_password.to_string()).await?;
    queries::update_password_hash(pool, user_id, &pw_hash).await?;
    info!(user_id, "password changed");
    Ok(())
}

/// Update the caller's username and email.
pub async fn update_profile(
    pool: &PgPool,
    user_id: i64,
    username: &str,
    email: &str,
) -> AppResult<UserRecord> {
    let username = username.trim();
    let email = email.trim();
    if username.is_empty() || email.is_empty() {
        return Err(AppError::Validation("Username and email are required".into()));
    }
    validate_username(username)?;
    validate_email(email)?;

    if queries::identity_taken(pool, email, username, Some(user_id)).await? {
        return Err(AppError::Validation(
            "Username or email already in use".into(),
        ));
    }

    queries::update_profile(pool, user_id, username, email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}
