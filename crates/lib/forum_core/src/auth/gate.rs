//! Auth gate: who is calling, and may they do this.
//!
//! `authenticate` runs cookie extraction, token verification and the user
//! lookup in that order. `authorize` and `authorize_self_or_admin` are pure
//! checks over the resulting [`Identity`].

use tracing::debug;

use super::store::UserStore;
use super::{AuthError, Rejection, jwt, session};
use crate::models::auth::{Identity, Role};

/// Role a caller needs for an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredRole {
    /// Any authenticated user.
    Any,
    Admin,
}

/// Operation on a user account, checked by [`authorize_self_or_admin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountAction {
    /// Editing the account's own data: owner or admin.
    Edit,
    /// Changing the account's role: admin, never on self.
    ChangeRole,
    /// Deleting the account: admin, never on self.
    Delete,
}

/// Resolve the caller from a raw `Cookie` header.
///
/// A token whose subject no longer exists is rejected as
/// [`Rejection::UnknownSubject`]. The returned role is the stored one.
pub async fn authenticate<S>(
    store: &S,
    cookie_header: Option<&str>,
    secret: &[u8],
) -> Result<Identity, AuthError>
where
    S: UserStore + ?Sized,
{
    let token = session::extract_token(cookie_header)
        .ok_or(AuthError::Unauthenticated(Rejection::MissingCookie))?;

    let claims = jwt::verify_token(token, secret)?;

    let user = store
        .find_by_id(claims.user_id)
        .await?
        .ok_or_else(|| {
            debug!(user_id = claims.user_id, "token subject no longer exists");
            AuthError::Unauthenticated(Rejection::UnknownSubject)
        })?;

    Ok(Identity::from(&user))
}

/// Check that `identity` holds `required`.
pub fn authorize(identity: &Identity, required: RequiredRole) -> Result<(), AuthError> {
    match required {
        RequiredRole::Any => Ok(()),
        RequiredRole::Admin if identity.role == Role::Admin => Ok(()),
        RequiredRole::Admin => Err(AuthError::Forbidden("Admin role required".into())),
    }
}

/// Check that `identity` may perform `action` on account `target_user_id`.
///
/// Role changes and deletions are admin-only and never allowed on the
/// caller's own account. Admins may act on other admins.
pub fn authorize_self_or_admin(
    identity: &Identity,
    target_user_id: i64,
    action: AccountAction,
) -> Result<(), AuthError> {
    let is_self = identity.user_id == target_user_id;
    match action {
        AccountAction::Edit if is_self || identity.role.is_admin() => Ok(()),
        AccountAction::Edit => Err(AuthError::Forbidden(
            "Cannot modify another user's account".into(),
        )),
        AccountAction::ChangeRole | AccountAction::Delete => {
            authorize(identity, RequiredRole::Admin)?;
            if is_self {
                let msg = match action {
                    AccountAction::Delete => "You cannot delete your own account",
                    _ => "You cannot change your own role",
                };
                return Err(AuthError::Forbidden(msg.into()));
            }
            Ok(())
        }
    }
}
