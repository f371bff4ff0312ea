//! Authentication and authorization logic.
//!
//! Provides the identity token codec, password hashing, cookie session
//! extraction, the user store seam and the auth gate shared by every
//! protected route in `forum_api`.

pub mod gate;
pub mod jwt;
pub mod password;
pub mod queries;
pub mod session;
pub mod store;

use std::fmt;

use thiserror::Error;

/// Why a request could not be authenticated.
///
/// All variants collapse to 401 at the HTTP boundary; they are kept apart for
/// logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// No token cookie on the request.
    MissingCookie,
    /// Bad signature, malformed payload or expired token.
    InvalidToken,
    /// Token is valid but its subject no longer exists.
    UnknownSubject,
    /// Login with an unknown email or a wrong password.
    BadCredentials,
}

impl Rejection {
    pub fn as_str(self) -> &'static str {
        match self {
            Rejection::MissingCookie => "missing_cookie",
            Rejection::InvalidToken => "invalid_token",
            Rejection::UnknownSubject => "unknown_subject",
            Rejection::BadCredentials => "bad_credentials",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(Rejection),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// The rejection reason, if this is an authentication failure.
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            AuthError::Unauthenticated(r) => Some(*r),
            _ => None,
        }
    }
}
