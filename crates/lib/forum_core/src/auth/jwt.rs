//! JWT identity token generation and verification.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;

use super::{AuthError, Rejection};
use crate::models::auth::{Role, TokenClaims};

/// Identity token lifetime: 7 days.
pub const TOKEN_EXPIRY_SECS: i64 = 7 * 24 * 60 * 60;

/// Generate a signed identity token (HS256, 7 day expiry).
pub fn issue_token(user_id: i64, role: Role, secret: &[u8]) -> Result<String, AuthError> {
    issue_token_at(user_id, role, secret, Utc::now())
}

/// Generate a token as if issued at `issued_at`.
pub fn issue_token_at(
    user_id: i64,
    role: Role,
    secret: &[u8],
    issued_at: DateTime<Utc>,
) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::Config("JWT secret is not configured".into()));
    }
    let claims = TokenClaims {
        user_id,
        role,
        iat: issued_at.timestamp(),
        exp: (issued_at + Duration::seconds(TOKEN_EXPIRY_SECS)).timestamp(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))
}

/// Verify an identity token, returning its claims.
///
/// Signature mismatch, malformed payload and expiry all reject with
/// [`Rejection::InvalidToken`].
pub fn verify_token(token: &str, secret: &[u8]) -> Result<TokenClaims, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::Config("JWT secret is not configured".into()));
    }
    let key = DecodingKey::from_secret(secret);
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp"]);
    decode::<TokenClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            debug!(kind = ?e.kind(), "token verification failed");
            AuthError::Unauthenticated(Rejection::InvalidToken)
        })
}
