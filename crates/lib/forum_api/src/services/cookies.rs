//! Cookie service — set/clear the httpOnly identity token cookie.

use axum_extra::extract::cookie::{Cookie, SameSite};
use forum_core::auth::jwt::TOKEN_EXPIRY_SECS;
use forum_core::auth::session::TOKEN_COOKIE;
use time::Duration;

/// Build the httpOnly cookie carrying the identity token (7 days).
pub fn token_cookie(token: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE.to_string(), token.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::seconds(TOKEN_EXPIRY_SECS))
        .build()
}

/// Build an empty, already expired token cookie to clear auth state.
pub fn clear_token_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE.to_string(), String::new()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::ZERO)
        .build()
}
