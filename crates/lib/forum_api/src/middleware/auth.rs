//! Authentication middleware — cookie token extraction, JWT verification,
//! user lookup and role enforcement.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    http::header::COOKIE,
    middleware::Next,
    response::Response,
};
use forum_core::auth::gate::{self, RequiredRole};
use forum_core::models::auth::Identity;
use tracing::debug;

use crate::AppState;
use crate::error::AppError;

/// Request extension holding the caller's [`Identity`].
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

/// Join every `Cookie` header into one string (HTTP/2 may split them).
pub fn cookie_header(headers: &HeaderMap) -> Option<String> {
    let parts: Vec<&str> = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}

/// Axum middleware: authenticates the `token` cookie and injects
/// `AuthenticatedUser` into request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let cookies = cookie_header(request.headers());

    let identity = gate::authenticate(
        state.users.as_ref(),
        cookies.as_deref(),
        state.config.jwt_secret_bytes(),
    )
    .await
    .inspect_err(|e| {
        if let Some(reason) = e.rejection() {
            debug!(%reason, path = %request.uri().path(), "request not authenticated");
        }
    })?;

    request.extensions_mut().insert(AuthenticatedUser(identity));

    Ok(next.run(request).await)
}

/// Axum middleware: requires the admin role. Must run after [`require_auth`].
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| AppError::Unauthorized("Authentication required".into()))?;

    gate::authorize(&user.0, RequiredRole::Admin).inspect_err(|_| {
        debug!(user_id = user.0.user_id, "admin route refused");
    })?;

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn joins_multiple_cookie_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("a=1"));
        headers.append(COOKIE, HeaderValue::from_static("token=t"));
        assert_eq!(cookie_header(&headers).as_deref(), Some("a=1; token=t"));
    }

    #[test]
    fn no_cookie_header() {
        assert_eq!(cookie_header(&HeaderMap::new()), None);
    }
}
