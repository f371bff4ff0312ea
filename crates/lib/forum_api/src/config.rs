//! API server configuration.

use tracing::warn;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3000").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// JWT signing secret. Empty means unconfigured: token operations fail with a config error.
    pub jwt_secret: String,
    /// Mark the auth cookie `Secure` (production).
    pub secure_cookies: bool,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable       | Default                           |
    /// |----------------|-----------------------------------|
    /// | `BIND_ADDR`    | `127.0.0.1:3000`                  |
    /// | `DATABASE_URL` | `postgres://localhost:5432/forum` |
    /// | `JWT_SECRET`   | unset (auth returns 500)          |
    /// | `APP_ENV`      | `production` enables secure cookies |
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".into()),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/forum".into()),
            jwt_secret: resolve_jwt_secret(),
            secure_cookies: is_production(),
        }
    }

    /// Replace the port of [`bind_addr`](Self::bind_addr), keeping its host.
    pub fn with_port(mut self, port: u16) -> Self {
        let host = self
            .bind_addr
            .rsplit_once(':')
            .map_or(self.bind_addr.as_str(), |(host, _)| host);
        self.bind_addr = format!("{host}:{port}");
        self
    }

    /// The signing secret as bytes.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }
}

/// Read `JWT_SECRET`, warning when it is missing.
pub fn resolve_jwt_secret() -> String {
    match std::env::var("JWT_SECRET") {
        Ok(secret) if !secret.trim().is_empty() => secret,
        _ => {
            warn!("JWT_SECRET is not set; login and authenticated routes will fail");
            String::new()
        }
    }
}

/// Whether `APP_ENV` selects production.
pub fn is_production() -> bool {
    std::env::var("APP_ENV").is_ok_and(|v| v.eq_ignore_ascii_case("production"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(bind_addr: &str) -> ApiConfig {
        ApiConfig {
            bind_addr: bind_addr.into(),
            database_url: String::new(),
            jwt_secret: String::new(),
            secure_cookies: false,
        }
    }

    #[test]
    fn with_port_keeps_host() {
        assert_eq!(config("0.0.0.0:3000").with_port(8080).bind_addr, "0.0.0.0:8080");
        assert_eq!(config("[::1]:3000").with_port(9).bind_addr, "[::1]:9");
        assert_eq!(config("localhost").with_port(80).bind_addr, "localhost:80");
    }
}
