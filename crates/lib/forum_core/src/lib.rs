//! # forum_core
//!
//! Core domain logic for the forum: the auth gate, topic view
//! de-duplication and forum content queries.

pub mod auth;
pub mod forum;
pub mod migrate;
pub mod models;
pub mod views;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
