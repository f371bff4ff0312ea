//! Services shared by request handlers.

pub mod auth;
pub mod cookies;
