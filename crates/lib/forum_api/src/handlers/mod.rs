//! Request handlers.

pub mod account;
pub mod admin;
pub mod auth;
pub mod categories;
pub mod health;
pub mod messages;
pub mod topics;
