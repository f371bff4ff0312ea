//! Forum content queries: categories, topics, replies, messages, statistics.

pub mod categories;
pub mod messages;
pub mod replies;
pub mod stats;
pub mod topics;

use thiserror::Error;

/// Forum content errors.
#[derive(Debug, Error)]
pub enum ForumError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Trim `value` and reject it when empty.
pub(crate) fn required(value: &str, field: &str) -> Result<String, ForumError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ForumError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Whether a database error is a foreign-key violation.
pub(crate) fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db| db.is_foreign_key_violation())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_trims() {
        assert_eq!(required("  hi  ", "Title").unwrap(), "hi");
    }

    #[test]
    fn required_rejects_blank() {
        let err = required(" \n\t", "Content").unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Content is required");
    }
}
