//! Field rules shared by the server handlers and the client's pre-flight checks.

use crate::models::{MAX_AUTHOR_LEN, MAX_TEXT_LEN};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Empty(&'static str),

    #[error("{field} is too long (max {max} characters)")]
    TooLong { field: &'static str, max: usize },

    #[error("Invalid comment id: {0}")]
    InvalidId(String),
}

impl ValidationError {
    /// Oversized payloads are reported separately from malformed ones.
    pub fn is_too_long(&self) -> bool {
        matches!(self, Self::TooLong { .. })
    }
}

/// A create request that passed validation, with both fields trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub author: String,
    pub text: String,
}

/// Emptiness is checked for both fields before any length check.
pub fn validate_new_comment(author: &str, text: &str) -> Result<NewComment, ValidationError> {
    let author = author.trim();
    let text = text.trim();

    if author.is_empty() {
        return Err(ValidationError::Empty("author"));
    }
    if text.is_empty() {
        return Err(ValidationError::Empty("text"));
    }
    check_len("author", author, MAX_AUTHOR_LEN)?;
    check_len("text", text, MAX_TEXT_LEN)?;

    Ok(NewComment {
        author: author.to_string(),
        text: text.to_string(),
    })
}

/// Validates replacement text and returns it trimmed.
pub fn validate_text(text: &str) -> Result<String, ValidationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::Empty("text"));
    }
    check_len("text", text, MAX_TEXT_LEN)?;
    Ok(text.to_string())
}

/// Parses a server identifier from a path segment.
pub fn parse_server_id(raw: &str) -> Result<i64, ValidationError> {
    raw.trim()
        .parse()
        .map_err(|_| ValidationError::InvalidId(raw.to_string()))
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}
