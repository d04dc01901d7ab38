use serde::{Deserialize, Serialize};

use super::CommentId;

pub const MAX_AUTHOR_LEN: usize = 50;
pub const MAX_TEXT_LEN: usize = 1000;

/// A comment as persisted by the server.
///
/// Timestamps are milliseconds since the Unix epoch. `updated_at` starts equal
/// to `created_at` and only moves forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Comment {
    pub id: i64,
    pub author: String,
    pub text: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Comment {
    pub fn is_edited(&self) -> bool {
        self.updated_at != self.created_at
    }
}

/// A comment that exists only on the client, either still waiting for the
/// server to confirm it or kept after the server could not be reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalComment {
    pub id: CommentId,
    pub author: String,
    pub text: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl LocalComment {
    /// Builds a new pending comment stamped with `now`.
    pub fn pending(author: impl Into<String>, text: impl Into<String>, now: i64) -> Self {
        Self {
            id: CommentId::new_pending(),
            author: author.into(),
            text: text.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the text, never moving `updated_at` backwards.
    pub fn set_text(&mut self, text: impl Into<String>, now: i64) {
        self.text = text.into();
        self.updated_at = now.max(self.updated_at);
    }
}

impl From<Comment> for LocalComment {
    fn from(comment: Comment) -> Self {
        Self {
            id: CommentId::Confirmed(comment.id),
            author: comment.author,
            text: comment.text,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}
