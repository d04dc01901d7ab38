use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::ValidationError;

/// Prefix reserved for client-generated identifiers.
pub const LOCAL_ID_PREFIX: &str = "local_";

/// Identity of a comment as seen by the client.
///
/// Server ids are plain integers; ids minted on the client before the server
/// has seen the comment are strings starting with [`LOCAL_ID_PREFIX`]. In JSON
/// the two encode as a number and a string respectively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommentId {
    Confirmed(i64),
    Pending(String),
}

impl CommentId {
    pub fn new_pending() -> Self {
        Self::Pending(format!("{}{}", LOCAL_ID_PREFIX, Uuid::new_v4().simple()))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    pub fn server_id(&self) -> Option<i64> {
        match self {
            Self::Confirmed(id) => Some(*id),
            Self::Pending(_) => None,
        }
    }
}

impl From<i64> for CommentId {
    fn from(id: i64) -> Self {
        Self::Confirmed(id)
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Confirmed(id) => write!(f, "{}", id),
            Self::Pending(id) => f.write_str(id),
        }
    }
}

impl FromStr for CommentId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(id) = s.parse::<i64>() {
            return Ok(Self::Confirmed(id));
        }
        if s.len() > LOCAL_ID_PREFIX.len() && s.starts_with(LOCAL_ID_PREFIX) {
            return Ok(Self::Pending(s.to_string()));
        }
        Err(ValidationError::InvalidId(s.to_string()))
    }
}
