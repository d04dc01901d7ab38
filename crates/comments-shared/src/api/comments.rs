use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /api/comments`. Missing or `null` fields deserialize as empty
/// strings so they fail validation the same way blank ones do.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub author: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,
}

/// Body of `PUT /api/comments/:id`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateCommentRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
