mod client;

pub use client::{ApiClient, ApiError};

use comments_shared::Comment;

/// The four comment operations the reconciler needs from the server.
#[allow(async_fn_in_trait)]
pub trait CommentsApi {
    async fn list_comments(&self) -> Result<Vec<Comment>, ApiError>;

    async fn create_comment(&self, author: &str, text: &str) -> Result<Comment, ApiError>;

    async fn update_comment(&self, id: i64, text: &str) -> Result<Comment, ApiError>;

    async fn delete_comment(&self, id: i64) -> Result<(), ApiError>;
}
