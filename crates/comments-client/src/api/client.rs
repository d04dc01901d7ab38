use comments_shared::{
    api::{CreateCommentRequest, ErrorResponse, UpdateCommentRequest},
    Comment, ADMIN_TOKEN_HEADER,
};
use reqwest::{Client, RequestBuilder, StatusCode};

use super::CommentsApi;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Access forbidden")]
    Forbidden,
    #[error("Comment not found")]
    NotFound,
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Too large: {0}")]
    TooLarge(String),
    #[error("Server error: {0}")]
    Server(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl ApiError {
    /// Whether the request never got an answer from the server.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }
}

pub struct ApiClient {
    client: Client,
    base_url: String,
    admin_token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            admin_token: None,
        }
    }

    /// Token sent as the admin header on every mutation.
    pub fn with_admin_token(mut self, token: Option<String>) -> Self {
        self.admin_token = token;
        self
    }

    /// Build URL for endpoint
    fn url(&self, path: &str) -> String {
        format!("{}/api/comments{}", self.base_url, path)
    }

    /// Attach the admin header if a token is configured
    fn with_admin(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.admin_token {
            Some(token) => request.header(ADMIN_TOKEN_HEADER, token),
            None => request,
        }
    }

    /// Map a non-success status to an error, reading the server's message
    async fn error_for(response: reqwest::Response) -> ApiError {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&text)
            .map(|e| e.error)
            .unwrap_or(text);

        match status {
            StatusCode::FORBIDDEN => ApiError::Forbidden,
            StatusCode::NOT_FOUND => ApiError::NotFound,
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ApiError::Validation(message)
            }
            StatusCode::PAYLOAD_TOO_LARGE => ApiError::TooLarge(message),
            _ => ApiError::Server(format!("{}: {}", status, message)),
        }
    }

    /// Handle API response
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        match response.status() {
            // The server answered, so a body that does not decode is its fault
            StatusCode::OK | StatusCode::CREATED => response
                .json()
                .await
                .map_err(|e| ApiError::Server(format!("Malformed response body: {}", e))),
            _ => Err(Self::error_for(response).await),
        }
    }

    /// Handle empty response
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<(), ApiError> {
        match response.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
            _ => Err(Self::error_for(response).await),
        }
    }
}

impl CommentsApi for ApiClient {
    async fn list_comments(&self) -> Result<Vec<Comment>, ApiError> {
        let response = self.client.get(self.url("")).send().await?;
        self.handle_response(response).await
    }

    async fn create_comment(&self, author: &str, text: &str) -> Result<Comment, ApiError> {
        let req = CreateCommentRequest {
            author: author.to_string(),
            text: text.to_string(),
        };

        let response = self.client.post(self.url("")).json(&req).send().await?;
        self.handle_response(response).await
    }

    async fn update_comment(&self, id: i64, text: &str) -> Result<Comment, ApiError> {
        let req = UpdateCommentRequest {
            text: text.to_string(),
        };

        let response = self
            .with_admin(self.client.put(self.url(&format!("/{}", id))))
            .json(&req)
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn delete_comment(&self, id: i64) -> Result<(), ApiError> {
        let response = self
            .with_admin(self.client.delete(self.url(&format!("/{}", id))))
            .send()
            .await?;
        self.handle_empty_response(response).await
    }
}
