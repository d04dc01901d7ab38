use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use comments_shared::ADMIN_TOKEN_HEADER;

use crate::{error::AppError, routes::AppState};

use super::Access;

/// Rejects the request with 403 unless the admin header passes the guard.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok());

    match state.guard.authorize(token) {
        Access::Allow => Ok(next.run(request).await),
        Access::Deny => {
            tracing::debug!(
                method = %request.method(),
                uri = %request.uri(),
                "Rejected mutation with bad admin token"
            );
            Err(AppError::Forbidden)
        }
    }
}
