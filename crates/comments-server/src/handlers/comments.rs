use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use comments_shared::{
    api::{CreateCommentRequest, UpdateCommentRequest},
    validation::{parse_server_id, validate_new_comment, validate_text},
    Comment,
};

use crate::error::AppError;
use crate::routes::AppState;

/// GET /api/comments
pub async fn list_comments(
    State(state): State<AppState>,
) -> Result<Json<Vec<Comment>>, AppError> {
    let comments = state.store.list().await?;
    Ok(Json(comments))
}

/// POST /api/comments
pub async fn create_comment(
    State(state): State<AppState>,
    body: Result<Json<CreateCommentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    let Json(req) = body?;
    let new = validate_new_comment(&req.author, &req.text)?;

    let comment = state.store.create(&new.author, &new.text).await?;
    tracing::info!(id = comment.id, author = %comment.author, "Comment created");

    Ok((StatusCode::CREATED, Json(comment)))
}

/// PUT /api/comments/:id
pub async fn update_comment(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Result<Json<UpdateCommentRequest>, JsonRejection>,
) -> Result<Json<Comment>, AppError> {
    let id = parse_server_id(&raw_id)?;
    let Json(req) = body?;
    let text = validate_text(&req.text)?;

    let comment = state
        .store
        .update(id, &text)
        .await?
        .ok_or(AppError::NotFound)?;
    tracing::info!(id, "Comment updated");

    Ok(Json(comment))
}

/// DELETE /api/comments/:id
pub async fn delete_comment(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_server_id(&raw_id)?;

    if !state.store.delete(id).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!(id, "Comment deleted");

    Ok(StatusCode::NO_CONTENT)
}
