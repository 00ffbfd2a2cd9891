use actix_web::{HttpResponse, web};

use quill_core::parse_id;
use quill_core::services::CreateCommentInput;
use quill_shared::ApiResponse;
use quill_shared::dto::CreateCommentRequest;

use super::mapping;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/articles/{id}/comments
pub async fn list(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let article_id = parse_id(&path)?;
    let comments = state.comments.find_by_article_id(article_id).await?;
    let comments: Vec<_> = comments.into_iter().map(mapping::comment).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(comments)))
}

/// POST /api/articles/{id}/comments
pub async fn create(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let article_id = parse_id(&path)?;
    let comment = state
        .comments
        .create(
            &identity.0,
            article_id,
            CreateCommentInput {
                body: body.into_inner().body,
            },
        )
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        mapping::comment(comment),
        "comment created successfully",
    )))
}

/// DELETE /api/comments/{id}
///
/// Only the comment's author may remove it.
pub async fn delete(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let comment_id = parse_id(&path)?;
    state.comments.delete(&identity.0, comment_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("comment deleted successfully")))
}
