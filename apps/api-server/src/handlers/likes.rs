use actix_web::{HttpResponse, web};

use quill_core::parse_id;
use quill_shared::ApiResponse;

use super::mapping;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/articles/{id}/likes
pub async fn list(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let article_id = parse_id(&path)?;
    let likes = state.likes.find_by_article_id(article_id).await?;
    let likes: Vec<_> = likes.into_iter().map(mapping::like).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(likes)))
}

/// POST /api/articles/{id}/likes
pub async fn create(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let article_id = parse_id(&path)?;
    let like = state.likes.create(&identity.0, article_id).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        mapping::like(like),
        "article liked successfully",
    )))
}

/// DELETE /api/articles/{id}/likes
pub async fn delete(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let article_id = parse_id(&path)?;
    state.likes.delete(&identity.0, article_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("article unliked successfully")))
}
