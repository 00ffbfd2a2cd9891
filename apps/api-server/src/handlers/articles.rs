//! Article handlers, including the admin publish workflow.

use actix_web::{HttpResponse, web};

use quill_core::parse_id;
use quill_core::services::{CreateArticleInput, MediaInput, UpdateArticleInput};
use quill_shared::ApiResponse;
use quill_shared::dto::{CreateArticleRequest, UpdateArticleRequest};

use super::mapping;
use crate::middleware::auth::{AdminIdentity, Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/articles
pub async fn list_published(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let articles = state.articles.find_all_published().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(mapping::articles(articles))))
}

/// GET /api/articles/drafts
pub async fn list_drafts(admin: AdminIdentity, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let articles = state.articles.find_all_unpublished(&admin.0).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(mapping::articles(articles))))
}

/// POST /api/articles
pub async fn create(
    identity: Identity,
    state: web::Data<AppState>,
    body: web::Json<CreateArticleRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let input = CreateArticleInput {
        title: req.title,
        description: req.description,
        content: req.content,
        media: req
            .media
            .into_iter()
            .map(|m| MediaInput {
                media_type: m.media_type,
                path: m.path,
            })
            .collect(),
    };

    let article = state.articles.create(&identity.0, input).await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        mapping::article(article),
        "article created successfully",
    )))
}

/// GET /api/articles/{id}
///
/// Drafts are only visible to their author and to admins.
pub async fn get(
    viewer: OptionalIdentity,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    let article = state.articles.find_by_id(viewer.0.as_ref(), id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(mapping::article(article))))
}

/// PUT /api/articles/{id}
pub async fn update(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateArticleRequest>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    let req = body.into_inner();

    let article = state
        .articles
        .update(
            &identity.0,
            id,
            UpdateArticleInput {
                title: req.title,
                description: req.description,
                content: req.content,
                is_published: req.is_published,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        mapping::article(article),
        "article updated successfully",
    )))
}

/// DELETE /api/articles/{id}
pub async fn delete(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    state.articles.delete(&identity.0, id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("article deleted successfully")))
}

/// PATCH /api/articles/{id}/publish
pub async fn publish(
    admin: AdminIdentity,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    let article = state.articles.publish(&admin.0, id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        mapping::article(article),
        "article published successfully",
    )))
}

/// PATCH /api/articles/{id}/unpublish
pub async fn unpublish(
    admin: AdminIdentity,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    let article = state.articles.unpublish(&admin.0, id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        mapping::article(article),
        "article unpublished successfully",
    )))
}
