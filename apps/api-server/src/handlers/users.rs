//! Admin account management and per-user listings.

use actix_web::{HttpResponse, web};

use quill_core::domain::Role;
use quill_core::parse_id;
use quill_core::services::UpdateUserInput;
use quill_shared::ApiResponse;
use quill_shared::dto::UpdateUserRequest;

use super::mapping;
use crate::middleware::auth::{AdminIdentity, Identity};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/users
pub async fn list(admin: AdminIdentity, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let users = state.users.find_all(&admin.0).await?;
    let users: Vec<_> = users.into_iter().map(mapping::user).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(users)))
}

/// GET /api/users/{id}
pub async fn get(
    admin: AdminIdentity,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    let user = state.users.find_by_id(&admin.0, id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(mapping::user(user))))
}

/// PUT /api/users/{id}
pub async fn update(
    admin: AdminIdentity,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateUserRequest>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    let req = body.into_inner();
    let role: Role = req.role.parse()?;

    let user = state
        .users
        .update(
            &admin.0,
            id,
            UpdateUserInput {
                username: req.username,
                password: req.password,
                role,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        mapping::user(user),
        "user updated successfully",
    )))
}

/// DELETE /api/users/{id}
pub async fn delete(
    admin: AdminIdentity,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    state.users.delete(&admin.0, id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("user deleted successfully")))
}

/// GET /api/users/{id}/articles
pub async fn published_articles(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    let articles = state.articles.find_all_published_by_user(id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(mapping::articles(articles))))
}

/// GET /api/users/{id}/articles/drafts
pub async fn draft_articles(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    let articles = state
        .articles
        .find_all_unpublished_by_user(&identity.0, id)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(mapping::articles(articles))))
}

/// GET /api/users/{id}/likes
pub async fn likes(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    let likes = state.likes.find_by_user_id(id).await?;
    let likes: Vec<_> = likes.into_iter().map(mapping::like).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(likes)))
}
