//! Authentication handlers.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use quill_core::services::{LoginInput, RegisterInput};
use quill_shared::ApiResponse;
use quill_shared::dto::{LoginRequest, RegisterRequest};

use super::mapping;
use crate::middleware::auth::{Guest, Identity, removal_cookie, session_cookie};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    _guest: Guest,
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let registered = state
        .auth
        .register(RegisterInput {
            username: req.username,
            password: req.password,
            full_name: req.full_name,
        })
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        mapping::registered(registered),
        "user registered successfully",
    )))
}

/// POST /api/auth/login
///
/// The token is only set as an `HttpOnly` cookie; the body carries its claims.
pub async fn login(
    _guest: Guest,
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let session = state
        .auth
        .login(LoginInput {
            username: req.username,
            password: req.password,
        })
        .await?;

    let cookie = session_cookie(
        session.token,
        session.claims.expires_at,
        state.cookie_secure,
    );

    Ok(HttpResponse::Ok()
        .cookie(cookie)
        .json(ApiResponse::ok_with_message(
            mapping::session(session.claims),
            "login successful",
        )))
}

/// POST /api/auth/logout
pub async fn logout(identity: Identity, state: web::Data<AppState>) -> HttpResponse {
    tracing::info!(user_id = identity.0.user_id, "Session closed");

    HttpResponse::Ok()
        .cookie(removal_cookie(state.cookie_secure))
        .json(ApiResponse::message("logout successful"))
}

#[derive(Serialize)]
pub struct MeResponse {
    pub user_id: i64,
    pub username: String,
    pub role: String,
}

/// GET /api/auth/me - Protected route
pub async fn me(identity: Identity) -> HttpResponse {
    let actor = identity.0;
    HttpResponse::Ok().json(ApiResponse::ok(MeResponse {
        user_id: actor.user_id,
        username: actor.username,
        role: actor.role.to_string(),
    }))
}
