//! Session extractors.
//!
//! The session token travels in the `token` cookie. Each extractor applies one
//! [`AccessPolicy`] class before the handler body runs.

use actix_web::cookie::time::OffsetDateTime;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use chrono::{DateTime, Utc};
use std::future::{Ready, ready};
use std::sync::Arc;

use quill_core::domain::Role;
use quill_core::policy::{AccessPolicy, Actor};
use quill_core::ports::TokenService;

use super::error::AppError;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "token";

/// Build the `HttpOnly` session cookie expiring with the token.
pub fn session_cookie(token: String, expires_at: DateTime<Utc>, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .finish();
    if let Ok(expires) = OffsetDateTime::from_unix_timestamp(expires_at.timestamp()) {
        cookie.set_expires(expires);
    }
    cookie
}

/// An expired, empty session cookie that makes the browser forget the token.
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .finish();
    cookie.make_removal();
    cookie
}

fn evaluate(req: &HttpRequest, policy: AccessPolicy) -> Result<Option<Actor>, AppError> {
    let tokens = req
        .app_data::<web::Data<Arc<dyn TokenService>>>()
        .ok_or_else(|| AppError::Internal("TokenService not found in app data".to_string()))?;

    let token = req.cookie(SESSION_COOKIE);
    policy
        .evaluate(token.as_ref().map(|c| c.value()), tokens.get_ref().as_ref())
        .map_err(AppError::from)
}

fn authenticated(req: &HttpRequest, policy: AccessPolicy) -> Result<Actor, AppError> {
    evaluate(req, policy)?
        .ok_or_else(|| AppError::Internal("authenticated policy yielded no actor".to_string()))
}

/// Only callers without a live session (login, register).
#[derive(Debug, Clone, Copy)]
pub struct Guest;

impl FromRequest for Guest {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(evaluate(req, AccessPolicy::GuestOnly).map(|_| Guest))
    }
}

/// Any authenticated caller.
#[derive(Debug, Clone)]
pub struct Identity(pub Actor);

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticated(req, AccessPolicy::AuthRequired).map(Identity))
    }
}

/// An authenticated caller with the `admin` role.
#[derive(Debug, Clone)]
pub struct AdminIdentity(pub Actor);

impl FromRequest for AdminIdentity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticated(req, AccessPolicy::RoleOnly(Role::Admin)).map(AdminIdentity))
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
pub struct OptionalIdentity(pub Option<Actor>);

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let actor = evaluate(req, AccessPolicy::AuthRequired).ok().flatten();
        ready(Ok(OptionalIdentity(actor)))
    }
}
