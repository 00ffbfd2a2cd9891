//! HTTP handlers and route configuration.

mod articles;
mod auth;
mod comments;
mod health;
mod likes;
mod mapping;
mod profiles;
mod users;

use actix_web::web;

pub use profiles::MAX_PHOTO_BYTES;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/logout", web::post().to(auth::logout))
                    .route("/me", web::get().to(auth::me)),
            )
            // Account management
            .service(
                web::scope("/users")
                    .route("", web::get().to(users::list))
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(users::get))
                            .route(web::put().to(users::update))
                            .route(web::delete().to(users::delete)),
                    )
                    .route("/{id}/articles", web::get().to(users::published_articles))
                    .route("/{id}/articles/drafts", web::get().to(users::draft_articles))
                    .route("/{id}/likes", web::get().to(users::likes)),
            )
            // Profiles
            .service(
                web::resource("/profile")
                    .route(web::get().to(profiles::own))
                    .route(web::put().to(profiles::update_own)),
            )
            .service(
                web::resource("/profile/photo")
                    .app_data(web::PayloadConfig::new(MAX_PHOTO_BYTES + 1))
                    .route(web::get().to(profiles::own_photo))
                    .route(web::put().to(profiles::upload_photo)),
            )
            .route("/profiles", web::get().to(profiles::list))
            .route("/profiles/{id}", web::get().to(profiles::get))
            // Articles; `/drafts` must be registered before `/{id}`
            .service(
                web::scope("/articles")
                    .service(
                        web::resource("")
                            .route(web::get().to(articles::list_published))
                            .route(web::post().to(articles::create)),
                    )
                    .route("/drafts", web::get().to(articles::list_drafts))
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(articles::get))
                            .route(web::put().to(articles::update))
                            .route(web::delete().to(articles::delete)),
                    )
                    .route("/{id}/publish", web::patch().to(articles::publish))
                    .route("/{id}/unpublish", web::patch().to(articles::unpublish))
                    .service(
                        web::resource("/{id}/likes")
                            .route(web::get().to(likes::list))
                            .route(web::post().to(likes::create))
                            .route(web::delete().to(likes::delete)),
                    )
                    .service(
                        web::resource("/{id}/comments")
                            .route(web::get().to(comments::list))
                            .route(web::post().to(comments::create)),
                    ),
            )
            .route("/comments/{id}", web::delete().to(comments::delete)),
    );
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use actix_web::cookie::Cookie;
    use actix_web::dev::ServiceResponse;
    use actix_web::http::StatusCode;
    use actix_web::{App, test, web};
    use chrono::Utc;
    use serde_json::{Value, json};

    use quill_core::domain::Role;
    use quill_core::ports::{TokenClaims, TokenService};
    use quill_infra::{InMemoryStore, JwtConfig, JwtTokenService};

    use super::configure_routes;
    use crate::middleware::auth::SESSION_COOKIE;
    use crate::middleware::error::json_error_handler;
    use crate::state::AppState;

    fn state() -> AppState {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(JwtConfig {
            secret: "handler-test-secret".to_string(),
            expiration_hours: 1,
            issuer: "quill-api".to_string(),
        }));
        let upload_dir = std::env::temp_dir().join(format!("quill-photos-{}", uuid::Uuid::new_v4()));
        AppState::build(Arc::new(InMemoryStore::new()), tokens, upload_dir, false)
    }

    macro_rules! service {
        ($state:expr) => {{
            let state: AppState = $state;
            test::init_service(
                App::new()
                    .app_data(web::Data::new(state.clone()))
                    .app_data(web::Data::new(state.tokens.clone()))
                    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                    .configure(configure_routes),
            )
            .await
        }};
    }

    /// Register then log in, yielding the session cookie.
    macro_rules! sign_in {
        ($app:expr, $username:expr) => {{
            let req = test::TestRequest::post()
                .uri("/api/auth/register")
                .set_json(json!({"username": $username, "password": "secret123", "full_name": "Jane Doe"}))
                .to_request();
            let resp = test::call_service($app, req).await;
            assert_eq!(resp.status(), StatusCode::CREATED);

            let req = test::TestRequest::post()
                .uri("/api/auth/login")
                .set_json(json!({"username": $username, "password": "secret123"}))
                .to_request();
            let resp = test::call_service($app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);

            resp.response()
                .cookies()
                .find(|c| c.name() == SESSION_COOKIE)
                .map(Cookie::into_owned)
                .unwrap()
        }};
    }

    fn admin_cookie(state: &AppState) -> Cookie<'static> {
        let claims = TokenClaims::new(999, "admin001", Role::Admin, Utc::now() + state.tokens.expiration());
        let token = state.tokens.issue_token(&claims).unwrap();
        Cookie::new(SESSION_COOKIE, token)
    }

    async fn body(resp: ServiceResponse) -> Value {
        test::read_body_json(resp).await
    }

    #[actix_rt::test]
    async fn health_is_public() {
        let app = service!(state());
        let resp = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request()).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body(resp).await["status"], "ok");
    }

    #[actix_rt::test]
    async fn session_lifecycle() {
        let app = service!(state());
        let cookie = sign_in!(&app, "janedoe1");
        assert!(cookie.http_only().unwrap_or(false));

        let req = test::TestRequest::get().uri("/api/auth/me").cookie(cookie.clone()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let me = body(resp).await;
        assert_eq!(me["data"]["username"], "janedoe1");
        assert_eq!(me["data"]["role"], "user");

        let req = test::TestRequest::get().uri("/api/auth/me").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        // A live session may not log in again.
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .cookie(cookie.clone())
            .set_json(json!({"username": "janedoe1", "password": "secret123"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::post().uri("/api/auth/logout").cookie(cookie).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cleared = resp.response().cookies().find(|c| c.name() == SESSION_COOKIE).unwrap();
        assert_eq!(cleared.value(), "");
    }

    #[actix_rt::test]
    async fn duplicate_registration_conflicts() {
        let app = service!(state());
        sign_in!(&app, "janedoe1");

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({"username": "janedoe1", "password": "other123", "full_name": "Jane Two"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);
    }

    #[actix_rt::test]
    async fn invalid_input_reports_every_error() {
        let app = service!(state());
        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({"username": "abc", "password": "123", "full_name": "Jane"}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body(resp).await["errors"].as_array().map(Vec::len), Some(2));
    }

    #[actix_rt::test]
    async fn malformed_json_is_a_problem_response() {
        let app = service!(state());
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body(resp).await["status"], 400);
    }

    #[actix_rt::test]
    async fn non_numeric_ids_are_rejected() {
        let app = service!(state());
        let req = test::TestRequest::get().uri("/api/articles/abc").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    async fn article_publish_flow() {
        let state = state();
        let admin = admin_cookie(&state);
        let app = service!(state);
        let author = sign_in!(&app, "janedoe1");

        let req = test::TestRequest::post()
            .uri("/api/articles")
            .cookie(author.clone())
            .set_json(json!({
                "title": "First post",
                "description": "intro",
                "content": "hello",
                "is_published": true,
                "media": [{"type": "image", "path": "/img/a.png"}]
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created = body(resp).await;
        assert_eq!(created["data"]["is_published"], false);
        assert_eq!(created["data"]["author"], "Jane Doe");
        let id = created["data"]["id"].as_i64().unwrap();
        let uri = format!("/api/articles/{id}");

        // Drafts are hidden from anonymous readers but not from their author.
        let req = test::TestRequest::get().uri(&uri).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
        let req = test::TestRequest::get().uri(&uri).cookie(author.clone()).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let publish = format!("{uri}/publish");
        let req = test::TestRequest::patch().uri(&publish).cookie(author.clone()).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get().uri("/api/articles/drafts").cookie(admin.clone()).to_request();
        let drafts = body(test::call_service(&app, req).await).await;
        assert_eq!(drafts["data"].as_array().map(Vec::len), Some(1));

        let req = test::TestRequest::patch().uri(&publish).cookie(admin).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body(resp).await["data"]["is_published"], true);

        let req = test::TestRequest::get().uri("/api/articles").to_request();
        let listed = body(test::call_service(&app, req).await).await;
        assert_eq!(listed["data"][0]["id"], id);
    }

    #[actix_rt::test]
    async fn likes_and_comments() {
        let app = service!(state());
        let author = sign_in!(&app, "janedoe1");
        let reader = sign_in!(&app, "johndoe1");

        let req = test::TestRequest::post()
            .uri("/api/articles")
            .cookie(author.clone())
            .set_json(json!({"title": "Post", "content": "body"}))
            .to_request();
        let id = body(test::call_service(&app, req).await).await["data"]["id"]
            .as_i64()
            .unwrap();

        let likes = format!("/api/articles/{id}/likes");
        let req = test::TestRequest::post().uri(&likes).cookie(reader.clone()).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
        let req = test::TestRequest::post().uri(&likes).cookie(reader.clone()).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::get().uri(&likes).to_request();
        let listed = body(test::call_service(&app, req).await).await;
        assert_eq!(listed["data"].as_array().map(Vec::len), Some(1));

        let req = test::TestRequest::delete().uri(&likes).cookie(reader.clone()).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        let req = test::TestRequest::delete().uri(&likes).cookie(reader.clone()).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let comments = format!("/api/articles/{id}/comments");
        let req = test::TestRequest::post()
            .uri(&comments)
            .cookie(reader.clone())
            .set_json(json!({"body": "Nice read"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let comment_id = body(resp).await["data"]["id"].as_i64().unwrap();

        // Only the commenter may remove it.
        let delete = format!("/api/comments/{comment_id}");
        let req = test::TestRequest::delete().uri(&delete).cookie(author).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
        let req = test::TestRequest::delete().uri(&delete).cookie(reader).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[actix_rt::test]
    async fn user_management_is_admin_only() {
        let state = state();
        let admin = admin_cookie(&state);
        let app = service!(state);
        let user = sign_in!(&app, "janedoe1");

        let req = test::TestRequest::get().uri("/api/users").cookie(user).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get().uri("/api/users").cookie(admin.clone()).to_request();
        let users = body(test::call_service(&app, req).await).await;
        let id = users["data"][0]["id"].as_i64().unwrap();

        let req = test::TestRequest::put()
            .uri(&format!("/api/users/{id}"))
            .cookie(admin.clone())
            .set_json(json!({"username": "janedoe1", "role": "superuser"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::put()
            .uri(&format!("/api/users/{id}"))
            .cookie(admin)
            .set_json(json!({"username": "janedoe1", "role": "admin"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body(resp).await["data"]["role"], "admin");
    }

    #[actix_rt::test]
    async fn profile_photo_upload_replaces_default() {
        let state = state();
        let upload_dir: PathBuf = state.upload_dir.clone();
        let app = service!(state);
        let user = sign_in!(&app, "janedoe1");

        let req = test::TestRequest::get().uri("/api/profile/photo").cookie(user.clone()).to_request();
        let before = body(test::call_service(&app, req).await).await;

        let req = test::TestRequest::put()
            .uri("/api/profile/photo")
            .cookie(user.clone())
            .insert_header(("content-type", "text/plain"))
            .set_payload("hello")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::put()
            .uri("/api/profile/photo")
            .cookie(user)
            .insert_header(("content-type", "image/png"))
            .set_payload(&b"\x89PNG\r\n\x1a\npixels"[..])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let after = body(resp).await;

        let path = after["data"]["path"].as_str().unwrap().to_string();
        assert_ne!(after["data"]["path"], before["data"]["path"]);
        assert!(path.ends_with(".png"));
        assert!(upload_dir.join(&path).exists());

        let _ = std::fs::remove_dir_all(upload_dir);
    }
}
