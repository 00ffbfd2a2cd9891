//! Profile and profile photo handlers.

use std::path::{Path, PathBuf};

use actix_web::{HttpRequest, HttpResponse, http::header, web};
use chrono::Utc;
use uuid::Uuid;

use quill_core::parse_id;
use quill_core::services::UpdateProfileInput;
use quill_shared::ApiResponse;
use quill_shared::dto::UpdateProfileRequest;

use super::mapping;
use crate::middleware::auth::{AdminIdentity, Identity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Largest accepted profile photo.
pub const MAX_PHOTO_BYTES: usize = 2 * 1024 * 1024;

/// GET /api/profile
pub async fn own(identity: Identity, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let profile = state.profiles.find_by_user_id(identity.0.user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(mapping::profile(profile))))
}

/// PUT /api/profile
pub async fn update_own(
    identity: Identity,
    state: web::Data<AppState>,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let profile = state
        .profiles
        .update(
            &identity.0,
            UpdateProfileInput {
                full_name: req.full_name,
                gender: req.gender,
                birth_date: req.birth_date,
                phone_number: req.phone_number,
                address: req.address,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        mapping::profile(profile),
        "user profile updated successfully",
    )))
}

/// GET /api/profiles
pub async fn list(admin: AdminIdentity, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let profiles = state.profiles.find_all(&admin.0).await?;
    let profiles: Vec<_> = profiles.into_iter().map(mapping::profile).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(profiles)))
}

/// GET /api/profiles/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let user_id = parse_id(&path)?;
    let profile = state.profiles.find_by_user_id(user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(mapping::profile(profile))))
}

/// GET /api/profile/photo
pub async fn own_photo(identity: Identity, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let photo = state.photos.find_by_user_id(identity.0.user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(mapping::photo(photo))))
}

/// Accepted image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Svg,
}

impl ImageKind {
    fn from_content_type(value: &str) -> Option<Self> {
        let mime = value.split(';').next().unwrap_or_default().trim();
        match mime.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/gif" => Some(Self::Gif),
            "image/svg+xml" => Some(Self::Svg),
            _ => None,
        }
    }

    fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Svg => "svg",
        }
    }

    /// Cheap signature check so the declared type matches the bytes.
    fn matches(self, bytes: &[u8]) -> bool {
        match self {
            Self::Jpeg => bytes.starts_with(&[0xFF, 0xD8, 0xFF]),
            Self::Png => bytes.starts_with(b"\x89PNG\r\n\x1a\n"),
            Self::Gif => bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a"),
            Self::Svg => {
                let head = &bytes[..bytes.len().min(1024)];
                String::from_utf8_lossy(head).contains("<svg")
            }
        }
    }
}

fn check_upload(content_type: Option<&str>, body: &[u8]) -> Result<ImageKind, AppError> {
    let kind = content_type
        .and_then(ImageKind::from_content_type)
        .ok_or_else(|| {
            AppError::BadRequest("profile photo must be a JPEG, PNG, GIF or SVG image".into())
        })?;

    if body.is_empty() {
        return Err(AppError::BadRequest("profile photo is empty".into()));
    }
    if body.len() > MAX_PHOTO_BYTES {
        return Err(AppError::BadRequest("profile photo must not exceed 2 MiB".into()));
    }
    if !kind.matches(body) {
        return Err(AppError::BadRequest(
            "profile photo content does not match its type".into(),
        ));
    }
    Ok(kind)
}

/// `<user_id>_<unix_ts>_<nonce>.<ext>`; the nonce keeps two uploads in the same
/// second from sharing a file.
fn photo_file_name(user_id: i64, kind: ImageKind) -> String {
    format!(
        "{}_{}_{}.{}",
        user_id,
        Utc::now().timestamp(),
        Uuid::new_v4().simple(),
        kind.extension()
    )
}

/// Only bare file names stored by this server are ever deleted.
fn stored_file(dir: &Path, name: &str) -> Option<PathBuf> {
    let candidate = Path::new(name);
    (candidate.file_name() == Some(candidate.as_os_str())).then(|| dir.join(candidate))
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), error = %e, "Could not remove photo file");
    }
}

/// PUT /api/profile/photo
///
/// The body is the raw image; its type comes from `Content-Type`.
pub async fn upload_photo(
    identity: Identity,
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let actor = identity.0;
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let kind = check_upload(content_type, &body)?;

    let file_name = photo_file_name(actor.user_id, kind);
    let target = state.upload_dir.join(&file_name);

    tokio::fs::create_dir_all(&state.upload_dir)
        .await
        .map_err(|e| AppError::Internal(format!("create upload dir: {e}")))?;
    tokio::fs::write(&target, &body)
        .await
        .map_err(|e| AppError::Internal(format!("write photo: {e}")))?;

    let replacement = match state.photos.replace(&actor, &file_name).await {
        Ok(replacement) => replacement,
        Err(e) => {
            remove_quietly(&target).await;
            return Err(e.into());
        }
    };

    if let Some(old) = replacement
        .previous
        .as_deref()
        .and_then(|name| stored_file(&state.upload_dir, name))
    {
        remove_quietly(&old).await;
    }

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        mapping::photo(replacement.photo),
        "user profile photo updated successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_parameters_are_ignored() {
        assert_eq!(
            ImageKind::from_content_type("image/PNG; charset=binary"),
            Some(ImageKind::Png)
        );
        assert_eq!(ImageKind::from_content_type("text/plain"), None);
    }

    #[test]
    fn uploads_are_checked_for_type_size_and_signature() {
        let png = b"\x89PNG\r\n\x1a\nrest".to_vec();
        assert_eq!(check_upload(Some("image/png"), &png).unwrap(), ImageKind::Png);

        assert!(check_upload(None, &png).is_err());
        assert!(check_upload(Some("image/jpeg"), &png).is_err());
        assert!(check_upload(Some("image/png"), &[]).is_err());

        let mut huge = png.clone();
        huge.resize(MAX_PHOTO_BYTES + 1, 0);
        assert!(check_upload(Some("image/png"), &huge).is_err());
    }

    #[test]
    fn uploads_in_the_same_second_get_distinct_names() {
        let first = photo_file_name(7, ImageKind::Png);
        let second = photo_file_name(7, ImageKind::Png);

        assert_ne!(first, second);
        assert!(first.starts_with("7_"));
        assert!(first.ends_with(".png"));
        assert!(stored_file(Path::new("/srv/photos"), &first).is_some());
    }

    #[test]
    fn only_bare_file_names_are_removed() {
        let dir = Path::new("/srv/photos");
        assert_eq!(
            stored_file(dir, "3_1700000000.png"),
            Some(dir.join("3_1700000000.png"))
        );
        assert_eq!(stored_file(dir, "../etc/passwd"), None);
        assert_eq!(stored_file(dir, "/etc/passwd"), None);
    }
}
