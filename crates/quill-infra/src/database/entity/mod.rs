//! SeaORM entities, one per table.

pub mod article;
pub mod article_media;
pub mod comment;
pub mod like;
pub mod user;
pub mod user_profile;
pub mod user_profile_photo;
