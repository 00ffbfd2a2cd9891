//! Domain entities - the core business objects.

mod article;
mod comment;
mod like;
mod profile;
mod user;

pub use article::{
    Article, ArticleChanges, ArticleFilter, ArticleMedia, NewArticle, NewArticleMedia, Visibility,
};
pub use comment::{Comment, NewComment};
pub use like::Like;
pub use profile::{
    DEFAULT_PROFILE_PHOTO, NewUserProfile, PhotoReplacement, RegisteredUser, UserProfile,
    UserProfilePhoto,
};
pub use user::{NewUser, Role, User};
