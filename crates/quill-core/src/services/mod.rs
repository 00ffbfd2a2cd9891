//! Domain services. Each public operation runs in exactly one transaction.

mod article;
mod auth;
mod comment;
mod like;
mod profile;
mod user;

pub use article::{ArticleService, CreateArticleInput, MediaInput, UpdateArticleInput};
pub use auth::{AuthService, LoginInput, RegisterInput, Session};
pub use comment::{CommentService, CreateCommentInput};
pub use like::LikeService;
pub use profile::{PhotoService, ProfileService, UpdateProfileInput};
pub use user::{UpdateUserInput, UserService};
