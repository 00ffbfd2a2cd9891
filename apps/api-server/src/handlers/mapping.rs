//! Domain entities to wire DTOs.

use quill_core::domain::{
    Article, Comment, Like, RegisteredUser, User, UserProfile, UserProfilePhoto,
};
use quill_core::ports::TokenClaims;
use quill_shared::dto::{
    ArticleResponse, CommentResponse, LikeResponse, MediaResponse, PhotoResponse,
    ProfileResponse, RegisteredResponse, SessionResponse, UserResponse,
};

pub fn user(user: User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username,
        role: user.role.to_string(),
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}

pub fn profile(profile: UserProfile) -> ProfileResponse {
    ProfileResponse {
        user_id: profile.user_id,
        full_name: profile.full_name,
        gender: profile.gender,
        birth_date: profile.birth_date,
        phone_number: profile.phone_number,
        address: profile.address,
        created_at: profile.created_at,
        updated_at: profile.updated_at,
    }
}

pub fn photo(photo: UserProfilePhoto) -> PhotoResponse {
    PhotoResponse {
        user_id: photo.user_id,
        path: photo.path,
        updated_at: photo.updated_at,
    }
}

pub fn registered(registered: RegisteredUser) -> RegisteredResponse {
    RegisteredResponse {
        user: user(registered.user),
        profile: profile(registered.profile),
        photo: photo(registered.photo),
    }
}

pub fn session(claims: TokenClaims) -> SessionResponse {
    SessionResponse {
        user_id: claims.user_id,
        username: claims.username,
        role: claims.role.to_string(),
        expires_at: claims.expires_at,
    }
}

pub fn article(article: Article) -> ArticleResponse {
    ArticleResponse {
        id: article.id,
        user_id: article.user_id,
        author: article.author,
        title: article.title,
        description: article.description,
        content: article.content,
        is_published: article.is_published,
        media: article
            .media
            .into_iter()
            .map(|m| MediaResponse {
                id: m.id,
                media_type: m.media_type,
                path: m.path,
            })
            .collect(),
        created_at: article.created_at,
        updated_at: article.updated_at,
    }
}

pub fn articles(articles: Vec<Article>) -> Vec<ArticleResponse> {
    articles.into_iter().map(article).collect()
}

pub fn like(like: Like) -> LikeResponse {
    LikeResponse {
        id: like.id,
        user_id: like.user_id,
        article_id: like.article_id,
        created_at: like.created_at,
    }
}

pub fn comment(comment: Comment) -> CommentResponse {
    CommentResponse {
        id: comment.id,
        user_id: comment.user_id,
        article_id: comment.article_id,
        body: comment.body,
        created_at: comment.created_at,
        updated_at: comment.updated_at,
    }
}
