//! Data models for the feed service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Publication record (maps to the `publications` table).
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Publication {
    pub post_id: Uuid,
    pub user_id: String,
    /// Author display name at the time of writing.
    pub name: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Comment record (maps to the `comments` table).
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Comment {
    pub comment_id: Uuid,
    pub post_id: Uuid,
    pub user_id: String,
    pub name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /feed/publications` and `PUT /feed/publications/:id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublicationRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Body of `POST /feed/comments`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub post_id: String,
    #[serde(default)]
    pub content: String,
}

/// Body of `PUT /feed/comments/:id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCommentRequest {
    #[serde(default)]
    pub content: String,
}

/// Query of `GET /feed/comments`.
#[derive(Debug, Deserialize)]
pub struct CommentsQuery {
    pub post_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationResponse {
    pub post_id: Uuid,
    pub user_id: String,
    pub name: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<Publication> for PublicationResponse {
    fn from(p: Publication) -> Self {
        Self {
            post_id: p.post_id,
            user_id: p.user_id,
            name: p.name,
            title: p.title,
            content: p.content,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentResponse {
    pub comment_id: Uuid,
    pub post_id: Uuid,
    pub user_id: String,
    pub name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(c: Comment) -> Self {
        Self {
            comment_id: c.comment_id,
            post_id: c.post_id,
            user_id: c.user_id,
            name: c.name,
            content: c.content,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
