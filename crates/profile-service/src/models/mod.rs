//! Data models for the profile service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Profile record (maps to the `profiles` table).
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Profile {
    pub user_id: String,
    pub name: String,
    pub bio: String,
    pub avatar_url: String,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /profile` and `PUT /profile`. Absent fields are left
/// untouched on update and default to empty on create.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

/// A publication as reported by the feed service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    pub post_id: String,
    pub user_id: String,
    pub name: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user_id: String,
    pub name: String,
    pub bio: String,
    pub avatar_url: String,
    pub created_at: DateTime<Utc>,
    /// Empty when the user has no posts or the feed service was unreachable.
    pub posts: Vec<PostSummary>,
}

impl ProfileResponse {
    pub fn new(profile: Profile, posts: Vec<PostSummary>) -> Self {
        Self {
            user_id: profile.user_id,
            name: profile.name,
            bio: profile.bio,
            avatar_url: profile.avatar_url,
            created_at: profile.created_at,
            posts,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
