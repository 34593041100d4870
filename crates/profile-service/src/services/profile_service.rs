//! Profile business logic.
//!
//! Reads are enriched with the user's publications from the feed service on a
//! best-effort basis. Deletes cascade to the auth service, also best effort:
//! the local delete stands even if the cascade fails.

use crate::errors::ProfileError;
use crate::models::{Profile, ProfileRequest, ProfileResponse};
use crate::repositories::{ProfileChanges, ProfileRepository};
use crate::services::{AccountRemover, PublicationSource};
use chrono::Utc;
use common::observability::metrics::record_compensation;
use std::sync::Arc;
use tracing::{info, instrument, warn};

const MIN_NAME_CHARS: usize = 3;
const MAX_NAME_CHARS: usize = 30;
const MAX_BIO_CHARS: usize = 500;
const AVATAR_EXTENSIONS: [&str; 3] = [".jpg", ".jpeg", ".png"];

#[derive(Clone)]
pub struct ProfileService {
    profiles: Arc<dyn ProfileRepository>,
    publications: Arc<dyn PublicationSource>,
    accounts: Arc<dyn AccountRemover>,
}

impl ProfileService {
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        publications: Arc<dyn PublicationSource>,
        accounts: Arc<dyn AccountRemover>,
    ) -> Self {
        Self {
            profiles,
            publications,
            accounts,
        }
    }

    /// Create the caller's profile. Absent fields default to empty.
    #[instrument(skip_all, name = "profile.service.create", fields(user_id = %user_id))]
    pub async fn create(
        &self,
        user_id: &str,
        request: ProfileRequest,
    ) -> Result<ProfileResponse, ProfileError> {
        validate_request(&request)?;

        let profile = self
            .profiles
            .create(Profile {
                user_id: user_id.to_string(),
                name: request.name.unwrap_or_default(),
                bio: request.bio.unwrap_or_default(),
                avatar_url: request.avatar_url.unwrap_or_default(),
                created_at: Utc::now(),
            })
            .await?;

        info!(target: "profile.service", user_id = %user_id, "Profile created");
        Ok(ProfileResponse::new(profile, Vec::new()))
    }

    /// Fetch a profile with the user's posts attached.
    #[instrument(skip_all, name = "profile.service.get", fields(user_id = %user_id))]
    pub async fn get(&self, user_id: &str) -> Result<ProfileResponse, ProfileError> {
        let profile = self.profiles.find(user_id).await?;
        Ok(self.enrich(profile).await)
    }

    /// Partial update: only fields present in `request` change.
    #[instrument(skip_all, name = "profile.service.update", fields(user_id = %user_id))]
    pub async fn update(
        &self,
        user_id: &str,
        request: ProfileRequest,
    ) -> Result<ProfileResponse, ProfileError> {
        validate_request(&request)?;

        let profile = self
            .profiles
            .update(
                user_id,
                ProfileChanges {
                    name: request.name,
                    bio: request.bio,
                    avatar_url: request.avatar_url,
                },
            )
            .await?;

        Ok(self.enrich(profile).await)
    }

    /// Delete the profile, then ask the auth service to drop the account.
    #[instrument(skip_all, name = "profile.service.delete", fields(user_id = %user_id))]
    pub async fn delete(&self, user_id: &str) -> Result<(), ProfileError> {
        self.profiles.delete(user_id).await?;
        info!(target: "profile.service", user_id = %user_id, "Profile deleted");

        match self.accounts.remove_account(user_id).await {
            Ok(()) => record_compensation("profile_delete_cascade", "success"),
            Err(e) => {
                // No reconciliation exists: the account outlives its profile.
                warn!(target: "profile.service", user_id = %user_id, error = %e, "Account removal cascade failed");
                record_compensation("profile_delete_cascade", "failed");
            }
        }

        Ok(())
    }

    pub async fn health(&self) -> Result<(), ProfileError> {
        self.profiles
            .health()
            .await
            .map_err(|e| ProfileError::Unavailable(e.to_string()))
    }

    async fn enrich(&self, profile: Profile) -> ProfileResponse {
        let posts = match self.publications.list_for_user(&profile.user_id).await {
            Ok(posts) => posts,
            Err(e) => {
                warn!(target: "profile.service", user_id = %profile.user_id, error = %e, "Feed enrichment failed, returning profile without posts");
                Vec::new()
            }
        };

        ProfileResponse::new(profile, posts)
    }
}

/// Validate the fields present in a create or update request.
pub fn validate_request(request: &ProfileRequest) -> Result<(), ProfileError> {
    if let Some(name) = &request.name {
        validate_name(name)?;
    }

    if let Some(bio) = &request.bio {
        if bio.chars().count() > MAX_BIO_CHARS {
            return Err(ProfileError::Validation(
                "bio must be at most 500 characters".to_string(),
            ));
        }
    }

    if let Some(avatar_url) = &request.avatar_url {
        if !is_valid_avatar_url(avatar_url) {
            return Err(ProfileError::Validation(
                "avatar_url must be an http(s) URL ending in .jpg, .jpeg or .png".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_name(name: &str) -> Result<(), ProfileError> {
    let chars = name.chars().count();
    let charset_ok = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

    if !(MIN_NAME_CHARS..=MAX_NAME_CHARS).contains(&chars) || !charset_ok {
        return Err(ProfileError::Validation(
            "name must be 3-30 characters of letters, digits, '_', '-' or '.'".to_string(),
        ));
    }

    Ok(())
}

/// Empty, or `http(s)://host/...` whose path ends in an image extension.
fn is_valid_avatar_url(url: &str) -> bool {
    if url.is_empty() {
        return true;
    }

    let Some(rest) = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
    else {
        return false;
    };

    let rest = rest.split(['?', '#']).next().unwrap_or_default();
    let Some((host, path)) = rest.split_once('/') else {
        return false;
    };

    !host.is_empty() && AVATAR_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}
