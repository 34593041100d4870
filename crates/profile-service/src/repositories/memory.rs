//! In-memory [`ProfileRepository`] used by tests and the local harness.

use crate::models::Profile;
use crate::repositories::{ProfileChanges, ProfileRepository};
use async_trait::async_trait;
use chrono::Utc;
use common::store::StoreError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

pub struct InMemoryProfileRepository {
    profiles: RwLock<HashMap<String, Profile>>,
    healthy: AtomicBool,
}

impl Default for InMemoryProfileRepository {
    fn default() -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
            healthy: AtomicBool::new(true),
        }
    }
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub async fn contains(&self, user_id: &str) -> bool {
        self.profiles.read().await.contains_key(user_id)
    }

    fn check_health(&self) -> Result<(), StoreError> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Backend("in-memory store marked unhealthy".to_string()))
        }
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn create(&self, profile: Profile) -> Result<Profile, StoreError> {
        self.check_health()?;
        let mut profiles = self.profiles.write().await;

        if profiles.contains_key(&profile.user_id) {
            return Err(StoreError::Conflict("profiles_pkey".to_string()));
        }

        let created = Profile {
            created_at: Utc::now(),
            ..profile
        };
        profiles.insert(created.user_id.clone(), created.clone());

        Ok(created)
    }

    async fn find(&self, user_id: &str) -> Result<Profile, StoreError> {
        self.check_health()?;
        self.profiles
            .read()
            .await
            .get(user_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, user_id: &str, changes: ProfileChanges) -> Result<Profile, StoreError> {
        self.check_health()?;
        let mut profiles = self.profiles.write().await;
        let profile = profiles.get_mut(user_id).ok_or(StoreError::NotFound)?;

        if let Some(name) = changes.name {
            profile.name = name;
        }
        if let Some(bio) = changes.bio {
            profile.bio = bio;
        }
        if let Some(avatar_url) = changes.avatar_url {
            profile.avatar_url = avatar_url;
        }

        Ok(profile.clone())
    }

    async fn delete(&self, user_id: &str) -> Result<(), StoreError> {
        self.check_health()?;
        self.profiles
            .write()
            .await
            .remove(user_id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn health(&self) -> Result<(), StoreError> {
        self.check_health()
    }
}
