//! Profile repository.

use crate::models::Profile;
use async_trait::async_trait;
use common::store::StoreError;
use sqlx::PgPool;

/// Fields changed by an update. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

/// Persistence capability for profiles, keyed by user id.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// `StoreError::Conflict` if the user already has a profile.
    async fn create(&self, profile: Profile) -> Result<Profile, StoreError>;

    async fn find(&self, user_id: &str) -> Result<Profile, StoreError>;

    async fn update(&self, user_id: &str, changes: ProfileChanges) -> Result<Profile, StoreError>;

    /// Hard delete. `StoreError::NotFound` if no row matched.
    async fn delete(&self, user_id: &str) -> Result<(), StoreError>;

    async fn health(&self) -> Result<(), StoreError>;
}

/// Postgres-backed [`ProfileRepository`].
#[derive(Clone)]
pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn create(&self, profile: Profile) -> Result<Profile, StoreError> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (user_id, name, bio, avatar_url)
            VALUES ($1, $2, $3, $4)
            RETURNING user_id, name, bio, avatar_url, created_at
            "#,
        )
        .bind(&profile.user_id)
        .bind(&profile.name)
        .bind(&profile.bio)
        .bind(&profile.avatar_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn find(&self, user_id: &str) -> Result<Profile, StoreError> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT user_id, name, bio, avatar_url, created_at
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn update(&self, user_id: &str, changes: ProfileChanges) -> Result<Profile, StoreError> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET name = COALESCE($2, name),
                bio = COALESCE($3, bio),
                avatar_url = COALESCE($4, avatar_url)
            WHERE user_id = $1
            RETURNING user_id, name, bio, avatar_url, created_at
            "#,
        )
        .bind(user_id)
        .bind(changes.name)
        .bind(changes.bio)
        .bind(changes.avatar_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn delete(&self, user_id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    async fn health(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
