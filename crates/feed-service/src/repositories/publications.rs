//! Publication repository.

use crate::models::Publication;
use async_trait::async_trait;
use common::store::StoreError;
use sqlx::PgPool;
use uuid::Uuid;

/// Persistence capability for publications. Lists are newest first.
#[async_trait]
pub trait PublicationRepository: Send + Sync {
    async fn create(&self, publication: Publication) -> Result<Publication, StoreError>;

    async fn find(&self, post_id: Uuid) -> Result<Publication, StoreError>;

    async fn list(&self) -> Result<Vec<Publication>, StoreError>;

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Publication>, StoreError>;

    async fn update(
        &self,
        post_id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<Publication, StoreError>;

    /// Hard delete; the publication's comments go with it.
    async fn delete(&self, post_id: Uuid) -> Result<(), StoreError>;

    async fn health(&self) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct PgPublicationRepository {
    pool: PgPool,
}

impl PgPublicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PublicationRepository for PgPublicationRepository {
    async fn create(&self, publication: Publication) -> Result<Publication, StoreError> {
        let publication = sqlx::query_as::<_, Publication>(
            r#"
            INSERT INTO publications (post_id, user_id, name, title, content, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING post_id, user_id, name, title, content, created_at
            "#,
        )
        .bind(publication.post_id)
        .bind(&publication.user_id)
        .bind(&publication.name)
        .bind(&publication.title)
        .bind(&publication.content)
        .bind(publication.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(publication)
    }

    async fn find(&self, post_id: Uuid) -> Result<Publication, StoreError> {
        let publication = sqlx::query_as::<_, Publication>(
            r#"
            SELECT post_id, user_id, name, title, content, created_at
            FROM publications
            WHERE post_id = $1
            "#,
        )
        .bind(post_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(publication)
    }

    async fn list(&self) -> Result<Vec<Publication>, StoreError> {
        let publications = sqlx::query_as::<_, Publication>(
            r#"
            SELECT post_id, user_id, name, title, content, created_at
            FROM publications
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(publications)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Publication>, StoreError> {
        let publications = sqlx::query_as::<_, Publication>(
            r#"
            SELECT post_id, user_id, name, title, content, created_at
            FROM publications
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(publications)
    }

    async fn update(
        &self,
        post_id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<Publication, StoreError> {
        let publication = sqlx::query_as::<_, Publication>(
            r#"
            UPDATE publications
            SET title = $2, content = $3
            WHERE post_id = $1
            RETURNING post_id, user_id, name, title, content, created_at
            "#,
        )
        .bind(post_id)
        .bind(title)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(publication)
    }

    async fn delete(&self, post_id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM publications WHERE post_id = $1")
            .bind(post_id)
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
