//! Comment repository.

use crate::models::Comment;
use async_trait::async_trait;
use common::store::StoreError;
use sqlx::PgPool;
use uuid::Uuid;

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: Comment) -> Result<Comment, StoreError>;

    async fn find(&self, comment_id: Uuid) -> Result<Comment, StoreError>;

    /// Comments on one publication, newest first.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, StoreError>;

    async fn update(&self, comment_id: Uuid, content: &str) -> Result<Comment, StoreError>;

    async fn delete(&self, comment_id: Uuid) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn create(&self, comment: Comment) -> Result<Comment, StoreError> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (comment_id, post_id, user_id, name, content, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING comment_id, post_id, user_id, name, content, created_at
            "#,
        )
        .bind(comment.comment_id)
        .bind(comment.post_id)
        .bind(&comment.user_id)
        .bind(&comment.name)
        .bind(&comment.content)
        .bind(comment.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn find(&self, comment_id: Uuid) -> Result<Comment, StoreError> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT comment_id, post_id, user_id, name, content, created_at
            FROM comments
            WHERE comment_id = $1
            "#,
        )
        .bind(comment_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, StoreError> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT comment_id, post_id, user_id, name, content, created_at
            FROM comments
            WHERE post_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    async fn update(&self, comment_id: Uuid, content: &str) -> Result<Comment, StoreError> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET content = $2
            WHERE comment_id = $1
            RETURNING comment_id, post_id, user_id, name, content, created_at
            "#,
        )
        .bind(comment_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn delete(&self, comment_id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM comments WHERE comment_id = $1")
            .bind(comment_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }
}
