//! In-memory feed store used by tests and the local harness.
//!
//! One struct backs both repositories so that deleting a publication can drop
//! its comments, like the `ON DELETE CASCADE` foreign key does in Postgres.

use crate::models::{Comment, Publication};
use crate::repositories::{CommentRepository, PublicationRepository};
use async_trait::async_trait;
use common::store::StoreError;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    /// Insertion order; ties on `created_at` keep it.
    publications: Vec<Publication>,
    comments: Vec<Comment>,
}

pub struct InMemoryFeedStore {
    tables: RwLock<Tables>,
    healthy: AtomicBool,
}

impl Default for InMemoryFeedStore {
    fn default() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            healthy: AtomicBool::new(true),
        }
    }
}

impl InMemoryFeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub async fn publication_count(&self) -> usize {
        self.tables.read().await.publications.len()
    }

    pub async fn comment_count(&self) -> usize {
        self.tables.read().await.comments.len()
    }

    fn check_health(&self) -> Result<(), StoreError> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Backend("in-memory store marked unhealthy".to_string()))
        }
    }
}

/// Newest first. `sort_by` is stable, so equal timestamps keep insertion order.
fn newest_first<T>(items: impl Iterator<Item = T>, key: impl Fn(&T) -> i64) -> Vec<T> {
    let mut items: Vec<T> = items.collect();
    items.sort_by(|a, b| key(b).cmp(&key(a)));
    items
}

#[async_trait]
impl PublicationRepository for InMemoryFeedStore {
    async fn create(&self, publication: Publication) -> Result<Publication, StoreError> {
        self.check_health()?;
        let mut tables = self.tables.write().await;

        if tables
            .publications
            .iter()
            .any(|p| p.post_id == publication.post_id)
        {
            return Err(StoreError::Conflict("publications_pkey".to_string()));
        }
        tables.publications.push(publication.clone());

        Ok(publication)
    }

    async fn find(&self, post_id: Uuid) -> Result<Publication, StoreError> {
        self.check_health()?;
        self.tables
            .read()
            .await
            .publications
            .iter()
            .find(|p| p.post_id == post_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list(&self) -> Result<Vec<Publication>, StoreError> {
        self.check_health()?;
        let tables = self.tables.read().await;
        Ok(newest_first(tables.publications.iter().cloned(), |p| {
            p.created_at.timestamp_micros()
        }))
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Publication>, StoreError> {
        self.check_health()?;
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables
                .publications
                .iter()
                .filter(|p| p.user_id == user_id)
                .cloned(),
            |p| p.created_at.timestamp_micros(),
        ))
    }

    async fn update(
        &self,
        post_id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<Publication, StoreError> {
        self.check_health()?;
        let mut tables = self.tables.write().await;
        let publication = tables
            .publications
            .iter_mut()
            .find(|p| p.post_id == post_id)
            .ok_or(StoreError::NotFound)?;

        publication.title = title.to_string();
        publication.content = content.to_string();

        Ok(publication.clone())
    }

    async fn delete(&self, post_id: Uuid) -> Result<(), StoreError> {
        self.check_health()?;
        let mut tables = self.tables.write().await;

        let before = tables.publications.len();
        tables.publications.retain(|p| p.post_id != post_id);
        if tables.publications.len() == before {
            return Err(StoreError::NotFound);
        }
        tables.comments.retain(|c| c.post_id != post_id);

        Ok(())
    }

    async fn health(&self) -> Result<(), StoreError> {
        self.check_health()
    }
}

#[async_trait]
impl CommentRepository for InMemoryFeedStore {
    async fn create(&self, comment: Comment) -> Result<Comment, StoreError> {
        self.check_health()?;
        let mut tables = self.tables.write().await;

        // Mirrors the foreign key on comments.post_id.
        if !tables.publications.iter().any(|p| p.post_id == comment.post_id) {
            return Err(StoreError::NotFound);
        }
        tables.comments.push(comment.clone());

        Ok(comment)
    }

    async fn find(&self, comment_id: Uuid) -> Result<Comment, StoreError> {
        self.check_health()?;
        self.tables
            .read()
            .await
            .comments
            .iter()
            .find(|c| c.comment_id == comment_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, StoreError> {
        self.check_health()?;
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables
                .comments
                .iter()
                .filter(|c| c.post_id == post_id)
                .cloned(),
            |c| c.created_at.timestamp_micros(),
        ))
    }

    async fn update(&self, comment_id: Uuid, content: &str) -> Result<Comment, StoreError> {
        self.check_health()?;
        let mut tables = self.tables.write().await;
        let comment = tables
            .comments
            .iter_mut()
            .find(|c| c.comment_id == comment_id)
            .ok_or(StoreError::NotFound)?;

        comment.content = content.to_string();

        Ok(comment.clone())
    }

    async fn delete(&self, comment_id: Uuid) -> Result<(), StoreError> {
        self.check_health()?;
        let mut tables = self.tables.write().await;

        let before = tables.comments.len();
        tables.comments.retain(|c| c.comment_id != comment_id);
        if tables.comments.len() == before {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn publication_at(minute: u32) -> Publication {
        Publication {
            post_id: Uuid::new_v4(),
            user_id: "u1".to_string(),
            name: "alice".to_string(),
            title: format!("post {minute}"),
            content: "body".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, minute, 0).unwrap(),
        }
    }

    fn comment_on(post_id: Uuid, offset_secs: i64) -> Comment {
        Comment {
            comment_id: Uuid::new_v4(),
            post_id,
            user_id: "u2".to_string(),
            name: "bob".to_string(),
            content: format!("comment {offset_secs}"),
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
                + Duration::seconds(offset_secs),
        }
    }

    #[tokio::test]
    async fn test_list_is_newest_first_regardless_of_insertion_order() {
        let store = InMemoryFeedStore::new();
        for minute in [5, 1, 9, 3] {
            PublicationRepository::create(&store, publication_at(minute))
                .await
                .unwrap();
        }

        let titles: Vec<String> = store.list().await.unwrap().into_iter().map(|p| p.title).collect();
        assert_eq!(titles, vec!["post 9", "post 5", "post 3", "post 1"]);
    }

    #[tokio::test]
    async fn test_equal_timestamps_keep_insertion_order() {
        let store = InMemoryFeedStore::new();
        let mut first = publication_at(1);
        first.title = "first".to_string();
        let mut second = publication_at(1);
        second.title = "second".to_string();

        PublicationRepository::create(&store, first).await.unwrap();
        PublicationRepository::create(&store, second).await.unwrap();

        let titles: Vec<String> = store.list().await.unwrap().into_iter().map(|p| p.title).collect();
        assert_eq!(titles, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_comments_are_newest_first() {
        let store = InMemoryFeedStore::new();
        let post = PublicationRepository::create(&store, publication_at(0))
            .await
            .unwrap();
        for offset in [20, 10, 30] {
            CommentRepository::create(&store, comment_on(post.post_id, offset))
                .await
                .unwrap();
        }

        let contents: Vec<String> = store
            .list_for_post(post.post_id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.content)
            .collect();
        assert_eq!(contents, vec!["comment 30", "comment 20", "comment 10"]);
    }

    #[tokio::test]
    async fn test_delete_publication_cascades_to_comments() {
        let store = InMemoryFeedStore::new();
        let post = PublicationRepository::create(&store, publication_at(0))
            .await
            .unwrap();
        CommentRepository::create(&store, comment_on(post.post_id, 1))
            .await
            .unwrap();

        PublicationRepository::delete(&store, post.post_id)
            .await
            .unwrap();

        assert_eq!(store.publication_count().await, 0);
        assert_eq!(store.comment_count().await, 0);
    }

    #[tokio::test]
    async fn test_comment_on_missing_publication_is_not_found() {
        let store = InMemoryFeedStore::new();

        let result = CommentRepository::create(&store, comment_on(Uuid::new_v4(), 1)).await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }
}
