//! Publication and comment business logic.
//!
//! Writes snapshot the author's display name from the profile service; a
//! failed lookup fails the write. Ownership is checked by the handlers before
//! any mutating method here is called.

use crate::errors::FeedError;
use crate::models::{Comment, CommentRequest, Publication, PublicationRequest};
use crate::repositories::{CommentRepository, PublicationRepository};
use crate::services::AuthorDirectory;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

const MAX_TITLE_CHARS: usize = 300;
const MAX_CONTENT_CHARS: usize = 10_000;

#[derive(Clone)]
pub struct FeedService {
    publications: Arc<dyn PublicationRepository>,
    comments: Arc<dyn CommentRepository>,
    authors: Arc<dyn AuthorDirectory>,
}

/// Ids that are not UUIDs cannot name a stored record.
fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

impl FeedService {
    pub fn new(
        publications: Arc<dyn PublicationRepository>,
        comments: Arc<dyn CommentRepository>,
        authors: Arc<dyn AuthorDirectory>,
    ) -> Self {
        Self {
            publications,
            comments,
            authors,
        }
    }

    async fn author_name(&self, user_id: &str) -> Result<String, FeedError> {
        self.authors
            .display_name(user_id)
            .await
            .map_err(|_| FeedError::ProfileUnavailable)
    }

    #[instrument(skip_all, name = "feed.service.create_publication", fields(user_id = %user_id))]
    pub async fn create_publication(
        &self,
        user_id: &str,
        request: PublicationRequest,
    ) -> Result<Publication, FeedError> {
        validate_publication(&request)?;
        let name = self.author_name(user_id).await?;

        let publication = self
            .publications
            .create(Publication {
                post_id: Uuid::new_v4(),
                user_id: user_id.to_string(),
                name,
                title: request.title,
                content: request.content,
                created_at: Utc::now(),
            })
            .await
            .map_err(FeedError::for_publication)?;

        info!(target: "feed.service", post_id = %publication.post_id, "Publication created");
        Ok(publication)
    }

    pub async fn publication(&self, post_id: &str) -> Result<Publication, FeedError> {
        let post_id = parse_id(post_id).ok_or(FeedError::PublicationNotFound)?;
        self.publications
            .find(post_id)
            .await
            .map_err(FeedError::for_publication)
    }

    pub async fn list_publications(&self) -> Result<Vec<Publication>, FeedError> {
        self.publications
            .list()
            .await
            .map_err(FeedError::for_publication)
    }

    pub async fn list_user_publications(&self, user_id: &str) -> Result<Vec<Publication>, FeedError> {
        self.publications
            .list_by_user(user_id)
            .await
            .map_err(FeedError::for_publication)
    }

    /// Replace title and content. The caller has checked ownership.
    #[instrument(skip_all, name = "feed.service.update_publication", fields(post_id = %post_id))]
    pub async fn update_publication(
        &self,
        post_id: Uuid,
        request: PublicationRequest,
    ) -> Result<Publication, FeedError> {
        validate_publication(&request)?;
        self.publications
            .update(post_id, &request.title, &request.content)
            .await
            .map_err(FeedError::for_publication)
    }

    #[instrument(skip_all, name = "feed.service.delete_publication", fields(post_id = %post_id))]
    pub async fn delete_publication(&self, post_id: Uuid) -> Result<(), FeedError> {
        self.publications
            .delete(post_id)
            .await
            .map_err(FeedError::for_publication)?;

        info!(target: "feed.service", post_id = %post_id, "Publication deleted");
        Ok(())
    }

    /// Comment on an existing publication. The parent is checked before the
    /// author lookup, so a bad `post_id` never costs a peer call.
    #[instrument(skip_all, name = "feed.service.create_comment", fields(user_id = %user_id))]
    pub async fn create_comment(
        &self,
        user_id: &str,
        request: CommentRequest,
    ) -> Result<Comment, FeedError> {
        let post_id = validate_comment(&request)?;
        self.publications
            .find(post_id)
            .await
            .map_err(FeedError::for_publication)?;

        let name = self.author_name(user_id).await?;

        self.comments
            .create(Comment {
                comment_id: Uuid::new_v4(),
                post_id,
                user_id: user_id.to_string(),
                name,
                content: request.content,
                created_at: Utc::now(),
            })
            .await
            // The parent may have been deleted since the check above.
            .map_err(FeedError::for_publication)
    }

    pub async fn comment(&self, comment_id: &str) -> Result<Comment, FeedError> {
        let comment_id = parse_id(comment_id).ok_or(FeedError::CommentNotFound)?;
        self.comments
            .find(comment_id)
            .await
            .map_err(FeedError::for_comment)
    }

    pub async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>, FeedError> {
        let post_id = parse_id(post_id)
            .ok_or_else(|| FeedError::Validation("post_id must be a UUID".to_string()))?;
        self.comments
            .list_for_post(post_id)
            .await
            .map_err(FeedError::for_comment)
    }

    #[instrument(skip_all, name = "feed.service.update_comment", fields(comment_id = %comment_id))]
    pub async fn update_comment(&self, comment_id: Uuid, content: &str) -> Result<Comment, FeedError> {
        validate_content(content)?;
        self.comments
            .update(comment_id, content)
            .await
            .map_err(FeedError::for_comment)
    }

    #[instrument(skip_all, name = "feed.service.delete_comment", fields(comment_id = %comment_id))]
    pub async fn delete_comment(&self, comment_id: Uuid) -> Result<(), FeedError> {
        self.comments
            .delete(comment_id)
            .await
            .map_err(FeedError::for_comment)
    }

    pub async fn health(&self) -> Result<(), FeedError> {
        self.publications
            .health()
            .await
            .map_err(|e| FeedError::Unavailable(e.to_string()))
    }
}

fn validate_publication(request: &PublicationRequest) -> Result<(), FeedError> {
    if request.title.trim().is_empty() {
        return Err(FeedError::Validation("title is required".to_string()));
    }
    if request.title.chars().count() > MAX_TITLE_CHARS {
        return Err(FeedError::Validation(
            "title must be at most 300 characters".to_string(),
        ));
    }
    validate_content(&request.content)
}

fn validate_comment(request: &CommentRequest) -> Result<Uuid, FeedError> {
    if request.post_id.trim().is_empty() {
        return Err(FeedError::Validation("post_id is required".to_string()));
    }
    let post_id = parse_id(&request.post_id)
        .ok_or_else(|| FeedError::Validation("post_id must be a UUID".to_string()))?;
    validate_content(&request.content)?;
    Ok(post_id)
}

fn validate_content(content: &str) -> Result<(), FeedError> {
    if content.trim().is_empty() {
        return Err(FeedError::Validation("content is required".to_string()));
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(FeedError::Validation(
            "content must be at most 10000 characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::repositories::memory::InMemoryFeedStore;
    use crate::services::profile_client::mock::MockAuthorDirectory;

    fn service(authors: Arc<MockAuthorDirectory>) -> (FeedService, Arc<InMemoryFeedStore>) {
        let store = Arc::new(InMemoryFeedStore::new());
        (FeedService::new(store.clone(), store.clone(), authors), store)
    }

    fn post(title: &str) -> PublicationRequest {
        PublicationRequest {
            title: title.to_string(),
            content: "body".to_string(),
        }
    }

    fn comment(post_id: Uuid, content: &str) -> CommentRequest {
        CommentRequest {
            post_id: post_id.to_string(),
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_publication_snapshots_author_name() {
        let (service, _) = service(Arc::new(MockAuthorDirectory::named("alice")));

        let created = service.create_publication("u1", post("hello")).await.unwrap();

        assert_eq!(created.name, "alice");
        assert_eq!(created.user_id, "u1");
        assert_eq!(service.publication(&created.post_id.to_string()).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_create_publication_fails_without_profile() {
        let (service, store) = service(Arc::new(MockAuthorDirectory::failing(404)));

        let result = service.create_publication("u1", post("hello")).await;

        assert!(matches!(result, Err(FeedError::ProfileUnavailable)));
        assert_eq!(store.publication_count().await, 0);
    }

    #[tokio::test]
    async fn test_invalid_publication_skips_profile_lookup() {
        let authors = Arc::new(MockAuthorDirectory::named("alice"));
        let (service, _) = service(authors.clone());

        let result = service.create_publication("u1", post("")).await;

        assert!(matches!(result, Err(FeedError::Validation(_))));
        assert_eq!(authors.call_count(), 0);
    }

    #[tokio::test]
    async fn test_comment_on_missing_publication_skips_profile_lookup() {
        let authors = Arc::new(MockAuthorDirectory::named("bob"));
        let (service, _) = service(authors.clone());

        let result = service.create_comment("u2", comment(Uuid::new_v4(), "hi")).await;

        assert!(matches!(result, Err(FeedError::PublicationNotFound)));
        assert_eq!(authors.call_count(), 0);
    }

    #[tokio::test]
    async fn test_comments_listed_newest_first() {
        let (service, _) = service(Arc::new(MockAuthorDirectory::named("bob")));
        let parent = service.create_publication("u1", post("hello")).await.unwrap();

        for text in ["one", "two", "three"] {
            service
                .create_comment("u2", comment(parent.post_id, text))
                .await
                .unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let contents: Vec<String> = service
            .list_comments(&parent.post_id.to_string())
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.content)
            .collect();
        assert_eq!(contents, vec!["three", "two", "one"]);
    }

    #[tokio::test]
    async fn test_update_publication_replaces_fields() {
        let (service, _) = service(Arc::new(MockAuthorDirectory::named("alice")));
        let created = service.create_publication("u1", post("hello")).await.unwrap();

        let updated = service
            .update_publication(
                created.post_id,
                PublicationRequest {
                    title: "edited".to_string(),
                    content: "new body".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "edited");
        assert_eq!(updated.content, "new body");
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_lookups_with_non_uuid_are_not_found() {
        let (service, _) = service(Arc::new(MockAuthorDirectory::named("alice")));

        assert!(matches!(
            service.publication("nope").await,
            Err(FeedError::PublicationNotFound)
        ));
        assert!(matches!(
            service.comment("nope").await,
            Err(FeedError::CommentNotFound)
        ));
        assert!(matches!(
            service.list_comments("nope").await,
            Err(FeedError::Validation(_))
        ));
    }

    #[test]
    fn test_publication_limits() {
        assert!(validate_publication(&post(&"t".repeat(300))).is_ok());
        assert!(validate_publication(&post(&"t".repeat(301))).is_err());
        assert!(validate_publication(&post("   ")).is_err());

        let long_body = PublicationRequest {
            title: "t".to_string(),
            content: "c".repeat(10_001),
        };
        assert!(validate_publication(&long_body).is_err());
    }

    #[test]
    fn test_comment_requires_post_id() {
        let missing = CommentRequest {
            post_id: String::new(),
            content: "hi".to_string(),
        };
        assert!(matches!(
            validate_comment(&missing),
            Err(FeedError::Validation(ref m)) if m == "post_id is required"
        ));
    }
}
