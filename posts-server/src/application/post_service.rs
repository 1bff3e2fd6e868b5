use std::sync::Arc;

use tracing::{debug, info};

use crate::data::post_repository::{NewPost, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{IdStrategy, Post, PostFields, PostId, current_timestamp};

#[derive(Debug, Clone)]
pub(crate) enum UpdateOutcome {
    Replaced(Post),
    /// Nothing matched and upsert inserted a fresh post instead.
    Inserted(Post),
    /// Nothing matched and upsert is off; storage was left untouched.
    Missing(PostId),
}

pub(crate) struct PostService {
    repo: Arc<dyn PostRepository>,
    strategy: IdStrategy,
    upsert_on_update: bool,
}

impl PostService {
    pub(crate) fn new(
        repo: Arc<dyn PostRepository>,
        strategy: IdStrategy,
        upsert_on_update: bool,
    ) -> Self {
        Self {
            repo,
            strategy,
            upsert_on_update,
        }
    }

    pub(crate) fn strategy(&self) -> IdStrategy {
        self.strategy
    }

    pub(crate) async fn create_post(&self, fields: PostFields) -> Result<Post, DomainError> {
        let now = current_timestamp();
        let new_post = NewPost {
            id: self.strategy.issue_id(),
            fields: fields.shaped_for(self.strategy),
            created_at: now,
            updated_at: now,
        };

        let post = self.repo.insert_post(new_post).await?;
        info!(post_id = %post.id, "post created");
        Ok(post)
    }

    pub(crate) async fn get_post(&self, raw_id: &str) -> Result<Post, DomainError> {
        let id = self.strategy.parse_id(raw_id)?;
        self.repo
            .find_post(&id)
            .await?
            .ok_or_else(|| DomainError::NotFound(id.to_string()))
    }

    pub(crate) async fn list_posts(&self) -> Result<Vec<Post>, DomainError> {
        self.repo.list_posts().await
    }

    /// Full replacement of the mutable fields. `created_at` survives,
    /// `updated_at` moves to now.
    pub(crate) async fn update_post(
        &self,
        raw_id: &str,
        fields: PostFields,
    ) -> Result<UpdateOutcome, DomainError> {
        let id = self.strategy.parse_id(raw_id)?;
        let fields = fields.shaped_for(self.strategy);
        let now = current_timestamp();

        if let Some(post) = self.repo.replace_post(&id, fields.clone(), now).await? {
            info!(post_id = %post.id, "post updated");
            return Ok(UpdateOutcome::Replaced(post));
        }

        if !self.upsert_on_update {
            debug!(post_id = %id, "update matched no post");
            return Ok(UpdateOutcome::Missing(id));
        }

        let inserted = self
            .repo
            .insert_post(NewPost {
                id: self.strategy.issue_id(),
                fields,
                created_at: now,
                updated_at: now,
            })
            .await?;
        info!(requested_id = %id, post_id = %inserted.id, "update matched no post, inserted new one");
        Ok(UpdateOutcome::Inserted(inserted))
    }

    /// Succeeds whether or not a post was removed.
    pub(crate) async fn delete_post(&self, raw_id: &str) -> Result<(), DomainError> {
        let id = self.strategy.parse_id(raw_id)?;
        let deleted = self.repo.delete_post(&id).await?;
        info!(post_id = %id, deleted, "post delete handled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    use super::{PostService, UpdateOutcome};
    use crate::data::post_repository::{NewPost, PostRepository};
    use crate::data::repositories::memory::post_repository::InMemoryPostRepository;
    use crate::domain::error::DomainError;
    use crate::domain::post::{IdStrategy, Post, PostFields, PostId};

    struct FailingPostRepo;

    #[async_trait]
    impl PostRepository for FailingPostRepo {
        async fn insert_post(&self, _input: NewPost) -> Result<Post, DomainError> {
            Err(storage_down())
        }

        async fn find_post(&self, _id: &PostId) -> Result<Option<Post>, DomainError> {
            Err(storage_down())
        }

        async fn list_posts(&self) -> Result<Vec<Post>, DomainError> {
            Err(storage_down())
        }

        async fn replace_post(
            &self,
            _id: &PostId,
            _fields: PostFields,
            _updated_at: DateTime<Utc>,
        ) -> Result<Option<Post>, DomainError> {
            Err(storage_down())
        }

        async fn delete_post(&self, _id: &PostId) -> Result<bool, DomainError> {
            Err(storage_down())
        }
    }

    fn storage_down() -> DomainError {
        DomainError::Storage("connection refused".to_string())
    }

    fn service(strategy: IdStrategy) -> PostService {
        PostService::new(
            Arc::new(InMemoryPostRepository::new()),
            strategy,
            strategy.upserts_by_default(),
        )
    }

    fn fields(title: &str, content: &str) -> PostFields {
        PostFields {
            title: title.to_string(),
            content: content.to_string(),
            author: Some("ann".to_string()),
            status: None,
        }
    }

    #[tokio::test]
    async fn create_post_issues_uuid_and_stamps_equal_timestamps() {
        let service = service(IdStrategy::Uuid);

        let post = service
            .create_post(fields("t", "c"))
            .await
            .expect("create must succeed");

        match &post.id {
            PostId::Key(key) => assert!(uuid::Uuid::parse_str(key).is_ok()),
            other => panic!("expected uuid key, got {other:?}"),
        }
        assert_eq!(post.created_at, post.updated_at);
        assert!(post.author.is_none(), "uuid posts carry no author");
    }

    #[tokio::test]
    async fn create_post_leaves_object_id_to_storage() {
        let service = service(IdStrategy::ObjectId);

        let post = service
            .create_post(fields("t", "c"))
            .await
            .expect("create must succeed");

        assert!(matches!(post.id, PostId::Object(_)));
        assert_eq!(post.author.as_deref(), Some("ann"));
        assert_eq!(post.status.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn get_post_round_trips_created_post() {
        let service = service(IdStrategy::ObjectId);
        let created = service
            .create_post(fields("t", "c"))
            .await
            .expect("create must succeed");

        let fetched = service
            .get_post(&created.id.to_string())
            .await
            .expect("get must succeed");
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn get_post_returns_not_found_when_missing() {
        let service = service(IdStrategy::Uuid);

        let err = service
            .get_post("missing")
            .await
            .expect_err("post must be missing");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn malformed_object_id_is_rejected_before_storage() {
        let service = PostService::new(Arc::new(FailingPostRepo), IdStrategy::ObjectId, true);

        let err = service
            .get_post("not-hex")
            .await
            .expect_err("id must be rejected");
        assert!(matches!(err, DomainError::InvalidId { .. }));

        let err = service
            .delete_post("not-hex")
            .await
            .expect_err("id must be rejected");
        assert!(matches!(err, DomainError::InvalidId { .. }));
    }

    #[tokio::test]
    async fn update_post_replaces_fields_and_keeps_created_at() {
        let service = service(IdStrategy::Uuid);
        let created = service
            .create_post(fields("t", "c"))
            .await
            .expect("create must succeed");

        let outcome = service
            .update_post(
                &created.id.to_string(),
                PostFields {
                    title: "t2".to_string(),
                    ..PostFields::default()
                },
            )
            .await
            .expect("update must succeed");

        let updated = match outcome {
            UpdateOutcome::Replaced(post) => post,
            other => panic!("expected replaced post, got {other:?}"),
        };
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "t2");
        assert_eq!(updated.content, "", "missing fields are cleared");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn update_without_upsert_leaves_storage_untouched() {
        let service = service(IdStrategy::Uuid);

        let outcome = service
            .update_post("missing", fields("t", "c"))
            .await
            .expect("update must succeed");

        assert!(matches!(outcome, UpdateOutcome::Missing(PostId::Key(ref key)) if key == "missing"));
        assert!(service.list_posts().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn update_with_upsert_inserts_fresh_post() {
        let service = service(IdStrategy::ObjectId);
        let requested = "65f1c0ffee0123456789abcd";

        let outcome = service
            .update_post(requested, fields("t", "c"))
            .await
            .expect("update must succeed");

        let inserted = match outcome {
            UpdateOutcome::Inserted(post) => post,
            other => panic!("expected inserted post, got {other:?}"),
        };
        assert_ne!(inserted.id.to_string(), requested);
        assert_eq!(inserted.created_at, inserted.updated_at);
        assert_eq!(inserted.title, "t");

        let posts = service.list_posts().await.expect("list must succeed");
        assert_eq!(posts, vec![inserted]);
    }

    #[tokio::test]
    async fn delete_post_succeeds_for_missing_post() {
        let service = service(IdStrategy::ObjectId);

        service
            .delete_post("65f1c0ffee0123456789abcd")
            .await
            .expect("delete of missing post must succeed");
    }

    #[tokio::test]
    async fn delete_then_get_yields_not_found() {
        let service = service(IdStrategy::Uuid);
        let created = service
            .create_post(fields("t", "c"))
            .await
            .expect("create must succeed");
        let id = created.id.to_string();

        service.delete_post(&id).await.expect("delete must succeed");

        let err = service.get_post(&id).await.expect_err("post must be gone");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn storage_errors_propagate_unchanged() {
        let service = PostService::new(Arc::new(FailingPostRepo), IdStrategy::Uuid, false);

        let err = service.list_posts().await.expect_err("list must fail");
        match err {
            DomainError::Storage(message) => assert_eq!(message, "connection refused"),
            other => panic!("expected storage error, got {other:?}"),
        }

        let err = service
            .create_post(fields("t", "c"))
            .await
            .expect_err("create must fail");
        assert!(matches!(err, DomainError::Storage(_)));
    }
}
