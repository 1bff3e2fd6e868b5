use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostFields, PostId};

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    /// `None` asks the storage engine to assign the identifier.
    pub(crate) id: Option<PostId>,
    pub(crate) fields: PostFields,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

/// Storage seam for posts. Each method maps to exactly one storage call and
/// relies on the engine's single-document atomicity.
#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn insert_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn find_post(&self, id: &PostId) -> Result<Option<Post>, DomainError>;
    async fn list_posts(&self) -> Result<Vec<Post>, DomainError>;
    /// Replaces the mutable fields and `updated_at`, returning the post as
    /// stored afterwards, or `None` when nothing matched.
    async fn replace_post(
        &self,
        id: &PostId,
        fields: PostFields,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Post>, DomainError>;
    /// Returns whether a document was removed.
    async fn delete_post(&self, id: &PostId) -> Result<bool, DomainError>;
}
