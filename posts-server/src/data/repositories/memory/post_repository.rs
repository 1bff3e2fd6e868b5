use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use crate::data::post_repository::{NewPost, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostFields, PostId};

/// Process-local store with the same semantics as the Mongo repository.
/// Listing returns posts in insertion order.
#[derive(Debug, Clone, Default)]
pub(crate) struct InMemoryPostRepository {
    posts: Arc<RwLock<Vec<Post>>>,
}

impl InMemoryPostRepository {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn insert_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let id = input
            .id
            .unwrap_or_else(|| PostId::Object(ObjectId::new()));
        let post = Post::new(id, input.fields, input.created_at, input.updated_at);

        self.posts.write().await.push(post.clone());
        Ok(post)
    }

    async fn find_post(&self, id: &PostId) -> Result<Option<Post>, DomainError> {
        let posts = self.posts.read().await;
        Ok(posts.iter().find(|post| &post.id == id).cloned())
    }

    async fn list_posts(&self) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.read().await.clone())
    }

    async fn replace_post(
        &self,
        id: &PostId,
        fields: PostFields,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Post>, DomainError> {
        let mut posts = self.posts.write().await;
        let Some(post) = posts.iter_mut().find(|post| &post.id == id) else {
            return Ok(None);
        };

        post.replace_fields(fields, updated_at);
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, id: &PostId) -> Result<bool, DomainError> {
        let mut posts = self.posts.write().await;
        match posts.iter().position(|post| &post.id == id) {
            Some(index) => {
                posts.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::domain::post::current_timestamp;

    fn new_post(id: Option<PostId>, title: &str) -> NewPost {
        let now = current_timestamp();
        NewPost {
            id,
            fields: PostFields {
                title: title.to_string(),
                content: "content".to_string(),
                ..PostFields::default()
            },
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn insert_assigns_object_id_when_none_given() {
        let repo = InMemoryPostRepository::new();

        let post = repo
            .insert_post(new_post(None, "a"))
            .await
            .expect("insert must succeed");

        assert!(matches!(post.id, PostId::Object(_)));
        let found = repo
            .find_post(&post.id)
            .await
            .expect("find must succeed")
            .expect("post must exist");
        assert_eq!(found, post);
    }

    #[tokio::test]
    async fn insert_keeps_issued_key() {
        let repo = InMemoryPostRepository::new();
        let id = PostId::Key("issued".to_string());

        let post = repo
            .insert_post(new_post(Some(id.clone()), "a"))
            .await
            .expect("insert must succeed");

        assert_eq!(post.id, id);
    }

    #[tokio::test]
    async fn list_returns_posts_in_insertion_order() {
        let repo = InMemoryPostRepository::new();
        for title in ["first", "second", "third"] {
            repo.insert_post(new_post(None, title))
                .await
                .expect("insert must succeed");
        }

        let titles: Vec<String> = repo
            .list_posts()
            .await
            .expect("list must succeed")
            .into_iter()
            .map(|post| post.title)
            .collect();
        assert_eq!(titles, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn replace_updates_fields_and_keeps_created_at() {
        let repo = InMemoryPostRepository::new();
        let post = repo
            .insert_post(new_post(None, "old"))
            .await
            .expect("insert must succeed");

        let later = post.updated_at + Duration::seconds(3);
        let replaced = repo
            .replace_post(
                &post.id,
                PostFields {
                    title: "new".to_string(),
                    ..PostFields::default()
                },
                later,
            )
            .await
            .expect("replace must succeed")
            .expect("post must match");

        assert_eq!(replaced.title, "new");
        assert_eq!(replaced.content, "");
        assert_eq!(replaced.created_at, post.created_at);
        assert_eq!(replaced.updated_at, later);
    }

    #[tokio::test]
    async fn replace_missing_post_returns_none() {
        let repo = InMemoryPostRepository::new();

        let result = repo
            .replace_post(
                &PostId::Key("missing".to_string()),
                PostFields::default(),
                current_timestamp(),
            )
            .await
            .expect("replace must succeed");

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn delete_reports_whether_a_post_was_removed() {
        let repo = InMemoryPostRepository::new();
        let post = repo
            .insert_post(new_post(None, "a"))
            .await
            .expect("insert must succeed");

        assert!(repo.delete_post(&post.id).await.expect("delete must succeed"));
        assert!(!repo.delete_post(&post.id).await.expect("delete must succeed"));
        assert!(
            repo.find_post(&post.id)
                .await
                .expect("find must succeed")
                .is_none()
        );
    }
}
