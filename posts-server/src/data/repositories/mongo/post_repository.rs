use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::{self, Document, doc, oid::ObjectId};
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::post_repository::{NewPost, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostFields, PostId};

#[derive(Debug, Clone)]
pub(crate) struct MongoPostRepository {
    collection: Collection<PostDocument>,
}

impl MongoPostRepository {
    pub(crate) fn new(database: &Database, collection: &str) -> Self {
        Self {
            collection: database.collection(collection),
        }
    }
}

/// Stored shape of a post. Uuid deployments keep their key in `id` next to
/// the driver-assigned `_id`; object-id deployments only have `_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct PostDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    object_id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    #[serde(rename = "createdAt")]
    created_at: bson::DateTime,
    #[serde(rename = "updatedAt")]
    updated_at: bson::DateTime,
}

impl PostDocument {
    fn from_new(input: NewPost) -> Self {
        let (object_id, id) = match input.id {
            Some(PostId::Key(key)) => (None, Some(key)),
            Some(PostId::Object(oid)) => (Some(oid), None),
            None => (None, None),
        };

        Self {
            object_id,
            id,
            title: input.fields.title,
            content: input.fields.content,
            author: input.fields.author,
            status: input.fields.status,
            created_at: to_bson_datetime(input.created_at),
            updated_at: to_bson_datetime(input.updated_at),
        }
    }

    fn into_post(self) -> Result<Post, DomainError> {
        let id = match (self.id, self.object_id) {
            (Some(key), _) => PostId::Key(key),
            (None, Some(oid)) => PostId::Object(oid),
            (None, None) => {
                return Err(DomainError::Unexpected(
                    "stored post has no identifier".to_string(),
                ));
            }
        };

        let fields = PostFields {
            title: self.title,
            content: self.content,
            author: self.author,
            status: self.status,
        };

        Ok(Post::new(
            id,
            fields,
            from_bson_datetime(self.created_at)?,
            from_bson_datetime(self.updated_at)?,
        ))
    }
}

#[async_trait]
impl PostRepository for MongoPostRepository {
    async fn insert_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let mut document = PostDocument::from_new(input);

        let result = self
            .collection
            .insert_one(&document)
            .await
            .map_err(map_mongo_error)?;

        if document.object_id.is_none() {
            document.object_id = result.inserted_id.as_object_id();
        }
        debug!(inserted_id = %result.inserted_id, "post inserted");

        document.into_post()
    }

    async fn find_post(&self, id: &PostId) -> Result<Option<Post>, DomainError> {
        let document = self
            .collection
            .find_one(id_filter(id))
            .await
            .map_err(map_mongo_error)?;

        document.map(PostDocument::into_post).transpose()
    }

    async fn list_posts(&self) -> Result<Vec<Post>, DomainError> {
        let mut cursor = self
            .collection
            .find(doc! {})
            .await
            .map_err(map_mongo_error)?;

        let mut posts = Vec::new();
        while cursor.advance().await.map_err(map_mongo_error)? {
            let document = cursor.deserialize_current().map_err(map_mongo_error)?;
            posts.push(document.into_post()?);
        }

        debug!(count = posts.len(), "posts listed");
        Ok(posts)
    }

    async fn replace_post(
        &self,
        id: &PostId,
        fields: PostFields,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Post>, DomainError> {
        let document = self
            .collection
            .find_one_and_update(id_filter(id), replacement(&fields, updated_at))
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_mongo_error)?;

        document.map(PostDocument::into_post).transpose()
    }

    async fn delete_post(&self, id: &PostId) -> Result<bool, DomainError> {
        let result = self
            .collection
            .delete_one(id_filter(id))
            .await
            .map_err(map_mongo_error)?;

        Ok(result.deleted_count > 0)
    }
}

fn id_filter(id: &PostId) -> Document {
    match id {
        PostId::Key(key) => doc! { "id": key.as_str() },
        PostId::Object(oid) => doc! { "_id": *oid },
    }
}

fn replacement(fields: &PostFields, updated_at: DateTime<Utc>) -> Document {
    let mut set = doc! {
        "title": fields.title.as_str(),
        "content": fields.content.as_str(),
        "updatedAt": to_bson_datetime(updated_at),
    };
    if let Some(author) = &fields.author {
        set.insert("author", author.as_str());
    }
    if let Some(status) = &fields.status {
        set.insert("status", status.as_str());
    }

    doc! { "$set": set }
}

fn to_bson_datetime(value: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(value.timestamp_millis())
}

fn from_bson_datetime(value: bson::DateTime) -> Result<DateTime<Utc>, DomainError> {
    let millis = value.timestamp_millis();
    DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| DomainError::Unexpected(format!("stored timestamp out of range: {millis}")))
}

fn map_mongo_error(err: mongodb::error::Error) -> DomainError {
    DomainError::Storage(err.to_string())
}

#[cfg(test)]
mod tests {
    use mongodb::bson::Bson;

    use super::*;
    use crate::domain::post::current_timestamp;

    fn fields(author: Option<&str>) -> PostFields {
        PostFields {
            title: "title".to_string(),
            content: "content".to_string(),
            author: author.map(str::to_string),
            status: author.map(|_| "draft".to_string()),
        }
    }

    #[test]
    fn key_ids_filter_on_id_field() {
        let filter = id_filter(&PostId::Key("abc".to_string()));
        assert_eq!(filter, doc! { "id": "abc" });
    }

    #[test]
    fn object_ids_filter_on_underscore_id() {
        let oid = ObjectId::new();
        let filter = id_filter(&PostId::Object(oid));
        assert_eq!(filter, doc! { "_id": oid });
    }

    #[test]
    fn replacement_sets_mutable_fields_and_updated_at_only() {
        let now = current_timestamp();
        let update = replacement(&fields(Some("ann")), now);

        let set = update.get_document("$set").expect("$set must be present");
        assert_eq!(set.get_str("title").expect("title"), "title");
        assert_eq!(set.get_str("author").expect("author"), "ann");
        assert_eq!(set.get_str("status").expect("status"), "draft");
        assert_eq!(
            set.get_datetime("updatedAt")
                .expect("updatedAt")
                .timestamp_millis(),
            now.timestamp_millis()
        );
        assert!(!set.contains_key("createdAt"));
        assert!(!set.contains_key("id"));
        assert!(!set.contains_key("_id"));
    }

    #[test]
    fn replacement_omits_metadata_for_uuid_posts() {
        let update = replacement(&fields(None), current_timestamp());
        let set = update.get_document("$set").expect("$set must be present");
        assert!(!set.contains_key("author"));
        assert!(!set.contains_key("status"));
    }

    #[test]
    fn document_for_keyed_post_leaves_underscore_id_to_driver() {
        let now = current_timestamp();
        let document = PostDocument::from_new(NewPost {
            id: Some(PostId::Key("k-1".to_string())),
            fields: fields(None),
            created_at: now,
            updated_at: now,
        });

        let stored = bson::to_document(&document).expect("document must serialize");
        assert!(!stored.contains_key("_id"));
        assert_eq!(stored.get_str("id").expect("id"), "k-1");
        assert!(matches!(stored.get("createdAt"), Some(Bson::DateTime(_))));
        assert!(!stored.contains_key("author"));
    }

    #[test]
    fn keyed_document_maps_back_to_key_even_with_driver_id() {
        let now = current_timestamp();
        let mut document = PostDocument::from_new(NewPost {
            id: Some(PostId::Key("k-1".to_string())),
            fields: fields(None),
            created_at: now,
            updated_at: now,
        });
        document.object_id = Some(ObjectId::new());

        let post = document.into_post().expect("document must map");
        assert_eq!(post.id, PostId::Key("k-1".to_string()));
        assert_eq!(post.created_at, now);
        assert_eq!(post.updated_at, now);
    }

    #[test]
    fn object_document_maps_back_to_object_id() {
        let now = current_timestamp();
        let oid = ObjectId::new();
        let document = PostDocument::from_new(NewPost {
            id: Some(PostId::Object(oid)),
            fields: fields(Some("ann")),
            created_at: now,
            updated_at: now,
        });

        let post = document.into_post().expect("document must map");
        assert_eq!(post.id, PostId::Object(oid));
        assert_eq!(post.author.as_deref(), Some("ann"));
    }

    #[test]
    fn document_without_any_identifier_is_rejected() {
        let now = current_timestamp();
        let document = PostDocument::from_new(NewPost {
            id: None,
            fields: fields(None),
            created_at: now,
            updated_at: now,
        });

        let err = document.into_post().expect_err("identifier is required");
        assert!(matches!(err, DomainError::Unexpected(_)));
    }

    #[test]
    fn stored_document_tolerates_missing_text_fields() {
        let oid = ObjectId::new();
        let raw = doc! {
            "_id": oid,
            "createdAt": bson::DateTime::from_millis(1_000),
            "updatedAt": bson::DateTime::from_millis(2_000),
        };

        let document: PostDocument = bson::from_document(raw).expect("document must decode");
        let post = document.into_post().expect("document must map");
        assert_eq!(post.title, "");
        assert_eq!(post.created_at.timestamp_millis(), 1_000);
        assert_eq!(post.updated_at.timestamp_millis(), 2_000);
    }
}
