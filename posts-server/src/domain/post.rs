use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use mongodb::bson::oid::ObjectId;
use uuid::Uuid;

use super::error::DomainError;

/// Identifier scheme of a deployment, together with the response
/// conventions that go with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdStrategy {
    /// The service issues a random UUID string on create. Writes answer
    /// with a status only.
    #[default]
    Uuid,
    /// Storage assigns a 12-byte object id on insert. Writes echo the
    /// resulting post and posts carry `author`/`status`.
    ObjectId,
}

impl IdStrategy {
    pub(crate) fn parse_id(self, raw: &str) -> Result<PostId, DomainError> {
        match self {
            Self::Uuid => {
                if raw.trim().is_empty() {
                    return Err(DomainError::InvalidId {
                        id: raw.to_string(),
                        reason: "must not be empty",
                    });
                }
                Ok(PostId::Key(raw.to_string()))
            }
            Self::ObjectId => ObjectId::parse_str(raw)
                .map(PostId::Object)
                .map_err(|_| DomainError::InvalidId {
                    id: raw.to_string(),
                    reason: "expected a 24-character hex object id",
                }),
        }
    }

    /// Id the service assigns before insert. `None` leaves it to storage.
    pub(crate) fn issue_id(self) -> Option<PostId> {
        match self {
            Self::Uuid => Some(PostId::Key(Uuid::new_v4().to_string())),
            Self::ObjectId => None,
        }
    }

    pub(crate) fn echoes_writes(self) -> bool {
        matches!(self, Self::ObjectId)
    }

    pub(crate) fn tracks_metadata(self) -> bool {
        matches!(self, Self::ObjectId)
    }

    pub fn upserts_by_default(self) -> bool {
        matches!(self, Self::ObjectId)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uuid => "uuid",
            Self::ObjectId => "object-id",
        }
    }
}

impl fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdStrategy {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "uuid" => Ok(Self::Uuid),
            "object-id" | "object_id" | "objectid" => Ok(Self::ObjectId),
            other => Err(format!(
                "unknown id strategy '{other}', expected 'uuid' or 'object-id'"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum PostId {
    Key(String),
    Object(ObjectId),
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostId::Key(key) => f.write_str(key),
            PostId::Object(oid) => f.write_str(&oid.to_hex()),
        }
    }
}

/// The replaceable part of a post: everything except identity and timestamps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PostFields {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) author: Option<String>,
    pub(crate) status: Option<String>,
}

impl PostFields {
    /// Object-id deployments always store `author`/`status` (empty when
    /// omitted); uuid deployments never do.
    pub(crate) fn shaped_for(self, strategy: IdStrategy) -> Self {
        if strategy.tracks_metadata() {
            Self {
                author: Some(self.author.unwrap_or_default()),
                status: Some(self.status.unwrap_or_default()),
                ..self
            }
        } else {
            Self {
                author: None,
                status: None,
                ..self
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Post {
    pub(crate) id: PostId,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) author: Option<String>,
    pub(crate) status: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl Post {
    pub(crate) fn new(
        id: PostId,
        fields: PostFields,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: fields.title,
            content: fields.content,
            author: fields.author,
            status: fields.status,
            created_at,
            updated_at,
        }
    }

    pub(crate) fn replace_fields(&mut self, fields: PostFields, updated_at: DateTime<Utc>) {
        self.title = fields.title;
        self.content = fields.content;
        self.author = fields.author;
        self.status = fields.status;
        self.updated_at = updated_at;
    }
}

/// Current time at the millisecond precision the document store keeps.
pub(crate) fn current_timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
