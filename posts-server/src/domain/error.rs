use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum DomainError {
    #[error("invalid post id '{id}': {reason}")]
    InvalidId { id: String, reason: &'static str },

    #[error("post not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("unexpected domain error: {0}")]
    Unexpected(String),
}
