use thiserror::Error;

#[derive(Debug, Error)]
/// Ошибки клиентской библиотеки `posts-client`.
pub enum PostsClientError {
    /// Ошибка HTTP-транспорта (`reqwest`).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Запрошенный пост не найден.
    #[error("not found")]
    NotFound,

    /// Сервер отклонил запрос (некорректный JSON, id и т.п.).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Ошибка на стороне сервера (например, недоступно хранилище).
    #[error("server error: {0}")]
    Server(String),

    /// Ответ `201 Created` пришёл без заголовка `Location`.
    #[error("created response has no usable Location header")]
    MissingLocation,
}

/// Результат операций `posts-client`.
pub type PostsClientResult<T> = Result<T, PostsClientError>;

impl PostsClientError {
    pub(crate) fn from_http_status(status: reqwest::StatusCode, message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| format!("http status {status}"));
        match status {
            reqwest::StatusCode::NOT_FOUND => Self::NotFound,
            status if status.is_server_error() => Self::Server(message),
            _ => Self::InvalidRequest(message),
        }
    }
}
