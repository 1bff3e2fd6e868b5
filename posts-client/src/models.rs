use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Публичная модель поста; сериализуется в том же виде, что и на сервере.
pub struct Post {
    /// Идентификатор поста (UUID или 24-символьный hex ObjectId).
    pub id: String,
    /// Заголовок поста.
    pub title: String,
    /// Содержимое поста.
    pub content: String,
    /// Автор; сервер с object-id возвращает его всегда, с uuid никогда.
    pub author: Option<String>,
    /// Статус публикации; присутствует по тем же правилам, что и `author`.
    pub status: Option<String>,
    /// Дата и время создания поста (UTC).
    pub created_at: DateTime<Utc>,
    /// Дата и время последнего обновления поста (UTC).
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Поля поста, которые задаёт клиент при создании и обновлении.
pub struct NewPostInput {
    /// Заголовок поста.
    pub title: String,
    /// Содержимое поста.
    pub content: String,
    /// Автор (сохраняется только сервером с object-id).
    pub author: Option<String>,
    /// Статус (сохраняется только сервером с object-id).
    pub status: Option<String>,
}

impl NewPostInput {
    /// Создаёт ввод только с заголовком и содержимым.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            author: None,
            status: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Результат создания поста.
pub struct CreatedPost {
    /// Идентификатор, взятый из заголовка `Location`.
    pub id: String,
    /// Созданный пост, если сервер вернул его в теле ответа.
    pub post: Option<Post>,
}
