use reqwest::{Client, Method, Response, Url, header};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;

use crate::error::{PostsClientError, PostsClientResult};
use crate::models::{CreatedPost, NewPostInput, Post};

const ITEM_PATH_PREFIX: &str = "/post/";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PostBodyDto<'a> {
    title: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponseDto {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostDto {
    id: String,
    title: String,
    content: String,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    status: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl<'a> From<&'a NewPostInput> for PostBodyDto<'a> {
    fn from(input: &'a NewPostInput) -> Self {
        Self {
            title: &input.title,
            content: &input.content,
            author: input.author.as_deref(),
            status: input.status.as_deref(),
        }
    }
}

impl From<PostDto> for Post {
    fn from(value: PostDto) -> Self {
        Self {
            id: value.id,
            title: value.title,
            content: value.content,
            author: value.author,
            status: value.status,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
/// HTTP-клиент для REST API `posts-server`.
///
/// Работает с обоими вариантами сервера: тело ответа на запись
/// необязательно, поэтому `create_post` и `update_post` возвращают пост
/// только когда сервер его прислал.
pub struct PostsClient {
    base_url: Url,
    client: Client,
}

impl PostsClient {
    /// Создаёт новый HTTP-клиент с базовым URL сервера.
    ///
    /// URL должен быть абсолютным, например `http://127.0.0.1:8080`.
    pub fn new(base_url: impl AsRef<str>) -> PostsClientResult<Self> {
        let raw = base_url.as_ref();
        let base_url = Url::parse(raw).map_err(|err| {
            PostsClientError::InvalidRequest(format!("invalid server url '{raw}': {err}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(PostsClientError::InvalidRequest(format!(
                "server url '{raw}' cannot have a path"
            )));
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self { base_url, client })
    }

    /// сегменты кодируются, поэтому `?`, `#` и `/` в id остаются частью пути
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn item_segments(id: &str) -> [&str; 2] {
        ["post", id]
    }

    async fn decode_error(response: Response) -> PostsClientError {
        let status = response.status();

        let message = match response.json::<ErrorResponseDto>().await {
            Ok(body) => body.error,
            Err(_) => None,
        };
        PostsClientError::from_http_status(status, message)
    }

    /// отправляет запрос и возвращает ответ только со статусом 2xx
    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        input: Option<&NewPostInput>,
    ) -> PostsClientResult<Response> {
        let mut request = self.client.request(method, self.endpoint(segments));
        if let Some(input) = input {
            request = request.json(&PostBodyDto::from(input));
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        Ok(response)
    }

    /// пустое тело означает, что сервер не эхоирует записи
    async fn optional_body<T: DeserializeOwned>(response: Response) -> PostsClientResult<Option<T>> {
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|err| PostsClientError::Server(format!("malformed response body: {err}")))
    }

    /// Создаёт пост.
    ///
    /// Идентификатор берётся из заголовка `Location`, поэтому он известен
    /// даже когда сервер отвечает пустым телом.
    pub async fn create_post(&self, input: &NewPostInput) -> PostsClientResult<CreatedPost> {
        let response = self.send(Method::POST, &["post"], Some(input)).await?;
        let id = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .and_then(id_from_location)
            .ok_or(PostsClientError::MissingLocation)?;

        let post = Self::optional_body::<PostDto>(response)
            .await?
            .map(Post::from);
        Ok(CreatedPost { id, post })
    }

    /// Получает пост по идентификатору.
    pub async fn get_post(&self, id: &str) -> PostsClientResult<Post> {
        let response = self.send(Method::GET, &Self::item_segments(id), None).await?;
        let dto = response.json::<PostDto>().await?;
        Ok(dto.into())
    }

    /// Возвращает все посты.
    pub async fn list_posts(&self) -> PostsClientResult<Vec<Post>> {
        let response = self.send(Method::GET, &["posts"], None).await?;
        let dtos = response.json::<Vec<PostDto>>().await?;
        Ok(dtos.into_iter().map(Post::from).collect())
    }

    /// Полностью заменяет изменяемые поля поста.
    ///
    /// Возвращает `None`, если сервер ответил пустым телом.
    pub async fn update_post(
        &self,
        id: &str,
        input: &NewPostInput,
    ) -> PostsClientResult<Option<Post>> {
        let response = self
            .send(Method::PUT, &Self::item_segments(id), Some(input))
            .await?;
        let post = Self::optional_body::<PostDto>(response).await?;
        Ok(post.map(Post::from))
    }

    /// Удаляет пост по идентификатору. Удаление отсутствующего поста не ошибка.
    pub async fn delete_post(&self, id: &str) -> PostsClientResult<()> {
        self.send(Method::DELETE, &Self::item_segments(id), None)
            .await?;
        Ok(())
    }
}

fn id_from_location(location: &str) -> Option<String> {
    let id = match location.split_once(ITEM_PATH_PREFIX) {
        Some((_, id)) => id,
        None => location.rsplit('/').next()?,
    };
    let id = id.trim_end_matches('/');
    if id.is_empty() {
        return None;
    }
    Some(id.to_string())
}
