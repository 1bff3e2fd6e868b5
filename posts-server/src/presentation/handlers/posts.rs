use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::application::post_service::UpdateOutcome;
use crate::domain::error::DomainError;
use crate::domain::post::{IdStrategy, Post, PostFields};
use crate::presentation::AppState;
use crate::presentation::app_error::{AppError, AppResult, ErrorBody};
use crate::presentation::extractors::{AppJson, AppPath};

/// Request body for create and update. Any JSON object is accepted: unknown
/// keys are ignored and missing ones default to empty. Handlers decode it
/// through `PostBodyDto::from_object`, so arrays never reach the sequence
/// form of the derived struct decoder.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct PostBodyDto {
    pub(crate) title: String,
    pub(crate) content: String,
    /// Stored only by object-id deployments.
    pub(crate) author: Option<String>,
    /// Stored only by object-id deployments.
    pub(crate) status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostDto {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) status: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostPath {
    pub(crate) id: String,
}

impl PostBodyDto {
    fn from_object(object: Map<String, Value>) -> AppResult<Self> {
        serde_json::from_value(Value::Object(object)).map_err(|err| {
            AppError::BadRequest(format!(
                "Failed to deserialize the JSON body into the target type: {err}"
            ))
        })
    }
}

fn location(post: &Post) -> [(header::HeaderName, String); 1] {
    [(header::LOCATION, format!("/post/{}", post.id))]
}

impl From<PostBodyDto> for PostFields {
    fn from(dto: PostBodyDto) -> Self {
        Self {
            title: dto.title,
            content: dto.content,
            author: dto.author,
            status: dto.status,
        }
    }
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id.to_string(),
            title: post.title,
            content: post.content,
            author: post.author,
            status: post.status,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

#[utoipa::path(
    post,
    path = "/post",
    tag = "posts",
    request_body = PostBodyDto,
    responses(
        (status = 201, description = "Post created; the body is present for object-id deployments", body = PostDto,
            headers(("location" = String, description = "Path of the new post"))),
        (status = 400, description = "Malformed JSON body", body = ErrorBody),
        (status = 500, description = "Storage error", body = ErrorBody)
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    AppJson(body): AppJson<Map<String, Value>>,
) -> AppResult<Response> {
    let dto = PostBodyDto::from_object(body)?;
    let post = state.post_service.create_post(dto.into()).await?;
    let location = location(&post);

    if state.post_service.strategy().echoes_writes() {
        Ok((StatusCode::CREATED, location, Json(PostDto::from(post))).into_response())
    } else {
        Ok((StatusCode::CREATED, location).into_response())
    }
}

#[utoipa::path(
    get,
    path = "/posts",
    tag = "posts",
    responses(
        (status = 200, description = "Every stored post", body = [PostDto]),
        (status = 500, description = "Storage error", body = ErrorBody)
    )
)]
pub(crate) async fn list_posts(State(state): State<AppState>) -> AppResult<Json<Vec<PostDto>>> {
    let posts = state.post_service.list_posts().await?;
    Ok(Json(posts.into_iter().map(PostDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/post/{id}",
    tag = "posts",
    params(
        ("id" = String, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post found", body = PostDto),
        (status = 400, description = "Malformed object id", body = ErrorBody),
        (status = 404, description = "Post not found", body = ErrorBody),
        (status = 500, description = "Storage error", body = ErrorBody)
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    AppPath(path): AppPath<PostPath>,
) -> AppResult<Json<PostDto>> {
    let post = state.post_service.get_post(&path.id).await?;
    Ok(Json(PostDto::from(post)))
}

#[utoipa::path(
    put,
    path = "/post/{id}",
    tag = "posts",
    params(
        ("id" = String, Path, description = "Post id")
    ),
    request_body = PostBodyDto,
    responses(
        (status = 200, description = "Post replaced (or inserted when upsert is on); the body is present for object-id deployments", body = PostDto,
            headers(("location" = String, description = "Path of the inserted post, set only when upsert inserted one"))),
        (status = 400, description = "Malformed JSON body or object id", body = ErrorBody),
        (status = 404, description = "No match while upsert is off (object-id deployments)", body = ErrorBody),
        (status = 500, description = "Storage error", body = ErrorBody)
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    AppPath(path): AppPath<PostPath>,
    AppJson(body): AppJson<Map<String, Value>>,
) -> AppResult<Response> {
    let dto = PostBodyDto::from_object(body)?;
    let outcome = state.post_service.update_post(&path.id, dto.into()).await?;
    let echo = state.post_service.strategy().echoes_writes();

    match outcome {
        UpdateOutcome::Replaced(post) if echo => {
            Ok((StatusCode::OK, Json(PostDto::from(post))).into_response())
        }
        UpdateOutcome::Replaced(_) => Ok(StatusCode::OK.into_response()),
        // The upserted post lives under a new id; point the caller at it.
        UpdateOutcome::Inserted(post) if echo => {
            let location = location(&post);
            Ok((StatusCode::OK, location, Json(PostDto::from(post))).into_response())
        }
        UpdateOutcome::Inserted(post) => Ok((StatusCode::OK, location(&post)).into_response()),
        UpdateOutcome::Missing(id) if echo => Err(DomainError::NotFound(id.to_string()).into()),
        UpdateOutcome::Missing(_) => Ok(StatusCode::OK.into_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/post/{id}",
    tag = "posts",
    params(
        ("id" = String, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Delete handled (uuid deployments), whether or not the post existed"),
        (status = 204, description = "Delete handled (object-id deployments), whether or not the post existed"),
        (status = 400, description = "Malformed object id", body = ErrorBody),
        (status = 500, description = "Storage error", body = ErrorBody)
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    AppPath(path): AppPath<PostPath>,
) -> AppResult<StatusCode> {
    state.post_service.delete_post(&path.id).await?;

    Ok(match state.post_service.strategy() {
        IdStrategy::Uuid => StatusCode::OK,
        IdStrategy::ObjectId => StatusCode::NO_CONTENT,
    })
}

pub(crate) async fn method_not_implemented() -> AppError {
    AppError::MethodNotImplemented
}
