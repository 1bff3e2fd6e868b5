use axum::extract::FromRequest;
use axum::extract::FromRequestParts;

use super::app_error::AppError;

/// `Json` whose rejections are reported as `AppError` (400 with the decoder
/// message) instead of axum's default 415/422 plain-text responses.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub(crate) struct AppJson<T>(pub(crate) T);

/// `Path` with JSON error bodies for undecodable segments.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub(crate) struct AppPath<T>(pub(crate) T);
