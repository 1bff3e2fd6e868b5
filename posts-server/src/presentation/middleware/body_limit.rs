use axum::Router;
use axum::extract::DefaultBodyLimit;

use crate::infrastructure::settings::Settings;

/// Replaces axum's fixed 2 MiB extractor limit with the configured one.
/// Oversized bodies surface as a `JsonRejection`, so they get the JSON
/// error body like every other rejection.
pub(crate) fn apply_body_limit(router: Router, settings: &Settings) -> Router {
    router.layer(DefaultBodyLimit::max(settings.http_request_body_limit_bytes))
}
