use axum::Router;

use super::AppState;

pub(crate) mod posts;

pub(crate) fn router() -> Router<AppState> {
    Router::new().merge(posts::router())
}
