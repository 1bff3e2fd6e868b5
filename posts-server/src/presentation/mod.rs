use std::sync::Arc;

use crate::application::post_service::PostService;

pub(crate) mod app_error;
pub(crate) mod extractors;
pub(crate) mod handlers;
pub(crate) mod http_handlers;
pub(crate) mod middleware;
pub(crate) mod openapi;
pub(crate) mod routes;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) post_service: Arc<PostService>,
}

impl AppState {
    pub(crate) fn new(post_service: Arc<PostService>) -> Self {
        Self { post_service }
    }
}
