use axum::Router;
use axum::routing::{get, post};

use crate::presentation::AppState;
use crate::presentation::handlers::posts::{
    create_post, delete_post, get_post, list_posts, method_not_implemented, update_post,
};

/// Static route table: two collection paths and one item path with a single
/// `{id}` segment. Other methods on the item path answer 501.
pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/post", post(create_post))
        .route("/posts", get(list_posts))
        .route(
            "/post/{id}",
            get(get_post)
                .put(update_post)
                .delete(delete_post)
                .fallback(method_not_implemented),
        )
}
