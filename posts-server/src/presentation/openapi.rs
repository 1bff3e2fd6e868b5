use utoipa::OpenApi;

use crate::presentation::app_error::ErrorBody;
use crate::presentation::handlers::posts::{PostBodyDto, PostDto};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::handlers::posts::create_post,
        crate::presentation::handlers::posts::list_posts,
        crate::presentation::handlers::posts::get_post,
        crate::presentation::handlers::posts::update_post,
        crate::presentation::handlers::posts::delete_post
    ),
    components(schemas(PostBodyDto, PostDto, ErrorBody)),
    tags(
        (name = "posts", description = "Blog post CRUD")
    )
)]
pub(crate) struct ApiDoc;
