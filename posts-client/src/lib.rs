//! Клиентская библиотека для работы с posts-server по HTTP.
//!
//! Один `PostsClient` обслуживает оба варианта сервера: с UUID, выдаваемыми
//! сервисом (записи отвечают пустым телом), и с ObjectId из хранилища
//! (записи возвращают пост в теле).
#![warn(missing_docs)]

mod error;
mod http_client;
mod models;

pub use error::{PostsClientError, PostsClientResult};
pub use http_client::PostsClient;
pub use models::{CreatedPost, NewPostInput, Post};
