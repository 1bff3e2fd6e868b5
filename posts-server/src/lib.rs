//! HTTP CRUD service for blog posts stored in MongoDB.
//!
//! One binary serves both identifier schemes: service-issued UUID strings or
//! storage-assigned object ids, picked at startup through [`Settings`].

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

pub use domain::post::IdStrategy;
pub use infrastructure::database::StorageHandle;
pub use infrastructure::logging::init_logging;
pub use infrastructure::settings::{LogFormat, MongoSettings, Settings, StorageBackend};
pub use server::build_app;

/// Connects storage, serves HTTP until a shutdown signal, then closes the
/// storage handle whether or not serving failed.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let storage = StorageHandle::connect(&settings).await?;
    let served = server::run_http(&settings, &storage).await;
    storage.close().await;
    served
}
