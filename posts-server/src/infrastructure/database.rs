use std::sync::Arc;

use anyhow::{Context, Result};
use mongodb::Client;
use mongodb::bson::doc;
use tracing::info;

use super::settings::{MongoSettings, Settings, StorageBackend};
use crate::data::post_repository::PostRepository;
use crate::data::repositories::memory::post_repository::InMemoryPostRepository;
use crate::data::repositories::mongo::post_repository::MongoPostRepository;

/// The one storage handle of the process. Created by the entry point,
/// shared by reference with every request, and closed once serving stops.
pub struct StorageHandle {
    repository: Arc<dyn PostRepository>,
    client: Option<Client>,
}

impl StorageHandle {
    /// Connects the configured backend. For Mongo this pings the server, so
    /// an unreachable database fails here rather than on the first request.
    pub async fn connect(settings: &Settings) -> Result<Self> {
        match settings.storage_backend {
            StorageBackend::Mongo => Self::connect_mongo(&settings.mongo).await,
            StorageBackend::Memory => {
                info!("using in-memory post storage");
                Ok(Self::in_memory())
            }
        }
    }

    pub fn in_memory() -> Self {
        Self {
            repository: Arc::new(InMemoryPostRepository::new()),
            client: None,
        }
    }

    async fn connect_mongo(settings: &MongoSettings) -> Result<Self> {
        let client = Client::with_uri_str(&settings.uri)
            .await
            .context("invalid MONGODB_URI")?;
        let database = client.database(&settings.database);

        database
            .run_command(doc! { "ping": 1 })
            .await
            .context("failed to reach MongoDB")?;
        info!(
            database = %settings.database,
            collection = %settings.collection,
            "connected to MongoDB"
        );

        Ok(Self {
            repository: Arc::new(MongoPostRepository::new(&database, &settings.collection)),
            client: Some(client),
        })
    }

    pub(crate) fn repository(&self) -> Arc<dyn PostRepository> {
        Arc::clone(&self.repository)
    }

    pub async fn close(self) {
        if let Some(client) = self.client {
            client.shutdown().await;
            info!("MongoDB client shut down");
        }
    }
}
