use anyhow::Result;
use tracing::info;

use posts_server::{Settings, init_logging};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level, settings.log_format)?;
    info!(
        id_strategy = %settings.id_strategy,
        upsert_on_update = settings.upsert_on_update,
        storage = ?settings.storage_backend,
        "starting posts-server"
    );

    posts_server::run(settings).await
}
