use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

use super::settings::LogFormat;

/// `RUST_LOG` wins over the configured level; an unparsable filter falls
/// back to `info`.
pub fn init_logging(default_level: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = fmt().with_env_filter(filter).with_target(true);
    let installed = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
    };

    installed.map_err(|e| anyhow!("failed to init logging: {e}"))
}
