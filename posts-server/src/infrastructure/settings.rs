use std::str::FromStr;

use anyhow::{Context, Result, anyhow};

use crate::domain::post::IdStrategy;

const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017";
const DEFAULT_MONGODB_DATABASE: &str = "blog";
const DEFAULT_MONGODB_COLLECTION: &str = "posts";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:8000,http://127.0.0.1:8000";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_BODY_LIMIT_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Mongo,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(Self::Mongo),
            "memory" => Ok(Self::Memory),
            other => Err(anyhow!(
                "unknown storage backend '{other}', expected 'mongo' or 'memory'"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(anyhow!(
                "unknown log format '{other}', expected 'compact' or 'json'"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MongoSettings {
    pub uri: String,
    pub database: String,
    pub collection: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub http_addr: String,
    pub storage_backend: StorageBackend,
    pub mongo: MongoSettings,
    pub id_strategy: IdStrategy,
    pub upsert_on_update: bool,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub log_format: LogFormat,
    pub http_request_body_limit_bytes: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup; unset and blank keys fall back
    /// to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let http_addr = get("HTTP_ADDR").unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string());
        let storage_backend = get("STORAGE_BACKEND")
            .map(|raw| raw.parse::<StorageBackend>())
            .transpose()
            .context("Failed to parse STORAGE_BACKEND")?
            .unwrap_or(StorageBackend::Mongo);

        let mongo = MongoSettings {
            uri: get("MONGODB_URI").unwrap_or_else(|| DEFAULT_MONGODB_URI.to_string()),
            database: get("MONGODB_DATABASE")
                .unwrap_or_else(|| DEFAULT_MONGODB_DATABASE.to_string()),
            collection: get("MONGODB_COLLECTION")
                .unwrap_or_else(|| DEFAULT_MONGODB_COLLECTION.to_string()),
        };

        let id_strategy = get("POST_ID_STRATEGY")
            .map(|raw| raw.parse::<IdStrategy>().map_err(anyhow::Error::msg))
            .transpose()
            .context("Failed to parse POST_ID_STRATEGY")?
            .unwrap_or_default();
        let upsert_on_update = get("POST_UPDATE_UPSERT")
            .map(|raw| parse_bool("POST_UPDATE_UPSERT", &raw))
            .transpose()?
            .unwrap_or_else(|| id_strategy.upserts_by_default());

        let cors_origins = parse_cors_origins(
            &get("CORS_ORIGINS").unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string()),
        );
        let log_level = get("LOG_LEVEL")
            .or_else(|| get("RUST_LOG"))
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
        let log_format = get("LOG_FORMAT")
            .map(|raw| raw.parse::<LogFormat>())
            .transpose()
            .context("Failed to parse LOG_FORMAT")?
            .unwrap_or(LogFormat::Compact);
        let http_request_body_limit_bytes = parse_usize(
            "HTTP_REQUEST_BODY_LIMIT_BYTES",
            get("HTTP_REQUEST_BODY_LIMIT_BYTES"),
            DEFAULT_BODY_LIMIT_BYTES,
        )?;

        Ok(Self {
            http_addr,
            storage_backend,
            mongo,
            id_strategy,
            upsert_on_update,
            cors_origins,
            log_level,
            log_format,
            http_request_body_limit_bytes,
        })
    }

    /// In-memory settings for local runs and tests.
    pub fn in_memory(id_strategy: IdStrategy) -> Self {
        Self {
            http_addr: "127.0.0.1:0".to_string(),
            storage_backend: StorageBackend::Memory,
            mongo: MongoSettings {
                uri: DEFAULT_MONGODB_URI.to_string(),
                database: DEFAULT_MONGODB_DATABASE.to_string(),
                collection: DEFAULT_MONGODB_COLLECTION.to_string(),
            },
            id_strategy,
            upsert_on_update: id_strategy.upserts_by_default(),
            cors_origins: parse_cors_origins(DEFAULT_CORS_ORIGINS),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: LogFormat::Compact,
            http_request_body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(anyhow!("Failed to parse {key}, expecting true or false")),
    }
}

fn parse_cors_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_usize(key: &str, raw: Option<String>, default: usize) -> Result<usize> {
    let Some(raw) = raw else {
        return Ok(default);
    };

    let value = raw
        .parse::<usize>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;
    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}
