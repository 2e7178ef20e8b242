use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct AssetConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    pub storage: StorageConfig,
    pub openai: OpenAiSettings,
    pub orchestrator: OrchestratorConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    pub collection: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub container: String,
    pub connection_string: Option<String>,
    pub local_path: String,
    pub public_base_url: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Local,
    Azure,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiSettings {
    /// When disabled, a mock generator and fetcher stand in for the real API.
    pub enabled: bool,
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrchestratorConfig {
    /// Per-call limit for generate/fetch/upload/persist. `None` waits forever.
    pub step_timeout_secs: Option<u64>,
}

impl OrchestratorConfig {
    pub fn step_timeout(&self) -> Option<Duration> {
        self.step_timeout_secs.map(Duration::from_secs)
    }
}

impl AssetConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;

        let is_prod = common_config.is_production();
        let default_backend = if is_prod { "azure" } else { "local" };

        let config = AssetConfig {
            common: common_config,
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URI", None, is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("asset_db"), is_prod)?,
                collection: get_env("MONGODB_COLLECTION", Some("dalleAssets"), is_prod)?,
            },
            storage: StorageConfig {
                backend: get_env("STORAGE_BACKEND", Some(default_backend), false)?
                    .parse()
                    .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
                container: get_env("STORAGE_CONTAINER", Some("motion-ai"), is_prod)?,
                connection_string: env::var("AZURE_STORAGE_CONNECTION_STRING").ok(),
                local_path: get_env("STORAGE_LOCAL_PATH", Some("storage"), false)?,
                public_base_url: get_env(
                    "STORAGE_PUBLIC_BASE_URL",
                    Some("http://localhost:8080/static"),
                    false,
                )?,
            },
            openai: OpenAiSettings {
                enabled: parse_bool(&get_env("OPENAI_ENABLED", Some("false"), false)?),
                api_key: env::var("OPENAI_API_KEY").ok(),
                api_base: get_env("OPENAI_API_BASE", Some("https://api.openai.com/v1"), false)?,
                model: get_env("OPENAI_IMAGE_MODEL", Some("dall-e-3"), false)?,
            },
            orchestrator: OrchestratorConfig {
                step_timeout_secs: parse_timeout_secs(
                    "ASSET_COLLABORATOR_TIMEOUT_SECS",
                    env::var("ASSET_COLLABORATOR_TIMEOUT_SECS").ok(),
                )?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field requirements that env defaults cannot express.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.storage.backend == StorageBackend::Azure
            && self
                .storage
                .connection_string
                .as_deref()
                .map_or(true, str::is_empty)
        {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "AZURE_STORAGE_CONNECTION_STRING is required for the azure storage backend"
            )));
        }

        // Production never falls back to placeholder images.
        if self.common.is_production() && !self.openai.enabled {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "OPENAI_ENABLED must be set in production; the mock image provider is for development only"
            )));
        }

        if self.openai.enabled && self.openai.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "OPENAI_API_KEY is required when OPENAI_ENABLED is set"
            )));
        }

        Ok(())
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(StorageBackend::Local),
            "azure" => Ok(StorageBackend::Azure),
            _ => Err(format!("Invalid storage backend: {}", s)),
        }
    }
}

/// Unset means no limit. Anything set must be a positive whole number.
fn parse_timeout_secs(key: &str, value: Option<String>) -> Result<Option<u64>, AppError> {
    let Some(raw) = value else {
        return Ok(None);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(AppError::ConfigError(anyhow::anyhow!(
            "{} must be greater than zero",
            key
        ))),
        Ok(secs) => Ok(Some(secs)),
        Err(e) => Err(AppError::ConfigError(anyhow::anyhow!(
            "{} must be a number of seconds, got {:?}: {}",
            key,
            raw,
            e
        ))),
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
