use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct PluginConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory scanned for downloadable plugin artifacts.
    pub plugins_dir: String,
    /// Directory holding users.json and plugin_packs.json.
    pub config_dir: String,
    /// File extension identifying artifact files (without the dot).
    pub artifact_extension: String,
}

impl PluginConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(PluginConfig {
            common: common_config,
            storage: StorageConfig {
                plugins_dir: get_env("PLUGINS_DIR", Some("plugins"), is_prod)?,
                config_dir: get_env("CONFIG_DIR", Some("config"), is_prod)?,
                artifact_extension: get_env("ARTIFACT_EXTENSION", Some("py"), is_prod)?,
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}
