//! Configuration loader with layered sources.

use crate::AppConfig;
use baserepo_core::{rules, BaseRepoError};
use config::{Config, ConfigError, Environment, File};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Environment variable naming the active environment.
pub const ENVIRONMENT_VAR: &str = "BASEREPO_ENVIRONMENT";

/// Configuration loader with runtime reload support.
#[derive(Clone)]
pub struct ConfigLoader {
    config: Arc<RwLock<AppConfig>>,
    config_dir: PathBuf,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// Configuration is loaded from multiple sources in order:
    /// 1. `{config_dir}/default.toml`
    /// 2. `{config_dir}/{environment}.toml`
    /// 3. `{config_dir}/local.toml`
    /// 4. Environment variables with the `BASEREPO__` prefix, e.g.
    ///    `BASEREPO__API__URL`
    pub fn new(config_dir: impl Into<PathBuf>) -> Result<Self, BaseRepoError> {
        let config_dir = config_dir.into();
        let config = Self::load_config(&config_dir)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_dir,
        })
    }

    /// Loads configuration from the default location (`./config`).
    pub fn from_default_location() -> Result<Self, BaseRepoError> {
        Self::new("./config")
    }

    /// Returns the current configuration.
    #[must_use]
    pub fn get(&self) -> AppConfig {
        self.config.read().clone()
    }

    /// Reloads the configuration from disk.
    ///
    /// On failure the previous snapshot stays in place.
    pub fn reload(&self) -> Result<(), BaseRepoError> {
        let new_config = Self::load_config(&self.config_dir)?;
        *self.config.write() = new_config;
        info!("Configuration reloaded successfully");
        Ok(())
    }

    fn load_config(config_dir: &Path) -> Result<AppConfig, BaseRepoError> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        let environment =
            std::env::var(ENVIRONMENT_VAR).unwrap_or_else(|_| "development".to_string());
        info!(%environment, config_dir = %config_dir.display(), "Loading configuration");

        let mut builder = Config::builder()
            .set_default("app.environment", environment.as_str())
            .map_err(config_error_to_error)?;
        for name in ["default", environment.as_str(), "local"] {
            let path = config_dir.join(format!("{name}.toml"));
            if path.exists() {
                debug!(path = %path.display(), "Loading config file");
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("BASEREPO")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_error_to_error)?;
        let app_config: AppConfig = config.try_deserialize().map_err(config_error_to_error)?;

        Self::validate_config(&app_config)?;

        Ok(app_config)
    }

    fn validate_config(config: &AppConfig) -> Result<(), BaseRepoError> {
        rules::absolute_url(&config.api.url).map_err(|e| {
            BaseRepoError::Configuration(format!(
                "api.url `{}` is not an absolute URL: {}",
                config.api.url, e.code
            ))
        })?;

        let insecure = Url::parse(&config.api.url).is_ok_and(|url| url.scheme() != "https");
        if config.app.environment == "production" && insecure {
            warn!(api_url = %config.api.url, "Links will not use https in production");
        }

        let pagination = &config.pagination;
        for (name, value) in [
            ("per_page", pagination.per_page),
            ("array_per_page", pagination.array_per_page),
            ("cursor_limit", pagination.cursor_limit),
            ("max_per_page", pagination.max_per_page),
        ] {
            if value == 0 {
                return Err(BaseRepoError::Configuration(format!(
                    "pagination.{name} must be at least 1"
                )));
            }
        }
        if pagination.per_page > pagination.max_per_page {
            return Err(BaseRepoError::Configuration(format!(
                "pagination.per_page ({}) exceeds pagination.max_per_page ({})",
                pagination.per_page, pagination.max_per_page
            )));
        }

        Ok(())
    }

    /// Gets a specific configuration value by dotted key path.
    pub fn get_value<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let json = serde_json::to_value(&*self.config.read()).ok()?;

        let mut current = &json;
        for part in key.split('.') {
            current = current.get(part)?;
        }

        serde_json::from_value(current.clone()).ok()
    }
}

fn config_error_to_error(err: ConfigError) -> BaseRepoError {
    BaseRepoError::Configuration(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) {
        fs::write(dir.path().join(name), contents).unwrap();
    }

    #[test]
    fn test_empty_dir_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let loader = ConfigLoader::new(dir.path()).unwrap();
        let config = loader.get();
        assert_eq!(config.api.url, "http://localhost");
        assert_eq!(config.pagination, crate::PaginationConfig::default());
    }

    #[test]
    fn test_layers_override_in_order() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "default.toml",
            "[api]\nurl = \"http://example.com\"\n[pagination]\nper_page = 10\n",
        );
        write(&dir, "local.toml", "[pagination]\nper_page = 15\n");

        let config = ConfigLoader::new(dir.path()).unwrap().get();
        assert_eq!(config.api.url, "http://example.com");
        assert_eq!(config.pagination.per_page, 15);
        assert_eq!(config.pagination.cursor_limit, 50);
    }

    #[test]
    fn test_relative_api_url_rejected() {
        let dir = TempDir::new().unwrap();
        write(&dir, "default.toml", "[api]\nurl = \"/users\"\n");
        let err = ConfigLoader::new(dir.path()).err().unwrap();
        assert!(matches!(
            err,
            BaseRepoError::Configuration(ref msg) if msg.contains("url_not_absolute")
        ));
    }

    #[test]
    fn test_non_base_api_url_rejected() {
        let dir = TempDir::new().unwrap();
        write(&dir, "default.toml", "[api]\nurl = \"mailto:ops@example.com\"\n");
        let err = ConfigLoader::new(dir.path()).err().unwrap();
        assert!(matches!(
            err,
            BaseRepoError::Configuration(ref msg) if msg.contains("url_cannot_be_base")
        ));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let dir = TempDir::new().unwrap();
        write(&dir, "default.toml", "[pagination]\ncursor_limit = 0\n");
        assert!(ConfigLoader::new(dir.path()).is_err());
    }

    #[test]
    fn test_per_page_above_max_rejected() {
        let dir = TempDir::new().unwrap();
        write(&dir, "default.toml", "[pagination]\nper_page = 200\n");
        assert!(ConfigLoader::new(dir.path()).is_err());
    }

    #[test]
    fn test_reload_picks_up_changes() {
        let dir = TempDir::new().unwrap();
        write(&dir, "default.toml", "[api]\nversion = \"/v1\"\n");
        let loader = ConfigLoader::new(dir.path()).unwrap();
        assert_eq!(loader.get().api.base_url(), "http://localhost/v1");

        write(&dir, "default.toml", "[api]\nversion = \"/v2\"\n");
        loader.reload().unwrap();
        assert_eq!(loader.get().api.base_url(), "http://localhost/v2");
    }

    #[test]
    fn test_failed_reload_keeps_snapshot() {
        let dir = TempDir::new().unwrap();
        write(&dir, "default.toml", "[api]\nurl = \"http://one.example\"\n");
        let loader = ConfigLoader::new(dir.path()).unwrap();

        write(&dir, "default.toml", "[api]\nurl = \"not a url\"\n");
        assert!(loader.reload().is_err());
        assert_eq!(loader.get().api.url, "http://one.example");
    }

    #[test]
    fn test_get_value() {
        let dir = TempDir::new().unwrap();
        write(&dir, "default.toml", "[pagination]\narray_per_page = 20\n");
        let loader = ConfigLoader::new(dir.path()).unwrap();
        assert_eq!(loader.get_value::<u64>("pagination.array_per_page"), Some(20));
        assert_eq!(loader.get_value::<String>("api.url").as_deref(), Some("http://localhost"));
        assert_eq!(loader.get_value::<u64>("pagination.missing"), None);
    }
}
