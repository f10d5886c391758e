//! Application configuration structures.

use baserepo_core::{SerializerConfig, TelemetryConfig};
use serde::{Deserialize, Serialize};

/// Root application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name and metadata.
    #[serde(default)]
    pub app: AppMetadata,

    /// Public API location used for generated links.
    #[serde(default)]
    pub api: ApiConfig,

    /// Page sizes.
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Logging configuration.
    #[serde(default)]
    pub observability: TelemetryConfig,
}

impl AppConfig {
    /// Serializer settings derived from `api`.
    #[must_use]
    pub fn serializer_config(&self) -> SerializerConfig {
        self.api.serializer_config()
    }
}

/// Application metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppMetadata {
    pub name: String,
    /// Environment (development, staging, production).
    pub environment: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "baserepo".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Public API location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Absolute base URL, e.g. `https://api.example.com`.
    pub url: String,
    /// Optional path prefix such as `/api/v1`.
    pub version: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost".to_string(),
            version: None,
        }
    }
}

impl ApiConfig {
    /// Returns `url` joined with `version`.
    #[must_use]
    pub fn base_url(&self) -> String {
        let url = self.url.trim_end_matches('/');
        match self.version.as_deref().map(|v| v.trim_matches('/')) {
            Some(version) if !version.is_empty() => format!("{url}/{version}"),
            _ => url.to_string(),
        }
    }

    #[must_use]
    pub fn serializer_config(&self) -> SerializerConfig {
        SerializerConfig::new(self.base_url())
    }
}

/// Page sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Default page size for data source pagination.
    pub per_page: u64,
    /// Default page size for slicing in-memory collections.
    pub array_per_page: u64,
    /// Default window size for cursor pagination.
    pub cursor_limit: u64,
    /// Upper bound applied to caller-supplied page sizes.
    pub max_per_page: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            per_page: 25,
            array_per_page: 50,
            cursor_limit: 50,
            max_per_page: 100,
        }
    }
}
