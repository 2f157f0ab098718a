//! Parser configuration.
//!
//! ```toml
//! # ~/.config/layersql/config.toml
//! namespace = "layer"
//! default_prediction_column = "prediction"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{LayerSqlError, LayerSqlResult};

/// Environment variable pointing at an alternative config file.
pub const CONFIG_ENV: &str = "LAYERSQL_CONFIG";

/// Settings shared by every parse.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LayerSqlConfig {
    /// Qualifier that marks a call as an annotation (`layer.train`)
    pub namespace: String,

    /// Output column name used when a predict call has no alias
    pub default_prediction_column: String,
}

impl Default for LayerSqlConfig {
    fn default() -> Self {
        Self {
            namespace: "layer".to_string(),
            default_prediction_column: "prediction".to_string(),
        }
    }
}

impl LayerSqlConfig {
    /// Create a new configuration builder
    pub fn builder() -> LayerSqlConfigBuilder {
        LayerSqlConfigBuilder::default()
    }

    /// Parse a TOML document. Missing keys fall back to defaults.
    pub fn from_toml(content: &str) -> LayerSqlResult<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| LayerSqlError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> LayerSqlResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Load from `$LAYERSQL_CONFIG`, then the user config dir, else defaults.
    /// A path named by the environment variable must exist.
    pub fn discover() -> LayerSqlResult<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            tracing::debug!(path = %path, "loading config from {}", CONFIG_ENV);
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => {
                tracing::debug!(path = %path.display(), "loading user config");
                Self::load(path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// `<config dir>/layersql/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("layersql").join("config.toml"))
    }

    fn validate(&self) -> LayerSqlResult<()> {
        let is_word = |s: &str| {
            !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_')
        };
        if !is_word(&self.namespace) {
            return Err(LayerSqlError::Config(format!(
                "namespace must be a plain identifier, got '{}'",
                self.namespace
            )));
        }
        if self.default_prediction_column.trim().is_empty() {
            return Err(LayerSqlError::Config(
                "default_prediction_column must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for LayerSqlConfig
#[derive(Debug, Default)]
pub struct LayerSqlConfigBuilder {
    config: LayerSqlConfig,
}

impl LayerSqlConfigBuilder {
    /// Set the reserved namespace
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.namespace = namespace.into();
        self
    }

    /// Set the fallback prediction column name
    pub fn default_prediction_column(mut self, column: impl Into<String>) -> Self {
        self.config.default_prediction_column = column.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> LayerSqlResult<LayerSqlConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
