//! Configuration management for Warden.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::captcha::PatternCatalog;
use rookery_common::GateError;
use rookery_common::constants::{
    DEFAULT_ASSET_DIR, DEFAULT_CHALLENGE_TTL_SECS, DEFAULT_FONT_PATH, DEFAULT_MAX_ATTEMPTS,
};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Directory holding pattern artwork files
    #[serde(default = "default_asset_dir")]
    pub asset_dir: String,

    /// TrueType font for challenge text (embedded fallback if unavailable)
    #[serde(default = "default_font_path")]
    pub font_path: String,

    /// Challenge validity in seconds
    #[serde(default = "default_challenge_ttl")]
    pub challenge_ttl_secs: u64,

    /// Wrong answers allowed before lockout
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Pattern identifier -> secret key table, replacing the builtin
    /// catalog when present
    #[serde(default)]
    pub patterns: Option<BTreeMap<String, u8>>,
}

// Default value functions
fn default_asset_dir() -> String {
    DEFAULT_ASSET_DIR.to_string()
}
fn default_font_path() -> String {
    DEFAULT_FONT_PATH.to_string()
}
fn default_challenge_ttl() -> u64 {
    DEFAULT_CHALLENGE_TTL_SECS
}
fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            asset_dir: default_asset_dir(),
            font_path: default_font_path(),
            challenge_ttl_secs: default_challenge_ttl(),
            max_attempts: default_max_attempts(),
            patterns: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist
    pub fn load(config_path: &str) -> Result<Self> {
        if Path::new(config_path).exists() {
            let settings = config::Config::builder()
                .add_source(config::File::with_name(config_path))
                .build()
                .context("Failed to load config file")?;

            settings.try_deserialize().context("Failed to parse config")
        } else {
            tracing::warn!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Build the pattern catalog this configuration describes.
    /// A present-but-empty `patterns` table is a configuration error.
    pub fn catalog(&self) -> Result<PatternCatalog, GateError> {
        match &self.patterns {
            Some(patterns) => PatternCatalog::from_map(patterns.clone()),
            None => Ok(PatternCatalog::builtin()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.asset_dir, "assets/patterns");
        assert_eq!(config.challenge_ttl_secs, 600);
        assert_eq!(config.max_attempts, 3);
        assert!(config.patterns.is_none());
        assert_eq!(config.catalog().unwrap().len(), 25);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AppConfig::load("/nonexistent/warden.toml").unwrap();
        assert_eq!(config.max_attempts, 3);
    }

    #[test]
    fn test_empty_patterns_table_rejected() {
        let config = AppConfig {
            patterns: Some(BTreeMap::new()),
            ..Default::default()
        };
        assert!(matches!(config.catalog(), Err(GateError::Config(_))));
    }

    #[test]
    fn test_custom_patterns_override_builtin() {
        let mut patterns = BTreeMap::new();
        patterns.insert("owl0".to_string(), 4);
        let config = AppConfig {
            patterns: Some(patterns),
            ..Default::default()
        };
        let catalog = config.catalog().unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.key_for("owl0"), Some(4));
    }
}
