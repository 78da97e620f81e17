//! Configuration loading, validation, and management for Chaty.
//!
//! Loads configuration from `~/.chaty/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The root configuration structure.
///
/// Maps directly to `~/.chaty/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Bot display name, shown in the startup banner.
    #[serde(default = "default_bot_name")]
    pub bot_name: String,

    /// Durable store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Pairing credential configuration
    #[serde(default)]
    pub pairing: PairingConfig,

    /// Generative fallback configuration
    #[serde(default)]
    pub generative: GenerativeConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,
}

fn default_bot_name() -> String {
    "Chaty".into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Which backend to use: "sqlite" or "in_memory".
    #[serde(default = "default_store_backend")]
    pub backend: String,

    /// SQLite database path, relative to the data dir unless absolute.
    #[serde(default = "default_db_file")]
    pub db_file: String,
}

fn default_store_backend() -> String {
    "sqlite".into()
}
fn default_db_file() -> String {
    "chaty.db".into()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            db_file: default_db_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairingConfig {
    /// Directory holding pairing.json, pairing.png, session.json, and the
    /// transport's local auth state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// How long an issued pairing code stays valid, in days.
    #[serde(default = "default_validity_days")]
    pub validity_days: i64,
}

fn default_validity_days() -> i64 {
    30
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            validity_days: default_validity_days(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct GenerativeConfig {
    /// Gemini API key (env override: CHATY_GEMINI_API_KEY / GEMINI_API_KEY).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_model() -> String {
    "gemini-1.5-flash".into()
}
fn default_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}

impl Default for GenerativeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            api_url: default_api_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    3000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bot_name: default_bot_name(),
            store: StoreConfig::default(),
            pairing: PairingConfig::default(),
            generative: GenerativeConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bot_name", &self.bot_name)
            .field("store", &self.store)
            .field("pairing", &self.pairing)
            .field("generative", &self.generative)
            .field("gateway", &self.gateway)
            .finish()
    }
}

impl std::fmt::Debug for GenerativeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerativeConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default location with env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        // Environment variable overrides (highest priority)
        if config.generative.api_key.is_none() {
            config.generative.api_key = std::env::var("CHATY_GEMINI_API_KEY")
                .ok()
                .or_else(|| std::env::var("GEMINI_API_KEY").ok())
                // The original deployment misspelled the variable; accept it.
                .or_else(|| std::env::var("GERMINI_API_KEY").ok());
        }

        if let Ok(model) = std::env::var("CHATY_MODEL") {
            config.generative.model = model;
        }

        if let Ok(port) = std::env::var("CHATY_PORT") {
            config.gateway.port = port
                .parse()
                .map_err(|_| ConfigError::ValidationError(format!("invalid CHATY_PORT: {port}")))?;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".chaty")
    }

    /// Directory for pairing artifacts and the transport's auth state.
    pub fn data_dir(&self) -> PathBuf {
        self.pairing
            .data_dir
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("data"))
    }

    /// Resolved SQLite database path.
    pub fn db_path(&self) -> PathBuf {
        let file = Path::new(&self.store.db_file);
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.data_dir().join(file)
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "bot_name must not be empty".into(),
            ));
        }

        if self.pairing.validity_days <= 0 {
            return Err(ConfigError::ValidationError(
                "pairing.validity_days must be positive".into(),
            ));
        }

        match self.store.backend.as_str() {
            "sqlite" | "in_memory" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "unknown store backend: {other}"
                )));
            }
        }

        Ok(())
    }
}

fn dirs_home() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bot_name, "Chaty");
        assert_eq!(config.gateway.port, 3000);
        assert_eq!(config.pairing.validity_days, 30);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.bot_name, config.bot_name);
        assert_eq!(parsed.gateway.port, config.gateway.port);
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().generative.model, "gemini-1.5-flash");
    }

    #[test]
    fn zero_validity_rejected() {
        let config = AppConfig {
            pairing: PairingConfig {
                data_dir: None,
                validity_days: 0,
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_backend_rejected() {
        let config = AppConfig {
            store: StoreConfig {
                backend: "postgres".into(),
                db_file: default_db_file(),
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn api_key_redacted_in_debug() {
        let config = AppConfig {
            generative: GenerativeConfig {
                api_key: Some("super-secret".into()),
                ..GenerativeConfig::default()
            },
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn parse_partial_toml() {
        let toml_str = r#"
bot_name = "Helpdesk"

[gateway]
port = 8080

[pairing]
validity_days = 7
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.bot_name, "Helpdesk");
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.pairing.validity_days, 7);
        // Untouched sections fall back to defaults
        assert_eq!(config.store.backend, "sqlite");
    }

    #[test]
    fn db_path_respects_absolute_file() {
        let config = AppConfig {
            store: StoreConfig {
                backend: "sqlite".into(),
                db_file: "/var/lib/chaty/bot.db".into(),
            },
            ..AppConfig::default()
        };
        assert_eq!(config.db_path(), PathBuf::from("/var/lib/chaty/bot.db"));
    }
}
