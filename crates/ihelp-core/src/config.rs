use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_CHAT_PATH: &str = "/api/chat";
pub const DEFAULT_DOCUMENTS_PATH: &str = "/api/documents";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const API_URL_ENV: &str = "IHELP_API_URL";
pub const TIMEOUT_ENV: &str = "IHELP_TIMEOUT_SECS";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub api_url: Option<String>,
    pub chat_path: Option<String>,
    pub documents_path: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("ihelp"))
    }

    fn get_config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }
}

/// Values given on the command line; these win over everything else
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Fully resolved connection settings for the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewaySettings {
    pub base_url: String,
    pub chat_path: String,
    pub documents_path: String,
    pub timeout: Duration,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            chat_path: DEFAULT_CHAT_PATH.to_string(),
            documents_path: DEFAULT_DOCUMENTS_PATH.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl GatewaySettings {
    /// Resolve settings: CLI flag > environment > config file > defaults
    pub fn resolve(config: &Config, overrides: &Overrides) -> Self {
        Self::from_sources(
            config,
            overrides,
            std::env::var(API_URL_ENV).ok(),
            std::env::var(TIMEOUT_ENV).ok(),
        )
    }

    pub fn from_sources(
        config: &Config,
        overrides: &Overrides,
        env_url: Option<String>,
        env_timeout: Option<String>,
    ) -> Self {
        // Blank or zero values skip to the next source rather than ending the chain
        let non_blank = |url: &String| !url.trim().is_empty();
        let base_url = overrides
            .api_url
            .clone()
            .filter(non_blank)
            .or(env_url.filter(non_blank))
            .or_else(|| config.api_url.clone().filter(non_blank))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let env_timeout = env_timeout.and_then(|raw| match raw.trim().parse::<u64>() {
            Ok(secs) => Some(secs),
            Err(_) => {
                warn!(value = %raw, "ignoring invalid {}", TIMEOUT_ENV);
                None
            }
        });

        let positive = |secs: &u64| *secs > 0;
        let timeout_secs = overrides
            .timeout_secs
            .filter(positive)
            .or(env_timeout.filter(positive))
            .or(config.timeout_secs.filter(positive))
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            chat_path: normalize_path(config.chat_path.as_deref(), DEFAULT_CHAT_PATH),
            documents_path: normalize_path(config.documents_path.as_deref(), DEFAULT_DOCUMENTS_PATH),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn chat_url(&self) -> String {
        format!("{}{}", self.base_url, self.chat_path)
    }

    pub fn documents_url(&self) -> String {
        format!("{}{}", self.base_url, self.documents_path)
    }
}

fn normalize_path(path: Option<&str>, default: &str) -> String {
    let path = path.map(str::trim).filter(|p| !p.is_empty()).unwrap_or(default);
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = GatewaySettings::from_sources(&Config::new(), &Overrides::default(), None, None);
        assert_eq!(settings, GatewaySettings::default());
        assert_eq!(settings.chat_url(), "http://127.0.0.1:5000/api/chat");
        assert_eq!(settings.documents_url(), "http://127.0.0.1:5000/api/documents");
    }

    #[test]
    fn test_precedence() {
        let config = Config {
            api_url: Some("http://file:1".to_string()),
            timeout_secs: Some(10),
            ..Config::new()
        };

        let settings = GatewaySettings::from_sources(&config, &Overrides::default(), None, None);
        assert_eq!(settings.base_url, "http://file:1");
        assert_eq!(settings.timeout, Duration::from_secs(10));

        let settings = GatewaySettings::from_sources(
            &config,
            &Overrides::default(),
            Some("http://env:2/".to_string()),
            Some("20".to_string()),
        );
        assert_eq!(settings.base_url, "http://env:2");
        assert_eq!(settings.timeout, Duration::from_secs(20));

        let overrides = Overrides {
            api_url: Some("http://cli:3".to_string()),
            timeout_secs: Some(40),
        };
        let settings = GatewaySettings::from_sources(
            &config,
            &overrides,
            Some("http://env:2".to_string()),
            Some("20".to_string()),
        );
        assert_eq!(settings.base_url, "http://cli:3");
        assert_eq!(settings.timeout, Duration::from_secs(40));
    }

    #[test]
    fn test_zero_or_blank_values_fall_through_to_next_source() {
        let config = Config {
            api_url: Some("http://file:1".to_string()),
            timeout_secs: Some(10),
            ..Config::new()
        };
        let overrides = Overrides {
            api_url: Some("  ".to_string()),
            timeout_secs: Some(0),
        };

        let settings = GatewaySettings::from_sources(
            &config,
            &overrides,
            Some("http://env:2".to_string()),
            Some("25".to_string()),
        );
        assert_eq!(settings.base_url, "http://env:2");
        assert_eq!(settings.timeout, Duration::from_secs(25));

        let settings = GatewaySettings::from_sources(
            &config,
            &overrides,
            Some(String::new()),
            Some("0".to_string()),
        );
        assert_eq!(settings.base_url, "http://file:1");
        assert_eq!(settings.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_invalid_env_timeout_is_ignored() {
        let settings = GatewaySettings::from_sources(
            &Config::new(),
            &Overrides::default(),
            None,
            Some("soon".to_string()),
        );
        assert_eq!(settings.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_paths_are_normalized() {
        let config = Config {
            chat_path: Some("api/process".to_string()),
            documents_path: Some("  ".to_string()),
            ..Config::new()
        };
        let settings = GatewaySettings::from_sources(&config, &Overrides::default(), None, None);
        assert_eq!(settings.chat_path, "/api/process");
        assert_eq!(settings.documents_path, DEFAULT_DOCUMENTS_PATH);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            api_url: Some("http://localhost:8080".to_string()),
            chat_path: Some("/api/process".to_string()),
            documents_path: None,
            timeout_secs: Some(15),
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::new());
    }
}
