//! Configuration handling for VPN auth profiles

use crate::agent::AuthMode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileConfig>,
}

/// Per-profile authentication settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub auth_mode: AuthMode,
    /// Read secrets from, and save prompted secrets to, the OS keychain
    #[serde(default)]
    pub save_in_keychain: bool,
    /// Username offered as the default in the credentials prompt
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub management: ManagementConfig,
}

/// Where the OpenVPN management interface for this profile listens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagementConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ManagementConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7505,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            "office".to_string(),
            ProfileConfig {
                auth_mode: AuthMode::Password,
                save_in_keychain: true,
                username: None,
                management: ManagementConfig::default(),
            },
        );
        Self { profiles }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Look up a profile by name
    pub fn profile(&self, name: &str) -> Option<&ProfileConfig> {
        self.profiles.get(name)
    }

    /// Default config location (`<config dir>/vpn-auth-agent/config.toml`)
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vpn-auth-agent")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_has_office_profile() {
        let config = Config::default();
        let profile = config.profile("office").unwrap();
        assert_eq!(profile.auth_mode, AuthMode::Password);
        assert!(profile.save_in_keychain);
        assert_eq!(profile.management.port, 7505);
        assert!(config.profile("missing").is_none());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.profiles.insert(
            "lab".to_string(),
            ProfileConfig {
                auth_mode: AuthMode::PrivateKey,
                save_in_keychain: false,
                username: Some("bob".to_string()),
                management: ManagementConfig {
                    host: "127.0.0.1".to_string(),
                    port: 1337,
                },
            },
        );
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.profiles.len(), 2);
        assert_eq!(loaded.profile("lab"), config.profile("lab"));
    }

    #[test]
    fn test_parse_minimal_profile() {
        let toml = r#"
            [profiles.home]
            auth_mode = "private_key"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        let profile = config.profile("home").unwrap();
        assert_eq!(profile.auth_mode, AuthMode::PrivateKey);
        assert!(!profile.save_in_keychain);
        assert_eq!(profile.username, None);
        assert_eq!(profile.management, ManagementConfig::default());
    }

    #[test]
    fn test_parse_invalid_auth_mode() {
        let toml = r#"
            [profiles.home]
            auth_mode = "smartcard"
        "#;

        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = Config::load(&temp_dir.path().join("nope.toml"));
        assert!(matches!(result.unwrap_err(), ConfigError::ReadError(_)));
    }
}
