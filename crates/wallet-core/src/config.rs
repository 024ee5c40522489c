//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/wallet/config.toml)
//! 3. Environment variables (WALLET_* prefix)
//!
//! Environment variables take precedence over config file values.
//!
//! Remote credentials are optional: a configuration without `project_id`
//! and `api_key` is valid and simply disables sync.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::remote::RemoteConfig;

/// Environment variable prefix
const ENV_PREFIX: &str = "WALLET";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for data storage (SQLite db, log file)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Remote document service project identifier (optional)
    #[serde(default)]
    pub project_id: Option<String>,

    /// Remote document service API key (optional)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Override for the remote endpoint root (optional)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Log file location (defaults to data_dir/wallet.log)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            project_id: None,
            api_key: None,
            base_url: None,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (WALLET_DATA_DIR, WALLET_PROJECT_ID, ...)
    /// 2. Config file (~/.config/wallet/config.toml or WALLET_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var(format!("{}_PROJECT_ID", ENV_PREFIX)) {
            self.project_id = if val.is_empty() { None } else { Some(val) };
        }

        if let Ok(val) = std::env::var(format!("{}_API_KEY", ENV_PREFIX)) {
            self.api_key = if val.is_empty() { None } else { Some(val) };
        }

        if let Ok(val) = std::env::var(format!("{}_BASE_URL", ENV_PREFIX)) {
            self.base_url = if val.is_empty() { None } else { Some(val) };
        }
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_file_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with WALLET_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wallet")
            .join("config.toml")
    }

    /// Get the path to the SQLite database
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("wallet.db")
    }

    /// Remote endpoint configuration, present only when both credentials are set.
    ///
    /// `None` means sync is disabled for the session; this is a valid state,
    /// not an error.
    pub fn remote(&self) -> Option<RemoteConfig> {
        match (&self.project_id, &self.api_key) {
            (Some(project_id), Some(api_key)) => {
                let mut remote = RemoteConfig::new(project_id, api_key);
                if let Some(ref base_url) = self.base_url {
                    remote = remote.with_base_url(base_url);
                }
                Some(remote)
            }
            _ => None,
        }
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wallet")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap();
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            // Clear all the vars
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "WALLET_DATA_DIR",
        "WALLET_PROJECT_ID",
        "WALLET_API_KEY",
        "WALLET_BASE_URL",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.project_id.is_none());
        assert!(config.api_key.is_none());
        assert!(config.data_dir.ends_with("wallet"));
    }

    #[test]
    fn test_remote_requires_both_credentials() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        assert!(config.remote().is_none());

        config.project_id = Some("my-project".to_string());
        assert!(config.remote().is_none());

        config.api_key = Some("secret".to_string());
        let remote = config.remote().unwrap();
        assert!(remote.base_url().contains("my-project"));
    }

    #[test]
    fn test_remote_base_url_override() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            project_id: Some("p".to_string()),
            api_key: Some("k".to_string()),
            base_url: Some("http://localhost:8080/v1".to_string()),
            ..Config::default()
        };

        let remote = config.remote().unwrap();
        assert_eq!(remote.base_url(), "http://localhost:8080/v1");
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("WALLET_DATA_DIR", "/tmp/wallet-test");
        config.apply_env_overrides();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/wallet-test"));
    }

    #[test]
    fn test_env_override_credentials() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        assert!(config.project_id.is_none());

        env::set_var("WALLET_PROJECT_ID", "env-project");
        env::set_var("WALLET_API_KEY", "env-key");
        config.apply_env_overrides();
        assert_eq!(config.project_id, Some("env-project".to_string()));
        assert_eq!(config.api_key, Some("env-key".to_string()));

        // Empty string clears them
        env::set_var("WALLET_PROJECT_ID", "");
        config.apply_env_overrides();
        assert!(config.project_id.is_none());
    }

    #[test]
    fn test_serialization() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            data_dir: PathBuf::from("/data/wallet"),
            project_id: Some("my-project".to_string()),
            api_key: Some("secret".to_string()),
            base_url: None,
            log_file: None,
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("project_id"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.project_id, config.project_id);
        assert_eq!(parsed.api_key, config.api_key);
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            data_dir = "/custom/data"
            project_id = "demo"
            api_key = "demo-key"
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert!(config.remote().is_some());
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let temp_dir = tempfile::TempDir::new().unwrap();
        env::set_var("WALLET_DATA_DIR", temp_dir.path().join("data"));

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        // Should return defaults when file doesn't exist
        assert!(config.project_id.is_none());
        assert!(config.remote().is_none());
    }
}
