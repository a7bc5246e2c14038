use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::{LoomError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Delay between batch downloads when `--timeout` is not given
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    #[serde(default = "default_history_enabled")]
    pub history_enabled: bool,
    #[serde(default)]
    pub history_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_delay_ms() -> u64 {
    5000
}
fn default_history_enabled() -> bool {
    true
}
fn default_base_url() -> String {
    "https://www.loom.com".to_string()
}
fn default_user_agent() -> String {
    format!("loom-dl/{}", env!("CARGO_PKG_VERSION"))
}
fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            history_enabled: default_history_enabled(),
            history_file: None,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub struct ConfigManager {
    config_file: PathBuf,
    data_dir: Option<PathBuf>,
    config: Config,
}

impl ConfigManager {
    /// Load the config from `override_path`, or from the per-user config
    /// directory. A missing file yields the defaults; nothing is written.
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let project_dirs = ProjectDirs::from("", "", "loom-dl");

        let config_file = match (override_path, &project_dirs) {
            (Some(path), _) => path.to_path_buf(),
            (None, Some(dirs)) => dirs.config_dir().join("config.toml"),
            (None, None) => {
                return Err(LoomError::Config(
                    "Failed to determine config directory".to_string(),
                ));
            }
        };

        let config = if config_file.exists() {
            Self::load_config(&config_file)?
        } else if override_path.is_some() {
            return Err(LoomError::Config(format!(
                "Config file not found: {:?}",
                config_file
            )));
        } else {
            Config::default()
        };

        Ok(Self {
            config_file,
            data_dir: project_dirs.map(|d| d.data_dir().to_path_buf()),
            config,
        })
    }

    /// Build a manager around an in-memory config, without touching disk.
    pub fn from_config(config: Config) -> Self {
        Self {
            config_file: PathBuf::from("config.toml"),
            data_dir: None,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Where completed batch downloads are recorded, if history is enabled.
    pub fn history_file(&self) -> Option<PathBuf> {
        if !self.config.general.history_enabled {
            return None;
        }
        self.config
            .general
            .history_file
            .clone()
            .or_else(|| self.data_dir.as_ref().map(|d| d.join("downloaded.log")))
    }

    fn load_config(config_file: &Path) -> Result<Config> {
        let content = fs::read_to_string(config_file)
            .map_err(|e| LoomError::filesystem(config_file, e))?;

        toml::from_str(&content).map_err(|e| {
            LoomError::Config(format!("Failed to parse config file {:?}: {}", config_file, e))
        })
    }

    /// Validate the current configuration
    pub fn validate(&self) -> Result<()> {
        let api = &self.config.api;

        Url::parse(&api.base_url).map_err(|e| {
            LoomError::Config(format!("api.base_url '{}' is invalid: {}", api.base_url, e))
        })?;

        if api.user_agent.trim().is_empty() {
            return Err(LoomError::Config("api.user_agent cannot be empty".to_string()));
        }

        if api.request_timeout_secs == 0 {
            return Err(LoomError::Config(
                "api.request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
