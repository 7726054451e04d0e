use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment override for the backend origin. Takes precedence over the
/// config file.
pub const API_URL_ENV: &str = "TICKETFLOW_API_URL";

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_WEB_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiConfig,
    pub web: WebConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WebConfig {
    pub url: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_WEB_URL.to_string(),
        }
    }
}

impl Settings {
    /// Loads settings from `~/.ticketflow/config.toml`. A missing file means
    /// defaults; a file that exists but does not parse is an error.
    pub fn load() -> Result<Self> {
        let mut settings = Self::load_file()?;
        settings.apply_env_override(std::env::var(API_URL_ENV).ok());
        Ok(settings)
    }

    /// Like [`Settings::load`] but without the environment override. Used
    /// where the result is written back, so an override never ends up
    /// persisted in the file.
    pub fn load_file() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let config_str =
            std::fs::read_to_string(config_path).context("Failed to read config file")?;

        let settings: Settings = toml::from_str(&config_str).map_err(|err| {
            anyhow::anyhow!(
                "{}",
                crate::errors::TicketFlowError::ConfigInvalid(err.to_string())
            )
        })?;

        Ok(settings)
    }

    fn apply_env_override(&mut self, api_url: Option<String>) {
        if let Some(url) = api_url.filter(|url| !url.is_empty()) {
            self.api.base_url = url;
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let config_str = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, config_str).context("Failed to write config file")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&config_path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&config_path, perms)?;
        }

        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn config_dir() -> Result<PathBuf> {
        let home = std::env::var("HOME").context("HOME environment variable not set")?;
        Ok(PathBuf::from(home).join(".ticketflow"))
    }
}
