#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

pub use toml_config::TomlConfig;

use crate::domain::model::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, validate_range, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://golden.fayzullayevsh.uz";
pub const DEFAULT_STATE_DIR: &str = "./.tour-admin";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Effective settings after the config file and command-line flags are merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    pub base_url: String,
    pub state_dir: String,
    pub timeout_seconds: u64,
    pub default_page_size: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            state_dir: DEFAULT_STATE_DIR.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl AppSettings {
    pub fn from_provider(provider: &dyn ConfigProvider) -> Self {
        Self {
            base_url: provider.base_url().to_string(),
            state_dir: provider.state_dir().to_string(),
            timeout_seconds: provider.timeout_seconds(),
            default_page_size: provider.default_page_size(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl ConfigProvider for AppSettings {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn state_dir(&self) -> &str {
        &self.state_dir
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn default_page_size(&self) -> u32 {
        self.default_page_size
    }
}

impl Validate for AppSettings {
    fn validate(&self) -> Result<()> {
        validate_url("base_url", &self.base_url)?;
        validate_path("state_dir", &self.state_dir)?;
        validate_range("timeout_seconds", self.timeout_seconds, 1, 300)?;
        validate_range("default_page_size", self.default_page_size, 1, MAX_PAGE_SIZE)?;
        Ok(())
    }
}
