use crate::config::{DEFAULT_BASE_URL, DEFAULT_STATE_DIR, DEFAULT_TIMEOUT_SECONDS};
use crate::domain::model::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{AdminError, Result};
use crate::utils::validation::{validate_path, validate_range, validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern compiles"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    pub state_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub default_page_size: Option<u32>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| AdminError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ADMIN_API_URL})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_PATTERN
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 驗證配置的合理性，只檢查有填寫的欄位
    pub fn validate_config(&self) -> Result<()> {
        if let Some(base_url) = &self.api.base_url {
            validate_url("api.base_url", base_url)?;
        }
        if let Some(timeout) = self.api.timeout_seconds {
            validate_range("api.timeout_seconds", timeout, 1, 300)?;
        }
        if let Some(state_dir) = &self.storage.state_dir {
            validate_path("storage.state_dir", state_dir)?;
        }
        if let Some(page_size) = self.display.default_page_size {
            validate_range("display.default_page_size", page_size, 1, MAX_PAGE_SIZE)?;
        }
        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn base_url(&self) -> &str {
        self.api.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    fn state_dir(&self) -> &str {
        self.storage.state_dir.as_deref().unwrap_or(DEFAULT_STATE_DIR)
    }

    fn timeout_seconds(&self) -> u64 {
        self.api.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    fn default_page_size(&self) -> u32 {
        self.display.default_page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[api]
base_url = "https://admin.example.uz"
timeout_seconds = 15

[storage]
state_dir = "/var/lib/tour-admin"

[display]
default_page_size = 20
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.base_url(), "https://admin.example.uz");
        assert_eq!(config.timeout_seconds(), 15);
        assert_eq!(config.state_dir(), "/var/lib/tour-admin");
        assert_eq!(config.default_page_size(), 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = TomlConfig::from_toml_str("[api]\ntimeout_seconds = 5\n").unwrap();
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.state_dir(), DEFAULT_STATE_DIR);
        assert_eq!(config.default_page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(config.timeout_seconds(), 5);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TOUR_ADMIN_TEST_BASE_URL", "https://staging.example.uz");

        let toml_content = r#"
[api]
base_url = "${TOUR_ADMIN_TEST_BASE_URL}"

[storage]
state_dir = "${TOUR_ADMIN_TEST_UNSET_DIR}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.base_url(), "https://staging.example.uz");
        assert_eq!(config.state_dir(), "${TOUR_ADMIN_TEST_UNSET_DIR}");

        std::env::remove_var("TOUR_ADMIN_TEST_BASE_URL");
    }

    #[test]
    fn test_config_validation() {
        let bad_url = TomlConfig::from_toml_str("[api]\nbase_url = \"ftp://files\"\n").unwrap();
        assert!(bad_url.validate().is_err());

        let bad_page = TomlConfig::from_toml_str("[display]\ndefault_page_size = 500\n").unwrap();
        assert!(matches!(
            bad_page.validate(),
            Err(AdminError::InvalidConfigValueError { .. })
        ));

        assert!(matches!(
            TomlConfig::from_toml_str("[api\nbase_url ="),
            Err(AdminError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[storage]\nstate_dir = \"./state\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.state_dir(), "./state");
    }
}
