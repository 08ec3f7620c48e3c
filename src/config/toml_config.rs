use crate::adapters::csv_store::{DEFAULT_MAIN_FILE, DEFAULT_PRODUCT_MIX_FILE};
use crate::utils::error::{ForecastError, Result};
use crate::utils::validation::{
    validate_file_extension, validate_log_level, validate_path, validate_range, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub storage: StorageConfig,
    pub charts: ChartsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
    pub main_file: String,
    pub product_mix_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
            main_file: DEFAULT_MAIN_FILE.to_string(),
            product_mix_file: DEFAULT_PRODUCT_MIX_FILE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartsConfig {
    pub output_dir: String,
    pub width: u32,
    pub height: u32,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            output_dir: "./charts".to_string(),
            width: 1000,
            height: 500,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ForecastError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${FORECAST_DATA})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_path("storage.data_dir", &self.storage.data_dir)?;
        validate_file_extension("storage.main_file", &self.storage.main_file, &["csv"])?;
        validate_file_extension(
            "storage.product_mix_file",
            &self.storage.product_mix_file,
            &["csv"],
        )?;
        if self.storage.main_file == self.storage.product_mix_file {
            return Err(ForecastError::InvalidConfigValueError {
                field: "storage.product_mix_file".to_string(),
                value: self.storage.product_mix_file.clone(),
                reason: "Must differ from storage.main_file".to_string(),
            });
        }

        validate_path("charts.output_dir", &self.charts.output_dir)?;
        validate_range("charts.width", self.charts.width, 200, 4000)?;
        validate_range("charts.height", self.charts.height, 200, 4000)?;

        if let Some(level) = &self.logging.level {
            validate_log_level("logging.level", level)?;
        }
        Ok(())
    }
}
