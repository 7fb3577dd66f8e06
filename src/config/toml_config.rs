use crate::core::format::DateStyle;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{validate_one_of, validate_path, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub store: Option<StoreConfig>,
    pub io: Option<IoConfig>,
    pub export: Option<ExportConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    pub database_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IoConfig {
    pub input_dir: Option<String>,
    pub output_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    pub date_style: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        let config: Self =
            toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn database_path(&self) -> Option<&str> {
        self.store.as_ref()?.database_path.as_deref()
    }

    pub fn input_dir(&self) -> Option<&str> {
        self.io.as_ref()?.input_dir.as_deref()
    }

    pub fn output_dir(&self) -> Option<&str> {
        self.io.as_ref()?.output_dir.as_deref()
    }

    pub fn date_style(&self) -> Result<Option<DateStyle>> {
        self.export
            .as_ref()
            .and_then(|e| e.date_style.as_deref())
            .map(|s| s.parse::<DateStyle>())
            .transpose()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(path) = self.database_path() {
            validate_path("store.database_path", path)?;
        }
        if let Some(dir) = self.input_dir() {
            validate_path("io.input_dir", dir)?;
        }
        if let Some(dir) = self.output_dir() {
            validate_path("io.output_dir", dir)?;
        }
        if let Some(style) = self.export.as_ref().and_then(|e| e.date_style.as_deref()) {
            validate_one_of("export.date_style", style, DateStyle::NAMES)?;
        }
        Ok(())
    }
}
