use super::schema::AutofillConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from default locations:
    /// 1. ./autofill.yaml
    /// 2. ~/.autofill/config.yaml
    /// 3. Default configuration
    pub async fn load_default() -> Result<AutofillConfig, ConfigError> {
        let local_config = PathBuf::from("./autofill.yaml");
        if local_config.exists() {
            return Self::load_from(&local_config).await;
        }

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".autofill").join("config.yaml");
            if home_config.exists() {
                return Self::load_from(&home_config).await;
            }
        }

        Ok(AutofillConfig::default())
    }

    pub async fn load_from(path: &Path) -> Result<AutofillConfig, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: AutofillConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}

impl AutofillConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit = |name: &str, value: f64| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!(
                    "scanner.{name} must be within [0, 1], got {value}"
                )))
            }
        };
        unit("confidence_floor", self.scanner.confidence_floor)?;
        unit("native_type_threshold", self.scanner.native_type_threshold)?;
        unit("native_type_confidence", self.scanner.native_type_confidence)?;
        Ok(())
    }
}
