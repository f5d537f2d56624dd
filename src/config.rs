use std::{
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use dirs::home_dir;
use serde::{Deserialize, Serialize};

use crate::{
    errors::ConfigError,
    messages::{CatalogMessages, DateFormatStyle, EnglishMessages, PaymentMessages},
    schedule::UrgencyThresholds,
};

const DEFAULT_DIR_NAME: &str = ".installment_core";
const CONFIG_FILE: &str = "config.json";
const TMP_SUFFIX: &str = "tmp";

/// Stores user-configurable display preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub locale: String,
    #[serde(default)]
    pub date_format: DateFormatStyle,
    #[serde(default)]
    pub urgency: UrgencyThresholds,
    #[serde(default = "Config::default_color_enabled")]
    pub color_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// JSON file of translated due-date templates. English is used when unset.
    pub message_catalog: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-US".into(),
            date_format: DateFormatStyle::default(),
            urgency: UrgencyThresholds::default(),
            color_enabled: Self::default_color_enabled(),
            message_catalog: None,
        }
    }
}

impl Config {
    pub fn default_color_enabled() -> bool {
        true
    }

    /// Builds the message provider, falling back to English when the catalog can't be read.
    pub fn messages(&self) -> Box<dyn PaymentMessages> {
        let Some(path) = &self.message_catalog else {
            return Box::new(EnglishMessages);
        };
        match CatalogMessages::load(path) {
            Ok(catalog) => {
                tracing::debug!(path = %path.display(), keys = catalog.len(), "message catalog loaded");
                Box::new(catalog)
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "message catalog unavailable");
                Box::new(EnglishMessages)
            }
        }
    }
}

/// Returns the application data directory, defaulting to `~/.installment_core`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("INSTALLMENT_CORE_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Handles persistence for [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        fs::create_dir_all(&base)?;
        Ok(Self::new(base.join(CONFIG_FILE)))
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        if self.config_path.exists() {
            let data = fs::read_to_string(&self.config_path)?;
            serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;
        let tmp = tmp_path(&self.config_path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.config_path)?;
        Ok(())
    }
}

pub(crate) fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

pub(crate) fn write_atomic(path: &Path, data: &str) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        assert_eq!(manager.load().unwrap(), Config::default());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{ "locale": "es-ES" }"#).unwrap();
        assert_eq!(config.locale, "es-ES");
        assert_eq!(config.urgency.due_soon_days, 7);
        assert!(config.color_enabled);
    }

    #[test]
    fn tmp_path_appends_suffix() {
        assert_eq!(
            tmp_path(Path::new("/a/config.json")),
            PathBuf::from("/a/config.json.tmp")
        );
    }

    #[test]
    fn unreadable_catalog_falls_back_to_english() {
        let config = Config {
            message_catalog: Some(PathBuf::from("/definitely/missing/catalog.json")),
            ..Config::default()
        };
        assert_eq!(config.messages().due_today(), "Due today");
    }
}
