use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::constants::{
    DEFAULT_COLLECTION, DEFAULT_CONFIG_FILE, DEFAULT_DATABASE, DEFAULT_OUTPUT_DIR,
    PIPELINE_VERSION,
};
use crate::error::{PipelineError, Result};
use crate::sources::StationCatalog;

pub const ENV_STRICT_MODE: &str = "FORECAST_STRICT_MODE";
pub const ENV_OUTPUT_DIR: &str = "FORECAST_OUTPUT_DIR";
pub const ENV_DATABASE: &str = "MONGODB_DATABASE";
pub const ENV_COLLECTION: &str = "MONGODB_COLLECTION";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub validation: ValidationConfig,
    pub storage: StorageConfig,
    pub pipeline: PipelineConfig,
    /// Station entries that extend or replace the built-in catalog
    pub stations: StationCatalog,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub strict_mode: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub output_dir: PathBuf,
    pub database: String,
    pub collection: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub version: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            validation: ValidationConfig::default(),
            storage: StorageConfig::default(),
            pipeline: PipelineConfig::default(),
            stations: StationCatalog::empty(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            database: DEFAULT_DATABASE.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            version: PIPELINE_VERSION.to_string(),
        }
    }
}

impl Config {
    /// Load the TOML file (falling back to defaults when it is absent),
    /// then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::from_file(path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE)))?;
        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(
                "Config file '{}' not found, using built-in defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply overrides from `lookup`. Empty values count as unset.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(raw) = get(ENV_STRICT_MODE) {
            self.validation.strict_mode = parse_bool(&raw).ok_or_else(|| {
                PipelineError::Config(format!("{} must be a boolean, got '{}'", ENV_STRICT_MODE, raw))
            })?;
        }
        if let Some(dir) = get(ENV_OUTPUT_DIR) {
            self.storage.output_dir = PathBuf::from(dir);
        }
        if let Some(database) = get(ENV_DATABASE) {
            self.storage.database = database;
        }
        if let Some(collection) = get(ENV_COLLECTION) {
            self.storage.collection = collection;
        }
        Ok(())
    }

    /// Built-in stations merged with the configured ones
    pub fn station_catalog(&self) -> StationCatalog {
        StationCatalog::default().merged(self.stations.clone())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Network;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::from_file(&dir.path().join("absent.toml")).unwrap();
        assert!(!config.validation.strict_mode);
        assert_eq!(config.storage.database, DEFAULT_DATABASE);
        assert_eq!(config.storage.collection, DEFAULT_COLLECTION);
        assert_eq!(config.pipeline.version, PIPELINE_VERSION);
        assert_eq!(config.station_catalog(), StationCatalog::default());
    }

    #[test]
    fn test_parse_toml_sections() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("forecast.toml");
        fs::write(
            &path,
            r#"
[validation]
strict_mode = true

[storage]
output_dir = "/data/out"
collection = "obs"

[stations.wunderground.IROUBA3]
name = "Roubaix"
latitude = 50.69
longitude = 3.18
"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert!(config.validation.strict_mode);
        assert_eq!(config.storage.output_dir, PathBuf::from("/data/out"));
        assert_eq!(config.storage.collection, "obs");
        assert_eq!(config.storage.database, DEFAULT_DATABASE);

        let catalog = config.station_catalog();
        assert!(catalog.get(Network::WeatherUnderground, "IROUBA3").is_some());
        assert!(catalog.get(Network::WeatherUnderground, "ILAMAD25").is_some());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[validation\nstrict_mode = ").unwrap();
        assert!(matches!(Config::from_file(&path), Err(PipelineError::Toml(_))));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env_overrides(lookup(&[
                (ENV_STRICT_MODE, "yes"),
                (ENV_DATABASE, "forecast_test"),
                (ENV_COLLECTION, ""),
                (ENV_OUTPUT_DIR, "  "),
            ]))
            .unwrap();

        assert!(config.validation.strict_mode);
        assert_eq!(config.storage.database, "forecast_test");
        assert_eq!(config.storage.collection, DEFAULT_COLLECTION);
        assert_eq!(config.storage.output_dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
    }

    #[test]
    fn test_bad_strict_mode_value() {
        let mut config = Config::default();
        let err = config
            .apply_env_overrides(lookup(&[(ENV_STRICT_MODE, "maybe")]))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }
}
