use anyhow::{Context, Result};
use directories::ProjectDirs;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::location::{GeoOutcome, Geolocator, Location, detect_location};
use crate::location::detect::valid_coordinates;

pub const CONFIG_FILE_NAME: &str = "prayer_config.json";

fn default_latitude() -> f64 {
    Location::mecca().latitude
}
fn default_longitude() -> f64 {
    Location::mecca().longitude
}
fn default_city() -> String {
    Location::mecca().city
}
fn default_country() -> String {
    Location::mecca().country
}
fn default_method() -> u8 {
    2 // ISNA
}
fn default_azan_file() -> String {
    "azan.mp3".to_string()
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    #[serde(default = "default_city")]
    pub city: String,
    #[serde(default = "default_country")]
    pub country: String,
    /// Calculation method code understood by the prayer-times service.
    #[serde(default = "default_method")]
    pub method: u8,
    /// Relative paths resolve against the config file's directory.
    #[serde(default = "default_azan_file")]
    pub azan_file: String,
    #[serde(default = "default_true")]
    pub use_default_azan: bool,
    /// Print the interval reminders before each prayer.
    #[serde(default = "default_true")]
    pub announcement_voice: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_location(Location::mecca())
    }
}

/// How `load_or_create` obtained its configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigOrigin {
    Loaded,
    Created(GeoOutcome),
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "prayer-countdown")
            .context("Could not determine project directories")
    }

    pub fn default_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    pub fn from_location(location: Location) -> Self {
        Self {
            latitude: location.latitude,
            longitude: location.longitude,
            city: location.city,
            country: location.country,
            method: default_method(),
            azan_file: default_azan_file(),
            use_default_azan: true,
            announcement_voice: true,
        }
    }

    /// Returns `None` when no file exists at `path`.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Reading {:?}", path))?;
        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Parsing {:?}", path))?;
        if !config.coordinates_valid() {
            warn!(
                "Configured coordinates {}, {} are out of range",
                config.latitude, config.longitude
            );
        }
        Ok(Some(config))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self).context("Serializing config")?;
        std::fs::write(path, content).with_context(|| format!("Writing {:?}", path))?;
        info!("Configuration saved to {:?}", path);
        Ok(())
    }

    /// Load the persisted configuration, or detect a location, build a
    /// fresh one and persist it.
    pub fn load_or_create(path: &Path, locator: &dyn Geolocator) -> Result<(Self, ConfigOrigin)> {
        if let Some(config) = Self::load(path)? {
            return Ok((config, ConfigOrigin::Loaded));
        }
        let (config, outcome) = Self::detect(locator);
        config.save(path)?;
        Ok((config, ConfigOrigin::Created(outcome)))
    }

    /// Build a configuration from a fresh location lookup.
    pub fn detect(locator: &dyn Geolocator) -> (Self, GeoOutcome) {
        let outcome = detect_location(locator);
        let config = Self::from_location(outcome.clone().into_location());
        (config, outcome)
    }

    pub fn coordinates_valid(&self) -> bool {
        valid_coordinates(self.latitude, self.longitude)
    }

    pub fn azan_path(&self, config_path: &Path) -> PathBuf {
        let file = Path::new(&self.azan_file);
        if file.is_absolute() {
            return file.to_path_buf();
        }
        match config_path.parent() {
            Some(dir) => dir.join(file),
            None => file.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::detect::tests::FixedLocator;
    use tempfile::TempDir;

    fn cairo() -> Location {
        Location {
            latitude: 30.0444,
            longitude: 31.2357,
            city: "Cairo".to_string(),
            country: "Egypt".to_string(),
        }
    }

    #[test]
    fn creates_and_persists_detected_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let (config, origin) =
            AppConfig::load_or_create(&path, &FixedLocator(Some(cairo()))).unwrap();
        assert_eq!(origin, ConfigOrigin::Created(GeoOutcome::Detected(cairo())));
        assert_eq!(config.city, "Cairo");
        assert_eq!(config.method, 2);
        assert!(config.use_default_azan);
        assert!(path.exists());

        let reloaded = AppConfig::load(&path).unwrap().unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn falls_back_to_mecca_when_detection_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        let (config, origin) = AppConfig::load_or_create(&path, &FixedLocator(None)).unwrap();
        assert_eq!(origin, ConfigOrigin::Created(GeoOutcome::DefaultFallback));
        assert_eq!(config.city, "Mecca");
        assert_eq!(config.latitude, 21.4225);
        assert_eq!(config.longitude, 39.8262);
    }

    #[test]
    fn existing_file_is_returned_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            r#"{
                "latitude": 95.0,
                "longitude": 10.0,
                "city": "Nowhere",
                "country": "Testland",
                "method": 4,
                "azan_file": "/tmp/custom.mp3",
                "use_default_azan": false,
                "announcement_voice": false
            }"#,
        )
        .unwrap();

        // The locator must not be consulted.
        let (config, origin) =
            AppConfig::load_or_create(&path, &FixedLocator(Some(cairo()))).unwrap();
        assert_eq!(origin, ConfigOrigin::Loaded);
        assert_eq!(config.latitude, 95.0);
        assert_eq!(config.method, 4);
        assert!(!config.announcement_voice);
        assert!(!config.coordinates_valid());
    }

    #[test]
    fn partial_file_takes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, r#"{"city": "Medina"}"#).unwrap();

        let config = AppConfig::load(&path).unwrap().unwrap();
        assert_eq!(config.city, "Medina");
        assert_eq!(config.azan_file, "azan.mp3");
        assert!(config.announcement_voice);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "{ not json").unwrap();
        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn azan_path_resolves_relative_to_config_dir() {
        let config = AppConfig::default();
        let path = Path::new("/etc/prayer/prayer_config.json");
        assert_eq!(
            config.azan_path(path),
            PathBuf::from("/etc/prayer/azan.mp3")
        );

        let absolute = AppConfig {
            azan_file: "/srv/azan.mp3".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(absolute.azan_path(path), PathBuf::from("/srv/azan.mp3"));
    }

    #[test]
    fn saved_file_uses_the_documented_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        AppConfig::default().save(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        for key in [
            "latitude",
            "longitude",
            "city",
            "country",
            "method",
            "azan_file",
            "use_default_azan",
            "announcement_voice",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }
}
