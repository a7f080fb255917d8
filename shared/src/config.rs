//! Configuration persistence utilities
//!
//! Stores the city list and preferences as TOML files in the per-user
//! config directory. Callers treat every failure here as non-fatal.

use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::city::{City, Preferences};

/// Blob name of the persisted city list
pub const CITIES_KEY: &str = "city_timeline_cities";
/// Blob name of the persisted preferences
pub const PREFS_KEY: &str = "city_timeline_prefs";

/// Error type for configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// TOML has no top-level arrays, so the city list is wrapped in a table
#[derive(Debug, Default, Serialize, Deserialize)]
struct CityList {
    #[serde(default)]
    cities: Vec<City>,
}

/// Directory holding one TOML file per stored blob
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    /// Store rooted at an explicit directory
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store in the platform config directory shared by the clocks
    pub fn default_location() -> Result<Self, ConfigError> {
        config_dir().map(Self::in_dir).ok_or(ConfigError::NoConfigDir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing blob `name`
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.toml", name))
    }

    /// Load blob `name`
    ///
    /// Returns `None` if the file doesn't exist yet.
    /// Returns an error if the file exists but can't be parsed.
    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, ConfigError> {
        let path = self.path(name);

        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)?;
        let value: T = toml::from_str(&contents)?;
        Ok(Some(value))
    }

    /// Save blob `name`, creating the directory if needed
    pub fn save<T: Serialize>(&self, name: &str, value: &T) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.dir)?;
        let contents = toml::to_string_pretty(value)?;
        fs::write(self.path(name), contents)?;
        Ok(())
    }

    /// Delete blob `name` if present
    pub fn delete(&self, name: &str) -> Result<(), ConfigError> {
        let path = self.path(name);

        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// Load the persisted city list
    pub fn load_cities(&self) -> Result<Option<Vec<City>>, ConfigError> {
        Ok(self.load::<CityList>(CITIES_KEY)?.map(|list| list.cities))
    }

    pub fn save_cities<'a>(&self, cities: impl IntoIterator<Item = &'a City>) -> Result<(), ConfigError> {
        let list = CityList {
            cities: cities.into_iter().cloned().collect(),
        };
        self.save(CITIES_KEY, &list)
    }

    pub fn load_prefs(&self) -> Result<Option<Preferences>, ConfigError> {
        self.load(PREFS_KEY)
    }

    pub fn save_prefs(&self, prefs: &Preferences) -> Result<(), ConfigError> {
        self.save(PREFS_KEY, prefs)
    }
}

/// Get the base configuration directory for all clocks
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "clock-series", "clocks").map(|dirs| dirs.config_dir().to_path_buf())
}
