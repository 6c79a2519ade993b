use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::FastlapError;
use crate::render::RenderConfig;
use crate::telemetry::{SessionStore, SessionType};

const CONFIG_FILE_NAME: &str = "config.json";
const APP_DIR: &str = "fastlap";

/// Selection used when a request or the dashboard leaves a field unset
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DefaultSelection {
    pub year: u32,
    pub track: String,
    pub session: SessionType,
    pub driver: String,
}

impl Default for DefaultSelection {
    fn default() -> Self {
        Self {
            year: 2024,
            track: "Abu Dhabi".to_string(),
            session: SessionType::R,
            driver: "LEC".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Session store root, the platform data directory when unset
    pub data_dir: Option<PathBuf>,
    pub bind_address: String,
    pub default_selection: DefaultSelection,
    pub render: RenderConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            bind_address: "127.0.0.1:5000".to_string(),
            default_selection: DefaultSelection::default(),
            render: RenderConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn config_path() -> Result<PathBuf, FastlapError> {
        Ok(dirs::config_dir()
            .ok_or(FastlapError::NoConfigDir)?
            .join(APP_DIR)
            .join(CONFIG_FILE_NAME))
    }

    /// Config saved in the platform config directory, defaults if there is none
    pub fn from_local_file() -> Result<Self, FastlapError> {
        let path = Self::config_path()?;
        Ok(Self::from_file(&path)?.unwrap_or_default())
    }

    pub fn from_file(path: &Path) -> Result<Option<Self>, FastlapError> {
        if !path.exists() {
            debug!("No config file at {:?}, using defaults", path);
            return Ok(None);
        }
        let file = File::open(path).map_err(|e| FastlapError::ConfigIOError { source: e })?;
        let config = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| FastlapError::ConfigSerializeError { source: e })?;
        info!("Loaded config from {:?}", path);
        Ok(Some(config))
    }

    pub fn save(&self) -> Result<(), FastlapError> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), FastlapError> {
        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| FastlapError::ConfigIOError { source: e })?;
        }

        let file = File::create(path).map_err(|e| FastlapError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| FastlapError::ConfigSerializeError { source: e })
    }

    /// Session store root to open
    pub fn data_dir(&self) -> Result<PathBuf, FastlapError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => SessionStore::default_storage_path(),
        }
    }
}
