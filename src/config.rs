// Application settings
// Loaded from <config_dir>/supplygrid/settings.toml

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{warn, Level};

use crate::state::cell::CellTimings;
use crate::state::grid::GridConfig;

pub const DATA_ENV_VAR: &str = "SUPPLYGRID_DATA";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read settings: {0}")]
    Io(#[from] io::Error),
    #[error("invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("cannot write settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Quiet period before a quick edit autosaves.
    pub debounce_ms: u64,
    /// How long a blurred cell's cursor is remembered.
    pub focus_grace_ms: u64,
    /// How long "saved"/"error" stays on a cell.
    pub status_reset_ms: u64,
    /// Background refetch period; 0 disables polling.
    pub refresh_interval_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            focus_grace_ms: 500,
            status_reset_ms: 2000,
            refresh_interval_ms: 5000,
            data_file: None,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("supplygrid")
            .join("settings.toml")
    }

    pub fn default_data_file() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("supplygrid")
            .join("suppliers.json")
    }

    /// Load settings from the default location, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();
        Self::load_from(&path).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "using default settings");
            Self::default()
        })
    }

    /// A missing file is not an error; it yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(err.into()),
        };
        Ok(toml::from_str(&contents)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Store file to open: `SUPPLYGRID_DATA`, then `data_file`, then the
    /// per-user default.
    pub fn resolve_data_file(&self) -> PathBuf {
        std::env::var_os(DATA_ENV_VAR)
            .map(PathBuf::from)
            .or_else(|| self.data_file.clone())
            .unwrap_or_else(Self::default_data_file)
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_interval_ms > 0).then(|| Duration::from_millis(self.refresh_interval_ms))
    }

    pub fn log_level(&self) -> Level {
        self.log_level.parse().unwrap_or(Level::INFO)
    }

    pub fn grid_config(&self) -> GridConfig {
        GridConfig {
            timings: CellTimings {
                debounce: Duration::from_millis(self.debounce_ms),
                status_reset: Duration::from_millis(self.status_reset_ms),
            },
            focus_grace: Duration::from_millis(self.focus_grace_ms),
            ..GridConfig::default()
        }
    }
}
