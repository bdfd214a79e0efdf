use std::time::Duration;
use std::{fs, io, path::PathBuf};

use directories::ProjectDirs;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8081/api/iso8583";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Operator settings. Missing fields fall back to their defaults, so
/// `{}` is a valid config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub api_base_url: String,
    /// 0 turns the background poll off.
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ConsoleConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// `~/.config/iso_console/config.json` on Linux, `%APPDATA%\iso_console\config.json` on Windows, etc.
    pub fn new() -> io::Result<Self> {
        let proj = ProjectDirs::from("", "", "iso_console")
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "Unable to locate config dir"))?;
        Ok(Self::with_path(proj.config_dir().join("config.json")))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Reads the config; a missing file yields the defaults.
    pub fn load(&self) -> io::Result<ConsoleConfig> {
        match fs::File::open(&self.path) {
            Ok(file) => serde_json::from_reader(file).map_err(SerdeError::into),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No config at {:?}, using defaults", self.path);
                Ok(ConsoleConfig::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Create or overwrite the config file.
    pub fn save(&self, config: &ConsoleConfig) -> io::Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = fs::File::create(&self.path)?;
        serde_json::to_writer_pretty(file, config).map_err(SerdeError::into)
    }
}
