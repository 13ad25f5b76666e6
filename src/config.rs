//! Optional runtime settings read from `orbitcube.json` next to the executable.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{abs::app::WindowConfig, error::ConfigError};

/// Name of the settings file looked up in the executable directory.
pub const CONFIG_FILE_NAME: &str = "orbitcube.json";

/// Application settings. Every field falls back to its default when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Requested MSAA sample count, negotiated down if unavailable.
    pub samples: u8,
    pub forward_compatible: bool,
    pub disable_vsync: bool,
    /// `None` asks the user at startup.
    pub fullscreen: Option<bool>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "OrbitCube".to_string(),
            width: 800,
            height: 600,
            samples: 4,
            forward_compatible: false,
            disable_vsync: true,
            fullscreen: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Loads the config from `dir`, returning the defaults if no file exists.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE_NAME);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(ConfigError::Io { path, source }),
        };
        Self::parse(&text).map_err(|source| ConfigError::Json { path, source })
    }

    /// Parses a config from JSON text.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Window settings for the chosen display mode.
    pub fn window_config(&self, fullscreen: bool) -> WindowConfig {
        WindowConfig {
            title: self.title.clone(),
            width: self.width,
            height: self.height,
            fullscreen,
            samples: self.samples,
            forward_compatible: self.forward_compatible,
            disable_vsync: self.disable_vsync,
        }
    }

    /// The configured log level, `Info` if the name is not recognised.
    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}
