//! Application configuration
//!
//! Window and main loop settings, read from a TOML or RON file:
//!
//! ```toml
//! title = "Dalgi"
//! width = 800
//! height = 600
//! clear_color = [255, 255, 255]
//! max_fps = 60
//! log_filter = "info"
//! ```
//!
//! Every field is optional.

use std::path::Path;

use macroquad::color::Color;
use macroquad::window::Conf;
use serde::{Deserialize, Serialize};

use crate::manifest::{read_manifest, ManifestError};

/// Window and main loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub title: String,
    pub width: i32,
    pub height: i32,
    pub resizable: bool,
    pub high_dpi: bool,
    /// Background color as RGB
    pub clear_color: [u8; 3],
    /// Frame cap; `None` leaves pacing to vsync
    pub max_fps: Option<u32>,
    /// Extra sleep after each frame, in milliseconds
    pub frame_sleep_ms: u64,
    /// `env_logger` filter, overridden by `RUST_LOG`
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Dalgi".to_string(),
            width: 800,
            height: 600,
            resizable: true,
            high_dpi: false,
            clear_color: [255, 255, 255],
            max_fps: None,
            frame_sleep_ms: 1,
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        read_manifest(path)
    }

    /// Like [`load`](Self::load), but a missing file is `Ok(None)`.
    /// Logs nothing, so it is safe to call before the logger is set up.
    pub fn try_load(path: &Path) -> Result<Option<Self>, ManifestError> {
        if !path.exists() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    /// The settings in a [`try_load`](Self::try_load) result, or defaults
    /// when the file was missing or broken
    pub fn or_default(result: &Result<Option<Self>, ManifestError>) -> Self {
        match result {
            Ok(Some(config)) => config.clone(),
            _ => Self::default(),
        }
    }

    /// Log what a [`try_load`](Self::try_load) of `path` found
    pub fn log_load(path: &Path, result: &Result<Option<Self>, ManifestError>) {
        match result {
            Ok(Some(_)) => log::info!("Loaded config from {}", path.display()),
            Ok(None) => log::info!("No config at {}, using defaults", path.display()),
            Err(e) => log::warn!("{}, using default config", e),
        }
    }

    /// Load settings from `path`, or return defaults if it cannot be read
    pub fn load_or_default(path: &Path) -> Self {
        let result = Self::try_load(path);
        Self::log_load(path, &result);
        Self::or_default(&result)
    }

    pub fn clear_color(&self) -> Color {
        let [r, g, b] = self.clear_color;
        Color::from_rgba(r, g, b, 255)
    }

    /// Window settings for `#[macroquad::main]`
    pub fn window_conf(&self) -> Conf {
        Conf {
            window_title: self.title.clone(),
            window_width: self.width,
            window_height: self.height,
            window_resizable: self.resizable,
            high_dpi: self.high_dpi,
            ..Default::default()
        }
    }
}
