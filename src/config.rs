/// Rendering and normalization settings
///
/// Stored as JSON in the user's config directory:
/// - Linux: ~/.config/bookshelf/config.json
/// - macOS: ~/Library/Application Support/bookshelf/config.json
/// - Windows: %APPDATA%\bookshelf\config.json
///
/// Any field missing from the file falls back to its default.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::color::HexColor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scale factor from millimeters to rendered pixels
    pub px_per_mm: f64,
    /// Fallback book height (mm)
    pub default_height_mm: f64,
    /// Fallback spine width (mm)
    pub default_width_mm: f64,
    /// What a renderer paints when the engine yields no explicit color
    pub default_color: HexColor,
    pub untitled_title: String,
    pub unknown_author: String,
    pub unknown_genre: String,
    /// Number of shelves a sorted collection is spread over
    pub shelf_count: usize,
    pub manual_shelf_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            px_per_mm: 1.2,
            default_height_mm: 210.0,
            default_width_mm: 25.0,
            default_color: HexColor::new(0x55, 0x55, 0x55),
            untitled_title: "Untitled".to_string(),
            unknown_author: "Unknown author".to_string(),
            unknown_genre: "Unknown".to_string(),
            shelf_count: 3,
            manual_shelf_name: "New shelf".to_string(),
        }
    }
}

impl Config {
    /// Default location of the config file, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("bookshelf").join("config.json"))
    }

    /// Load from the default location, falling back to defaults
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                warn!("No config directory available, using default settings");
                Self::default()
            }
        }
    }

    /// Load from `path`. A missing file is normal; a broken one is logged
    /// and ignored.
    pub fn load_from(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                warn!("Could not read config {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str::<Config>(&text) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config.sanitized()
            }
            Err(e) => {
                warn!("Ignoring malformed config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Replace nonsensical numeric values with defaults
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let positive = |v: f64| v.is_finite() && v > 0.0;

        if !positive(self.px_per_mm) {
            self.px_per_mm = defaults.px_per_mm;
        }
        if !positive(self.default_height_mm) {
            self.default_height_mm = defaults.default_height_mm;
        }
        if !positive(self.default_width_mm) {
            self.default_width_mm = defaults.default_width_mm;
        }
        if self.shelf_count == 0 {
            self.shelf_count = defaults.shelf_count;
        }
        self
    }
}
