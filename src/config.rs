//! Configuration types.
//!
//! Loads settings from config.json. Every section has defaults that match the
//! game's scoreboard layout, so a missing or partial file still works.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::surface::PixelColor;

/// Anchor colors and tolerances used by the region locator.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Solid border drawn around the player scoreboard
    pub scoreboard_border: PixelColor,
    /// Fill color at the top of the round timer box
    pub timer_background: PixelColor,
    /// Line under the round timer box
    pub timer_border: PixelColor,
    /// Tolerance when walking toward the anchor colors
    pub anchor_tolerance: u8,
    /// Tolerance when bounding the colored score boxes
    pub score_tolerance: u8,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            scoreboard_border: PixelColor::new(0, 0, 0, 255),
            timer_background: PixelColor::new(4, 4, 4, 255),
            timer_border: PixelColor::new(127, 127, 127, 255),
            anchor_tolerance: 0,
            score_tolerance: 5,
        }
    }
}

/// Tesseract invocation settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Pixels at or above this relative luminance are treated as text
    pub luminance_threshold: u8,
    /// Explicit tesseract executable; falls back to `tesseract` on PATH
    pub tesseract_path: Option<PathBuf>,
    /// Explicit tessdata directory; falls back to TESSDATA_PREFIX
    pub tessdata_dir: Option<PathBuf>,
    /// Tesseract page segmentation mode
    pub page_segmentation: u8,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            luminance_threshold: 150,
            tesseract_path: None,
            tessdata_dir: None,
            page_segmentation: 6, // single uniform block of text
        }
    }
}

/// TrueSkill parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Mean skill of a player with no history
    pub initial_mu: f64,
    /// Uncertainty of a player with no history
    pub initial_sigma: f64,
    /// Skill distance that gives ~76% win chance
    pub beta: f64,
    /// Additive dynamics applied to sigma before each update
    pub tau: f64,
    pub draw_probability: f64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            initial_mu: 25.0,
            initial_sigma: 25.0 / 3.0,
            beta: 25.0 / 6.0,
            tau: 25.0 / 300.0,
            draw_probability: 0.10,
        }
    }
}

/// Acceptance rules for rating requests.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// A screenshot is rateable only once the round timer is at or below this
    pub max_timer_seconds: u32,
    /// Upper bound on names per team in a matchup preview
    pub max_team_players: usize,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            max_timer_seconds: 10,
            max_team_players: 8,
        }
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub locator: LocatorConfig,
    pub ocr: OcrConfig,
    pub rating: RatingConfig,
    pub rules: RulesConfig,
    /// Player store file; defaults to the local data directory
    pub store_path: Option<PathBuf>,
}

impl AppConfig {
    /// Store file from config, or the per-user default.
    pub fn resolved_store_path(&self) -> PathBuf {
        self.store_path
            .clone()
            .unwrap_or_else(crate::paths::default_store_path)
    }
}

/// Loads configuration from `path`, or `config.json` next to the executable
/// when no path is given. Falls back to defaults on any problem.
pub fn load_config(path: Option<&Path>) -> AppConfig {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| crate::paths::get_exe_dir().join("config.json"));

    log::debug!("Looking for config at: {}", config_path.display());

    if !config_path.exists() {
        log::info!("config.json not found. Using default config.");
        return AppConfig::default();
    }

    match fs::read_to_string(&config_path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(config) => {
                log::info!("Config loaded from {}", config_path.display());
                config
            }
            Err(e) => {
                log::warn!("Failed to parse {}: {}. Using defaults.", config_path.display(), e);
                AppConfig::default()
            }
        },
        Err(e) => {
            log::warn!("Failed to read {}: {}. Using defaults.", config_path.display(), e);
            AppConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"rules": {"max_timer_seconds": 30}, "ocr": {"luminance_threshold": 90}}"#)
            .unwrap();

        let config = load_config(Some(&path));
        assert_eq!(config.rules.max_timer_seconds, 30);
        assert_eq!(config.rules.max_team_players, 8);
        assert_eq!(config.ocr.luminance_threshold, 90);
        assert_eq!(config.ocr.page_segmentation, 6);
        assert_eq!(config.locator.score_tolerance, 5);
        assert_eq!(config.locator.timer_background, PixelColor::new(4, 4, 4, 255));
    }

    #[test]
    fn test_malformed_config_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let config = load_config(Some(&path));
        assert_eq!(config.rules.max_timer_seconds, 10);
        assert!((config.rating.initial_mu - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = load_config(Some(&dir.path().join("absent.json")));
        assert!(config.store_path.is_none());
        assert_eq!(config.locator.anchor_tolerance, 0);
    }
}
