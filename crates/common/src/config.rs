//! Editor configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ReelkitError, ReelkitResult};

/// Global editor configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Undo/redo history limits.
    pub history: HistoryConfig,

    /// Playback scheduler settings.
    pub playback: PlaybackConfig,

    /// Timeline pixel geometry.
    pub layout: LayoutConfig,

    /// Zoom limits for the timeline view.
    pub zoom: ZoomConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Undo/redo history settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of document snapshots kept. Oldest are evicted first.
    pub max_snapshots: usize,
}

/// Playback scheduler settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Rate (Hz) at which the current frame is published to state consumers.
    /// Per-tick transform sync is not throttled.
    pub publish_hz: u32,
}

/// Pixel geometry of the timeline view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Horizontal pixels per second at zoom 1.0.
    pub base_pixels_per_second: f64,

    /// Width of the track header column on the left.
    pub header_width: f64,

    /// Height of the time ruler strip at the top.
    pub ruler_height: f64,

    /// Height of one track row.
    pub track_height: f64,

    /// Width of the resize handle at each clip edge.
    pub handle_width: f64,
}

/// Zoom limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub min: f64,
    pub max: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "reelkit_timeline=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path. Logs go to stderr when unset.
    pub file: Option<PathBuf>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_snapshots: 50 }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self { publish_hz: 10 }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            base_pixels_per_second: 60.0,
            header_width: 100.0,
            ruler_height: 30.0,
            track_height: 40.0,
            handle_width: 6.0,
        }
    }
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self { min: 0.1, max: 10.0 }
    }
}

impl ZoomConfig {
    /// Clamp a requested zoom factor into the configured range. NaN requests
    /// count as 1.0.
    ///
    /// Never panics, even on limits that fail [`ZoomConfig::validate`].
    pub fn clamp(&self, zoom: f64) -> f64 {
        let zoom = if zoom.is_nan() { 1.0 } else { zoom };
        zoom.max(self.min).min(self.max)
    }

    /// Limits must be finite, positive, and ordered.
    pub fn validate(&self) -> ReelkitResult<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.min) || !positive(self.max) {
            return Err(ReelkitError::config(format!(
                "zoom limits must be positive numbers, got min {} max {}",
                self.min, self.max
            )));
        }
        if self.min > self.max {
            return Err(ReelkitError::config(format!(
                "zoom.min ({}) is above zoom.max ({})",
                self.min, self.max
            )));
        }
        Ok(())
    }

    /// Usable limits from possibly invalid ones: inverted limits are swapped,
    /// anything non-positive or non-finite falls back to the defaults.
    pub fn repaired(&self) -> Self {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.min) || !positive(self.max) {
            return Self::default();
        }
        Self {
            min: self.min.min(self.max),
            max: self.min.max(self.max),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl EditorConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &std::path::Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str::<Self>(&content) {
                    Ok(mut config) => {
                        if let Err(e) = config.validate() {
                            tracing::warn!("Repairing config at {:?}: {}", config_path, e);
                            config.zoom = config.zoom.repaired();
                        }
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Check settings that deserialization alone cannot reject.
    pub fn validate(&self) -> ReelkitResult<()> {
        self.zoom.validate()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> ReelkitResult<()> {
        self.save_to(&config_file_path())
    }

    /// Save config to an explicit path, creating parent directories.
    /// Invalid settings are refused rather than written.
    pub fn save_to(&self, config_path: &std::path::Path) -> ReelkitResult<()> {
        self.validate()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, json)?;
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("reelkit").join("config.json")
}
