//! JSON session configuration.

use std::{
    fs,
    path::{Path, PathBuf},
};

use polar_horizon_core::{
    ProjectionParams, DEFAULT_AZIMUTH_OFFSET_DEG, DEFAULT_CANVAS_SIZE, DEFAULT_PADDING,
    MAX_CANVAS_SIZE,
};
use polar_horizon_path::{TraceDirection, DEFAULT_EXPORT_FILE};
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Session settings. Every field has a default, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Edge of the square display canvas in pixels.
    pub canvas_size: usize,
    /// Initial zoom (clamped into the supported range when applied).
    pub zoom: f32,
    /// Horizon padding: the horizon circle radius is `canvas/2 * zoom / padding`.
    pub padding: f32,
    /// Panorama column phase in degrees.
    pub azimuth_offset_deg: f32,
    pub direction: TraceDirection,
    /// Where `export` writes by default.
    pub output_path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            canvas_size: DEFAULT_CANVAS_SIZE,
            zoom: 1.0,
            padding: DEFAULT_PADDING,
            azimuth_offset_deg: DEFAULT_AZIMUTH_OFFSET_DEG,
            direction: TraceDirection::default(),
            output_path: PathBuf::from(DEFAULT_EXPORT_FILE),
        }
    }
}

impl SessionConfig {
    /// Load and validate a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        let cfg: Self = serde_json::from_str(&raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas_size == 0 || self.canvas_size > MAX_CANVAS_SIZE {
            return Err(ConfigError::Invalid(format!(
                "canvas_size must be in 1..={MAX_CANVAS_SIZE}, got {}",
                self.canvas_size
            )));
        }
        if !(self.padding.is_finite() && self.padding > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "padding must be a positive number, got {}",
                self.padding
            )));
        }
        if !self.zoom.is_finite() || !self.azimuth_offset_deg.is_finite() {
            return Err(ConfigError::Invalid(
                "zoom and azimuth_offset_deg must be finite".into(),
            ));
        }
        Ok(())
    }

    /// Projection parameters for the initial zoom.
    pub fn projection_params(&self) -> ProjectionParams {
        ProjectionParams {
            canvas_size: self.canvas_size,
            zoom: 1.0,
            padding: self.padding,
            azimuth_offset_deg: self.azimuth_offset_deg,
        }
        .with_zoom(self.zoom)
    }
}
