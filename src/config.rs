//! Camera and demo configuration.
//!
//! Facing and flash are stored as their integer codes and the aspect ratio
//! as its `"X:Y"` text, so a config file reads the same as the values the
//! host persists.

use crate::camera::{Facing, Flash};
use crate::geometry::AspectRatio;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings applied to a camera before it is started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Which camera to open.
    pub facing: Facing,
    /// Preferred preview and still aspect ratio.
    pub aspect_ratio: AspectRatio,
    /// Continuous auto focus.
    pub auto_focus: bool,
    /// Flash mode.
    pub flash: Flash,
    /// Display rotation in degrees.
    pub display_orientation: i32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            facing: Facing::Back,
            aspect_ratio: AspectRatio::default(),
            auto_focus: true,
            flash: Flash::Off,
            display_orientation: 0,
        }
    }
}

impl CameraConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0..360).contains(&self.display_orientation) || self.display_orientation % 90 != 0 {
            return Err(ConfigError::InvalidOrientation(self.display_orientation));
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid display orientation {0} (must be 0, 90, 180 or 270)")]
    InvalidOrientation(i32),
    #[error("invalid preview surface size {0}x{1}")]
    InvalidSurface(u32, u32),
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub demo: DemoConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Demo run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Number of pictures to take if not continuous.
    pub pictures: u32,
    /// Directory the JPEG payloads are written to.
    pub output_dir: PathBuf,
    /// Simulated preview surface width.
    pub surface_width: u32,
    /// Simulated preview surface height.
    pub surface_height: u32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            pictures: 3,
            output_dir: PathBuf::from("captures"),
            surface_width: 1080,
            surface_height: 1920,
        }
    }
}

impl DemoConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.surface_width == 0 || self.surface_height == 0 {
            return Err(ConfigError::InvalidSurface(
                self.surface_width,
                self.surface_height,
            ));
        }
        Ok(())
    }
}

/// Metrics exporter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Metrics server port (0 to disable).
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { port: 9090 }
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.camera.validate()?;
        config.demo.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = CameraConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.aspect_ratio.to_string(), "4:3");
    }

    #[test]
    fn test_orientation_validation() {
        let mut config = CameraConfig::default();
        for degrees in [0, 90, 180, 270] {
            config.display_orientation = degrees;
            assert!(config.validate().is_ok());
        }
        for degrees in [-90, 45, 360] {
            config.display_orientation = degrees;
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidOrientation(d)) if d == degrees
            ));
        }
    }

    #[test]
    fn test_parse_file_config() {
        let config = FileConfig::from_toml(
            r#"
            [camera]
            facing = 1
            aspect_ratio = "16:9"
            flash = 3
            auto_focus = false
            display_orientation = 90

            [demo]
            pictures = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.camera.facing, Facing::Front);
        assert_eq!(config.camera.aspect_ratio, AspectRatio::of(16, 9).unwrap());
        assert_eq!(config.camera.flash, Flash::Auto);
        assert!(!config.camera.auto_focus);
        assert_eq!(config.camera.display_orientation, 90);
        assert_eq!(config.demo.pictures, 5);
        assert_eq!(config.demo.surface_width, 1080);
        assert_eq!(config.metrics.port, 9090);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = FileConfig::from_toml("").unwrap();
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn test_rejects_bad_codes() {
        assert!(matches!(
            FileConfig::from_toml("[camera]\nflash = 9\n"),
            Err(ConfigError::ParseError(_))
        ));
        assert!(matches!(
            FileConfig::from_toml("[camera]\naspect_ratio = \"4x3\"\n"),
            Err(ConfigError::ParseError(_))
        ));
        assert!(matches!(
            FileConfig::from_toml("[camera]\ndisplay_orientation = 45\n"),
            Err(ConfigError::InvalidOrientation(45))
        ));
    }

    #[test]
    fn test_round_trips_through_toml() {
        let config = FileConfig::default();
        let text = toml::to_string(&config).unwrap();
        assert!(text.contains("aspect_ratio = \"4:3\""));
        assert!(text.contains("facing = 0"));
    }
}
