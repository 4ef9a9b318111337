// THEORY:
// Every tunable of the engine lives in one `PipelineConfig`. Nothing about frame
// geometry, sensitivity or the physics toy is compiled in: hosts build the config
// in code, or load it from a TOML file where any omitted key falls back to the
// reference defaults (a 320x240 stream, threshold 30, gravity 0.01/tick, bounce -1.0).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_WIDTH: u32 = 320;
pub const DEFAULT_HEIGHT: u32 = 240;
pub const DEFAULT_THRESHOLD: u8 = 30;
pub const DEFAULT_GRAVITY: f64 = 0.01;
pub const DEFAULT_BOUNCE_VELOCITY: f64 = -1.0;
pub const DEFAULT_SPRITE_HEIGHT: u32 = 48;

/// Configuration for the `LiftingPipeline`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub image_width: u32,
    pub image_height: u32,
    /// A pixel is motion when it brightened by strictly more than this.
    pub diff_threshold: u8,
    /// Velocity added every tick the object is falling freely.
    pub gravity: f64,
    /// Velocity forced onto the object when the probe pixel is flagged.
    pub bounce_velocity: f64,
    /// Column probed by the motion gate. `None` means the screen centre.
    pub probe_x: Option<u32>,
    /// Visual height of the moving object; half of it is kept above the bottom edge.
    pub sprite_height: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            image_width: DEFAULT_WIDTH,
            image_height: DEFAULT_HEIGHT,
            diff_threshold: DEFAULT_THRESHOLD,
            gravity: DEFAULT_GRAVITY,
            bounce_velocity: DEFAULT_BOUNCE_VELOCITY,
            probe_x: None,
            sprite_height: DEFAULT_SPRITE_HEIGHT,
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.image_width == 0 || self.image_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "frame dimensions must be non-zero, got {}x{}",
                self.image_width, self.image_height
            )));
        }
        if let Some(x) = self.probe_x {
            if x >= self.image_width {
                return Err(ConfigError::Invalid(format!(
                    "probe_x {x} lies outside a frame {} pixels wide",
                    self.image_width
                )));
            }
        }
        if !self.gravity.is_finite() {
            return Err(ConfigError::Invalid("gravity must be finite".into()));
        }
        if !self.bounce_velocity.is_finite() || self.bounce_velocity > 0.0 {
            return Err(ConfigError::Invalid(format!(
                "bounce_velocity must be finite and non-positive, got {}",
                self.bounce_velocity
            )));
        }
        Ok(())
    }

    /// The column the motion gate samples each tick.
    pub fn probe_column(&self) -> u32 {
        self.probe_x.unwrap_or(self.image_width / 2)
    }

    /// Position past which the object comes to rest.
    pub fn lower_bound(&self) -> f64 {
        self.image_height as f64 - self.sprite_height as f64 / 2.0
    }
}
