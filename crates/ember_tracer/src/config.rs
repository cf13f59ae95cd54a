//! Render settings and their validation.

use crate::{Color, SplitMethod};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from invalid scene or render configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("russian roulette probability must be in (0, 1], got {0}")]
    InvalidRussianRoulette(f32),

    #[error("image resolution must be non-zero, got {width}x{height}")]
    ZeroResolution { width: u32, height: u32 },

    #[error("samples per pixel must be at least 1")]
    ZeroSamples,

    #[error("background color must be finite, got {0:?}")]
    NonFiniteBackground([f32; 3]),

    #[error("vertical field of view must be in (0, 180) degrees, got {0}")]
    InvalidFieldOfView(f32),
}

/// Everything needed to turn a scene into an image.
///
/// Missing fields fall back to [`RenderSettings::default`] when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub samples_per_pixel: u32,
    /// Deepest bounce that is still shaded; deeper paths contribute zero
    pub max_depth: u32,
    /// Probability of continuing a path at each bounce
    pub russian_roulette: f32,
    /// Radiance returned by rays that escape the scene
    pub background: [f32; 3],
    pub split_method: SplitMethod,
    pub max_prims_in_node: usize,
    /// Base seed; each image row derives its own stream from it
    pub seed: u64,
    /// Vertical field of view in degrees
    pub vfov: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 784,
            height: 784,
            samples_per_pixel: 16,
            max_depth: 5,
            russian_roulette: 0.8,
            background: [0.0; 3],
            split_method: SplitMethod::Sah,
            max_prims_in_node: 4,
            seed: 0,
            vfov: 40.0,
        }
    }
}

impl RenderSettings {
    pub fn background_color(&self) -> Color {
        Color::from_array(self.background)
    }

    /// Check the settings before any work is done.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_russian_roulette(self.russian_roulette)?;

        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ZeroResolution {
                width: self.width,
                height: self.height,
            });
        }

        if self.samples_per_pixel == 0 {
            return Err(ConfigError::ZeroSamples);
        }

        validate_background(self.background)?;

        if !(self.vfov > 0.0 && self.vfov < 180.0) {
            return Err(ConfigError::InvalidFieldOfView(self.vfov));
        }

        Ok(())
    }
}

pub(crate) fn validate_russian_roulette(rr: f32) -> Result<(), ConfigError> {
    // NaN fails both comparisons
    if rr > 0.0 && rr <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidRussianRoulette(rr))
    }
}

pub(crate) fn validate_background(background: [f32; 3]) -> Result<(), ConfigError> {
    if background.iter().all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(ConfigError::NonFiniteBackground(background))
    }
}
