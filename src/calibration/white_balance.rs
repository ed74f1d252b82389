//! White balance estimation and correction
//!
//! Per-channel gains that neutralize the scene illuminant before the strip
//! color is sampled. Two estimators are available: gray world over the
//! whole frame, and a white patch observed on the reference card.

use image::RgbaImage;
use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// How sampled colors are corrected before classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CalibrationMode {
    /// Use raw colors against the fixed references
    #[default]
    None,
    /// Assume the frame averages to neutral gray
    GrayWorld,
    /// Neutralize an observed white patch from the reference card
    WhitePatch { r: u8, g: u8, b: u8 },
}

impl CalibrationMode {
    /// Whether any lighting correction is applied
    pub fn is_calibrated(&self) -> bool {
        !matches!(self, CalibrationMode::None)
    }
}

/// Multiplicative channel gains (red, green, blue)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhiteBalance {
    pub gains: [f32; 3],
}

impl Default for WhiteBalance {
    fn default() -> Self {
        Self::identity()
    }
}

impl WhiteBalance {
    /// Gains that leave colors unchanged
    pub fn identity() -> Self {
        Self { gains: [1.0; 3] }
    }

    /// Apply gains to channels on the 0-255 scale
    ///
    /// Results are not clamped; the Lab converter clamps on input.
    pub fn apply_channels(&self, channels: [f32; 3]) -> [f32; 3] {
        [
            channels[0] * self.gains[0],
            channels[1] * self.gains[1],
            channels[2] * self.gains[2],
        ]
    }

    /// Apply gains to a whole image, clamping to [0, 255]; alpha is kept
    pub fn apply_to_image(&self, image: &RgbaImage) -> RgbaImage {
        let mut corrected = image.clone();
        for pixel in corrected.pixels_mut() {
            for c in 0..3 {
                pixel.0[c] = (pixel.0[c] as f32 * self.gains[c]).round().clamp(0.0, 255.0) as u8;
            }
        }
        corrected
    }
}

/// White balance estimator
#[derive(Debug, Clone, Copy, Default)]
pub struct WhiteBalanceEstimator;

impl WhiteBalanceEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Estimate gains for a calibration mode
    ///
    /// Returns `None` when the mode requests no correction.
    pub fn estimate(&self, mode: CalibrationMode, image: &RgbaImage) -> Result<Option<WhiteBalance>> {
        match mode {
            CalibrationMode::None => Ok(None),
            CalibrationMode::GrayWorld => self.estimate_gray_world(image).map(Some),
            CalibrationMode::WhitePatch { r, g, b } => {
                self.estimate_from_white_patch(Srgb::new(r, g, b)).map(Some)
            }
        }
    }

    /// Gray world estimation
    ///
    /// Scales each channel so its mean equals the mean of all three channel
    /// means. A channel with zero mean keeps unit gain.
    pub fn estimate_gray_world(&self, image: &RgbaImage) -> Result<WhiteBalance> {
        let count = image.width() as u64 * image.height() as u64;
        if count == 0 {
            return Err(AnalysisError::invalid_input(
                "cannot estimate white balance of an empty image",
            ));
        }

        let mut sums = [0u64; 3];
        for pixel in image.pixels() {
            for c in 0..3 {
                sums[c] += pixel.0[c] as u64;
            }
        }

        let means = sums.map(|s| s as f64 / count as f64);
        let gray = (means[0] + means[1] + means[2]) / 3.0;

        let mut gains = [1.0f32; 3];
        for c in 0..3 {
            if means[c] > 0.0 {
                gains[c] = (gray / means[c]) as f32;
            } else {
                log::warn!("gray world: channel {} has zero mean, keeping unit gain", c);
            }
        }

        log::debug!(
            "gray world means r={:.1} g={:.1} b={:.1} -> gains {:?}",
            means[0],
            means[1],
            means[2],
            gains
        );
        Ok(WhiteBalance { gains })
    }

    /// White patch estimation
    ///
    /// Computes gains that map the observed patch to a neutral gray of the
    /// same average brightness.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if any observed channel is zero, since such a
    /// patch cannot be a neutral reference.
    pub fn estimate_from_white_patch(&self, observed: Srgb<u8>) -> Result<WhiteBalance> {
        let channels = [observed.red, observed.green, observed.blue];
        if channels.contains(&0) {
            return Err(AnalysisError::invalid_input(format!(
                "white patch ({}, {}, {}) has an empty channel",
                observed.red, observed.green, observed.blue
            )));
        }

        let target = channels.iter().map(|&c| c as f32).sum::<f32>() / 3.0;
        Ok(WhiteBalance {
            gains: channels.map(|c| target / c as f32),
        })
    }
}
