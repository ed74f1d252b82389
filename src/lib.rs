//! # Strip Risk
//!
//! A Rust crate for classifying colorimetric test-strip photos into a
//! contamination risk level.
//!
//! This library provides perceptual color classification by:
//! - Cropping or perspective-rectifying the strip region of a photo
//! - Optionally correcting lighting with gray-world or white-patch gains
//! - Averaging the region and converting it to CIE Lab (D65)
//! - Comparing against safe / warning / danger reference colors
//!
//! ## Example
//!
//! ```rust,no_run
//! use strip_risk::{classify, image_loader::load_image, RegionShape};
//! use std::path::Path;
//!
//! let image = load_image(Path::new("strip.jpg"))?;
//! let result = classify(&image, &RegionShape::CenterBox)?;
//! println!("{} ({}), {:?}", result.risk, result.score, result.percentages);
//! # Ok::<(), strip_risk::AnalysisError>(())
//! ```

use std::borrow::Cow;

use image::RgbaImage;
use palette::Srgb;
use serde::{Deserialize, Serialize};

pub mod calibration;
pub mod classify;
pub mod color;
pub mod config;
pub mod constants;
pub mod error;
pub mod image_loader;
pub mod sampling;

pub use calibration::{CalibrationMode, ReferenceSet};
pub use classify::{ClassificationResult, Percentages, RiskCategory, RiskClassifier};
pub use config::{AnalysisConfig, LabColor};
pub use error::{AnalysisError, Result};
pub use sampling::{PercentPoint, PercentRect, Quad, RegionShape};

use calibration::{equalize_lightness, WhiteBalanceEstimator};
use color::ColorConverter;
use sampling::RegionSampler;

/// Full analysis of one strip photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StripAnalysis {
    /// Risk, score and inverse-distance percentages
    #[serde(flatten)]
    pub classification: ClassificationResult,
    /// Average region color after lighting correction
    pub hex: String,
    /// Average region color in Lab
    pub lab: LabColor,
    /// Share of region pixels nearest to each reference
    pub votes: Percentages,
    /// Lighting correction that was applied
    pub calibration: CalibrationMode,
    /// False when classified against uncorrected colors
    pub calibrated: bool,
}

/// Reusable analysis pipeline built from a configuration
///
/// Immutable after construction; share freely between threads.
#[derive(Debug, Clone)]
pub struct StripAnalyzer {
    config: AnalysisConfig,
    sampler: RegionSampler,
    classifier: RiskClassifier,
    estimator: WhiteBalanceEstimator,
    converter: ColorConverter,
}

impl Default for StripAnalyzer {
    fn default() -> Self {
        let config = AnalysisConfig::default();
        Self {
            sampler: RegionSampler::new(&config.sampling),
            classifier: RiskClassifier::default(),
            estimator: WhiteBalanceEstimator::new(),
            converter: ColorConverter::new(),
            config,
        }
    }
}

impl StripAnalyzer {
    /// Build an analyzer, validating the configuration
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            sampler: RegionSampler::new(&config.sampling),
            classifier: RiskClassifier::from_config(&config.classification)?,
            estimator: WhiteBalanceEstimator::new(),
            converter: ColorConverter::new(),
            config,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn classifier(&self) -> &RiskClassifier {
        &self.classifier
    }

    /// Classify the region of `image` described by `shape`
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError` if:
    /// - The image or region is empty, or a quadrilateral is degenerate
    /// - Calibration is required by the configuration but none is set
    /// - A white patch cannot serve as a neutral reference
    pub fn analyze(&self, image: &RgbaImage, shape: &RegionShape) -> Result<StripAnalysis> {
        let mode = self.config.preprocessing.calibration;
        if self.config.classification.require_calibration && !mode.is_calibrated() {
            return Err(AnalysisError::UnderCalibrated {
                reason: "no lighting correction configured; references are uncalibrated".into(),
            });
        }
        if !mode.is_calibrated() {
            log::debug!("classifying against uncalibrated reference colors");
        }

        let mut white_balance = self.estimator.estimate(mode, image)?;

        // Equalization works on the balanced frame, so gains are baked in first
        let source = if self.config.preprocessing.equalize_lightness {
            let balanced = match white_balance.take() {
                Some(wb) => wb.apply_to_image(image),
                None => image.clone(),
            };
            Cow::Owned(equalize_lightness(&balanced, &self.converter))
        } else {
            Cow::Borrowed(image)
        };

        let region = self.sampler.extract(&source, shape)?;

        let mut channels = self.sampler.average_channels(&region)?;
        if let Some(wb) = &white_balance {
            channels = wb.apply_channels(channels);
        }

        let classification = self.classifier.classify_channels(channels)?;
        let votes = self.classifier.classify_pixels(&region, white_balance.as_ref())?;

        let lab = self.converter.channels_to_lab(channels[0], channels[1], channels[2])?;
        let [r, g, b] = channels.map(|c| c.round().clamp(0.0, 255.0) as u8);
        let hex = self.converter.srgb_to_hex(Srgb::new(r, g, b));

        log::info!(
            "strip {}x{} region -> {} (score {}, calibrated: {})",
            region.width(),
            region.height(),
            classification.risk,
            classification.score,
            mode.is_calibrated()
        );

        Ok(StripAnalysis {
            classification,
            hex,
            lab: lab.into(),
            votes,
            calibration: mode,
            calibrated: mode.is_calibrated(),
        })
    }
}

/// Classify a strip region with the default configuration
///
/// This is the main entry point: crop or rectify `shape` from `image`,
/// average it and classify the average color.
///
/// # Errors
///
/// Returns `InvalidInput` if the image or region is empty, or a
/// quadrilateral is degenerate
pub fn classify(image: &RgbaImage, shape: &RegionShape) -> Result<ClassificationResult> {
    StripAnalyzer::default()
        .analyze(image, shape)
        .map(|analysis| analysis.classification)
}

/// Run the full analysis with an explicit configuration
pub fn analyze_strip(image: &RgbaImage, shape: &RegionShape, config: &AnalysisConfig) -> Result<StripAnalysis> {
    StripAnalyzer::new(config.clone())?.analyze(image, shape)
}
