//! Configuration structures for the strip analysis pipeline.
//!
//! This module defines all tunable parameters, organized into groups for
//! preprocessing, region sampling and classification.
//!
//! # Configuration Loading
//!
//! Configuration can be loaded from JSON files or constructed programmatically:
//!
//! ```no_run
//! use strip_risk::AnalysisConfig;
//! use std::path::Path;
//!
//! // Load from file
//! let config = AnalysisConfig::from_json_file(Path::new("config.json"))?;
//!
//! // Or use defaults
//! let config = AnalysisConfig::default();
//! # Ok::<(), strip_risk::AnalysisError>(())
//! ```
//!
//! Every field has a default, so a partial JSON file only needs the values
//! it overrides.

use std::path::Path;

use palette::Lab;
use serde::{Deserialize, Serialize};

use crate::calibration::{CalibrationMode, ReferenceSet};
use crate::classify::ScoreBands;
use crate::constants::sampling;
use crate::{AnalysisError, Result};

/// Complete pipeline configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Lighting correction applied before sampling
    pub preprocessing: PreprocessingConfig,

    /// Region extraction settings
    pub sampling: SamplingConfig,

    /// Reference colors and scoring
    pub classification: ClassificationConfig,
}

/// Preprocessing parameters applied before classification.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingConfig {
    /// White balance mode
    pub calibration: CalibrationMode,

    /// Equalize the lightness histogram of the whole frame before sampling
    pub equalize_lightness: bool,
}

/// Region sampling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Center box width as percentage of frame width
    pub center_box_width_percent: f32,

    /// Center box height as percentage of frame height
    pub center_box_height_percent: f32,

    /// Rectified strip width in pixels
    pub rectified_width: u32,

    /// Rectified strip height in pixels
    pub rectified_height: u32,

    /// Derive the rectified size from the quad's edge lengths instead
    pub rectify_from_corners: bool,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            center_box_width_percent: sampling::CENTER_BOX_WIDTH_PERCENT,
            center_box_height_percent: sampling::CENTER_BOX_HEIGHT_PERCENT,
            rectified_width: sampling::RECTIFIED_WIDTH,
            rectified_height: sampling::RECTIFIED_HEIGHT,
            rectify_from_corners: false,
        }
    }
}

impl SamplingConfig {
    /// Check box percentages lie in (0, 100] and rectified sides are in range
    pub fn validate(&self) -> Result<()> {
        for (name, pct) in [
            ("center_box_width_percent", self.center_box_width_percent),
            ("center_box_height_percent", self.center_box_height_percent),
        ] {
            if !(pct.is_finite() && pct > 0.0 && pct <= 100.0) {
                return Err(AnalysisError::invalid_input(format!(
                    "{} must be in (0, 100], got {}",
                    name, pct
                )));
            }
        }
        for (name, side) in [
            ("rectified_width", self.rectified_width),
            ("rectified_height", self.rectified_height),
        ] {
            if side == 0 || side > sampling::MAX_RECTIFIED_SIDE {
                return Err(AnalysisError::invalid_input(format!(
                    "{} must be in 1-{}, got {}",
                    name,
                    sampling::MAX_RECTIFIED_SIDE,
                    side
                )));
            }
        }
        Ok(())
    }
}

/// Classification parameters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Reference colors; `None` uses the built-in strip colors
    pub references: Option<ReferenceColors>,

    /// Score band per category
    pub score_bands: ScoreBands,

    /// Fail with `UnderCalibrated` when no lighting correction is configured
    pub require_calibration: bool,
}

impl ClassificationConfig {
    /// Reference set to classify against
    pub fn reference_set(&self) -> ReferenceSet {
        match self.references {
            Some(refs) => ReferenceSet::new(refs.safe.into(), refs.warning.into(), refs.danger.into()),
            None => ReferenceSet::default(),
        }
    }
}

/// Reference colors as they appear in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceColors {
    pub safe: LabColor,
    pub warning: LabColor,
    pub danger: LabColor,
}

impl From<ReferenceSet> for ReferenceColors {
    fn from(set: ReferenceSet) -> Self {
        Self {
            safe: set.safe.into(),
            warning: set.warning.into(),
            danger: set.danger.into(),
        }
    }
}

/// Lab color representation for configuration files.
///
/// Uses CIE L*a*b* color space coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabColor {
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

impl From<LabColor> for Lab {
    fn from(color: LabColor) -> Self {
        Lab::new(color.l, color.a, color.b)
    }
}

impl From<Lab> for LabColor {
    fn from(lab: Lab) -> Self {
        Self {
            l: lab.l,
            a: lab.a,
            b: lab.b,
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AnalysisError::config(format!("Failed to read {}", path.display()), e)
        })?;
        Self::from_json_str(&content)
    }

    /// Parse configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| AnalysisError::config("Invalid configuration JSON", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every group for values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        self.sampling.validate()?;
        self.classification.score_bands.validate()
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AnalysisError::config("Failed to serialize configuration", e))?;
        std::fs::write(path, json).map_err(|e| {
            AnalysisError::config(format!("Failed to write {}", path.display()), e)
        })?;
        Ok(())
    }
}
