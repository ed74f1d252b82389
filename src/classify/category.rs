//! Risk categories and their display metadata
//!
//! The category set is closed: exactly safe, warning and danger. Display
//! text lives here as static data so presentation layers do not need their
//! own string-keyed lookup tables.

use std::fmt;
use std::str::FromStr;

use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::constants::reference::{DANGER_RGB, SAFE_RGB, WARNING_RGB};
use crate::AnalysisError;

/// Contamination risk level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskCategory {
    Safe,
    Warning,
    Danger,
}

/// Presentation data for a category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryInfo {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub description: &'static str,
    /// Accent color, the canonical strip color for this state
    pub accent: [u8; 3],
    pub actions: &'static [&'static str],
}

const SAFE_INFO: CategoryInfo = CategoryInfo {
    title: "All Clear",
    subtitle: "No significant contamination detected.",
    description: "The strip remains blue, indicating a safe environment. Microbial activity is within normal household levels.",
    accent: SAFE_RGB,
    actions: &[
        "Continue regular cleaning schedule.",
        "Rescan in 2 weeks or if environmental conditions change.",
        "Maintain current ventilation settings.",
    ],
};

const WARNING_INFO: CategoryInfo = CategoryInfo {
    title: "Warning",
    subtitle: "Elevated microbial activity detected.",
    description: "The strip has shifted to purple. This indicates growing bacterial or fungal colonies that require attention.",
    accent: WARNING_RGB,
    actions: &[
        "Inspect area for moisture or leaks.",
        "Increase ventilation immediately.",
        "Clean surfaces with EPA-registered disinfectant.",
        "Rescan in 48 hours to monitor progress.",
    ],
};

const DANGER_INFO: CategoryInfo = CategoryInfo {
    title: "Danger",
    subtitle: "Hazardous contamination levels.",
    description: "The strip has turned pink. Significant pathogen growth detected. This may pose a health risk to immunocompromised individuals.",
    accent: DANGER_RGB,
    actions: &[
        "Isolate the area immediately.",
        "Wear protective gear (N95 mask, gloves) before entering.",
        "Contact professional remediation services.",
        "Do not use simple fans; they may spread spores.",
    ],
};

impl RiskCategory {
    /// All categories in ascending severity
    pub const ALL: [RiskCategory; 3] = [RiskCategory::Safe, RiskCategory::Warning, RiskCategory::Danger];

    /// Precedence when distances tie exactly: the more severe category wins
    pub const TIE_BREAK_ORDER: [RiskCategory; 3] =
        [RiskCategory::Danger, RiskCategory::Warning, RiskCategory::Safe];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Safe => "safe",
            RiskCategory::Warning => "warning",
            RiskCategory::Danger => "danger",
        }
    }

    pub fn info(&self) -> &'static CategoryInfo {
        match self {
            RiskCategory::Safe => &SAFE_INFO,
            RiskCategory::Warning => &WARNING_INFO,
            RiskCategory::Danger => &DANGER_INFO,
        }
    }

    pub fn accent_color(&self) -> Srgb<u8> {
        let [r, g, b] = self.info().accent;
        Srgb::new(r, g, b)
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskCategory {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "safe" => Ok(RiskCategory::Safe),
            "warning" => Ok(RiskCategory::Warning),
            "danger" => Ok(RiskCategory::Danger),
            other => Err(AnalysisError::invalid_input(format!("unknown risk category '{}'", other))),
        }
    }
}
