//! Reference colors for the three strip states
//!
//! A [`ReferenceSet`] is an immutable table of Lab targets handed to the
//! classifier. The default table is derived once from the canonical display
//! colors; calibrated tables can be swapped in without touching the
//! classification logic.

use std::sync::OnceLock;

use palette::{Lab, Srgb};

use crate::classify::RiskCategory;
use crate::color::ColorConverter;
use crate::constants::reference::{DANGER_RGB, SAFE_RGB, WARNING_RGB};

static DEFAULT_REFERENCES: OnceLock<ReferenceSet> = OnceLock::new();

/// Lab targets for safe, warning and danger
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceSet {
    pub safe: Lab,
    pub warning: Lab,
    pub danger: Lab,
}

impl Default for ReferenceSet {
    /// References derived from the canonical strip colors
    /// (safe `#00F3FF`, warning `#BD00FF`, danger `#FF0055`).
    fn default() -> Self {
        *DEFAULT_REFERENCES.get_or_init(|| {
            Self::from_rgb(
                Srgb::new(SAFE_RGB[0], SAFE_RGB[1], SAFE_RGB[2]),
                Srgb::new(WARNING_RGB[0], WARNING_RGB[1], WARNING_RGB[2]),
                Srgb::new(DANGER_RGB[0], DANGER_RGB[1], DANGER_RGB[2]),
            )
        })
    }
}

impl ReferenceSet {
    /// Build a reference set from Lab values
    pub fn new(safe: Lab, warning: Lab, danger: Lab) -> Self {
        Self {
            safe,
            warning,
            danger,
        }
    }

    /// Build a reference set from display colors
    pub fn from_rgb(safe: Srgb<u8>, warning: Srgb<u8>, danger: Srgb<u8>) -> Self {
        let converter = ColorConverter::new();
        Self {
            safe: converter.rgb_to_lab(safe),
            warning: converter.rgb_to_lab(warning),
            danger: converter.rgb_to_lab(danger),
        }
    }

    /// Reference color for a category
    pub fn get(&self, category: RiskCategory) -> Lab {
        match category {
            RiskCategory::Safe => self.safe,
            RiskCategory::Warning => self.warning,
            RiskCategory::Danger => self.danger,
        }
    }

    /// All references in safe, warning, danger order
    pub fn entries(&self) -> [(RiskCategory, Lab); 3] {
        [
            (RiskCategory::Safe, self.safe),
            (RiskCategory::Warning, self.warning),
            (RiskCategory::Danger, self.danger),
        ]
    }
}
