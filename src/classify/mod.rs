//! Risk classification module
//!
//! This module maps a perceptual color onto one of the three strip states,
//! with a banded score and a percentage breakdown.

pub mod category;
pub mod classifier;

pub use category::{CategoryInfo, RiskCategory};
pub use classifier::{
    CategoryDistances, ClassificationResult, Percentages, RiskClassifier, ScoreBand, ScoreBands,
};
