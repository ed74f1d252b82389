//! Color conversion and difference module
//!
//! This module handles the sRGB → Lab conversion and the perceptual
//! distance used to compare sampled strip colors with references.

pub mod conversion;
pub mod distance;

pub use conversion::ColorConverter;
pub use distance::{delta_e, is_imperceptible};
