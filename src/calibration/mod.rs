//! Reference colors and lighting correction module
//!
//! This module holds the reference color table the classifier compares
//! against, the white balance correction applied to sampled pixels, and optional
//! lightness equalization.

pub mod contrast;
pub mod reference;
pub mod white_balance;

pub use contrast::equalize_lightness;
pub use reference::ReferenceSet;
pub use white_balance::{CalibrationMode, WhiteBalance, WhiteBalanceEstimator};
