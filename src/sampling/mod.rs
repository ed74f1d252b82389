//! Region sampling module
//!
//! This module turns a region of interest in a captured frame into one
//! representative color, rectifying quadrilateral regions first.

pub mod rectify;
pub mod region;

pub use rectify::{PixelPoint, RectifiedSize, Rectifier};
pub use region::{PercentPoint, PercentRect, Quad, RegionSampler, RegionShape};
