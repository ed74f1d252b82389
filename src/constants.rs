//! Colorimetric constants and default classification parameters
//!
//! This module contains compile-time constants for the sRGB → CIE Lab
//! pipeline and the default reference colors, score bands and sampling
//! geometry used by the strip classifier.

/// D65 Standard Illuminant Reference
///
/// CIE Standard Illuminant D65 represents average daylight with a correlated
/// color temperature of 6504K. This is the standard reference for digital
/// images and computer displays.
pub mod d65 {
    /// D65 white point in CIE XYZ color space
    /// Source: CIE 15:2004 Colorimetry, 3rd edition
    pub const WHITE_POINT_XYZ: [f32; 3] = [0.95047, 1.00000, 1.08883];
}

/// Re-export D65 white point at top level for convenience
pub const D65_WHITE_POINT_XYZ: [f32; 3] = d65::WHITE_POINT_XYZ;

/// sRGB transfer function and primaries
pub mod srgb {
    /// Encoded value below which the inverse gamma is linear
    pub const LINEAR_THRESHOLD: f32 = 0.04045;

    /// Linear value below which the forward gamma is linear
    pub const ENCODED_THRESHOLD: f32 = 0.0031308;

    /// Linear segment slope
    pub const LINEAR_SLOPE: f32 = 12.92;

    /// Gamma exponent
    pub const GAMMA: f32 = 2.4;

    /// Linear sRGB → XYZ (D65), rows X, Y, Z
    pub const TO_XYZ: [[f32; 3]; 3] = [
        [0.4124, 0.3576, 0.1805],
        [0.2126, 0.7152, 0.0722],
        [0.0193, 0.1192, 0.9505],
    ];

    /// XYZ (D65) → linear sRGB, rows R, G, B
    pub const FROM_XYZ: [[f32; 3]; 3] = [
        [3.2406, -1.5372, -0.4986],
        [-0.9689, 1.8758, 0.0415],
        [0.0557, -0.2040, 1.0570],
    ];
}

/// CIE Lab nonlinearity
pub mod lab {
    /// Below this normalized XYZ value the cube root is replaced by a line
    pub const EPSILON: f32 = 0.008856;

    /// Slope of the linear segment
    pub const LINEAR_SLOPE: f32 = 7.787;

    /// Offset of the linear segment (16/116)
    pub const LINEAR_OFFSET: f32 = 16.0 / 116.0;
}

/// Canonical display colors of the three strip states (sRGB, 0-255)
pub mod reference {
    /// Strip stays cyan-blue on a clean surface
    pub const SAFE_RGB: [u8; 3] = [0, 243, 255];

    /// Strip shifts to purple with elevated microbial activity
    pub const WARNING_RGB: [u8; 3] = [189, 0, 255];

    /// Strip turns pink/red with heavy contamination
    pub const DANGER_RGB: [u8; 3] = [255, 0, 85];
}

/// Color difference thresholds
pub mod thresholds {
    /// ΔE below which two colors are not perceptibly different
    pub const JUST_NOTICEABLE_DELTA_E: f32 = 2.3;
}

/// Score bands per risk category (inclusive, 0-100)
pub mod scoring {
    pub const SAFE_BAND: (f32, f32) = (0.0, 20.0);
    pub const WARNING_BAND: (f32, f32) = (40.0, 70.0);
    pub const DANGER_BAND: (f32, f32) = (80.0, 100.0);
}

/// Region sampling geometry
pub mod sampling {
    /// Fallback center box width as percentage of the frame
    pub const CENTER_BOX_WIDTH_PERCENT: f32 = 30.0;

    /// Fallback center box height as percentage of the frame
    pub const CENTER_BOX_HEIGHT_PERCENT: f32 = 15.0;

    /// Rectified strip width in pixels
    pub const RECTIFIED_WIDTH: u32 = 200;

    /// Rectified strip height in pixels (strips are long and narrow)
    pub const RECTIFIED_HEIGHT: u32 = 500;

    /// Largest rectified side in pixels
    pub const MAX_RECTIFIED_SIDE: u32 = 4096;

    /// Keeps bilinear lookups one neighbor away from the right/bottom edge
    pub const BORDER_INSET: f32 = 1e-2;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_d65_constants() {
        assert!((d65::WHITE_POINT_XYZ[0] - 0.95047).abs() < 1e-5);
        assert!((d65::WHITE_POINT_XYZ[1] - 1.00000).abs() < 1e-5);
        assert!((d65::WHITE_POINT_XYZ[2] - 1.08883).abs() < 1e-5);
    }

    #[test]
    fn test_matrices_are_near_inverses() {
        for i in 0..3 {
            for j in 0..3 {
                let v: f32 = (0..3).map(|k| srgb::FROM_XYZ[i][k] * srgb::TO_XYZ[k][j]).sum();
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((v - expected).abs() < 1e-3, "[{}][{}] = {}", i, j, v);
            }
        }
    }

    #[test]
    fn test_score_bands_are_ordered() {
        assert!(scoring::SAFE_BAND.1 < scoring::WARNING_BAND.0);
        assert!(scoring::WARNING_BAND.1 < scoring::DANGER_BAND.0);
        assert!(scoring::DANGER_BAND.1 <= 100.0);
    }
}
