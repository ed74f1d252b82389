//! Color space conversion utilities
//!
//! Provides the sRGB ↔ CIE Lab (D65) conversions used for strip
//! classification:
//! - sRGB (0-255) to Lab via linear RGB and XYZ
//! - Lab back to sRGB with gamut clamping
//! - Hex color representation

use palette::{Lab, Srgb};

use crate::constants::{lab as lab_k, srgb as srgb_k, D65_WHITE_POINT_XYZ};
use crate::{AnalysisError, Result};

/// Color converter for the D65 Lab pipeline
#[derive(Debug, Clone, Copy)]
pub struct ColorConverter {
    /// Reference white used to normalize XYZ
    white_point: [f32; 3],
}

impl Default for ColorConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorConverter {
    /// Create a new color converter with D65 as reference white
    pub fn new() -> Self {
        Self {
            white_point: D65_WHITE_POINT_XYZ,
        }
    }

    /// Convert sRGB (0-255 per channel) to Lab
    pub fn rgb_to_lab(&self, rgb: Srgb<u8>) -> Lab {
        self.linear_to_lab([
            decode_channel(rgb.red as f32 / 255.0),
            decode_channel(rgb.green as f32 / 255.0),
            decode_channel(rgb.blue as f32 / 255.0),
        ])
    }

    /// Convert floating channels on the 0-255 scale to Lab
    ///
    /// Channels are clamped to [0, 255] first, so slight overshoot from
    /// averaging or white balance gains is tolerated.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if any channel is NaN or infinite.
    pub fn channels_to_lab(&self, r: f32, g: f32, b: f32) -> Result<Lab> {
        let mut linear = [0.0; 3];
        for (slot, (name, value)) in linear
            .iter_mut()
            .zip([("red", r), ("green", g), ("blue", b)])
        {
            if !value.is_finite() {
                return Err(AnalysisError::invalid_input(format!(
                    "{} channel is not a finite number ({})",
                    name, value
                )));
            }
            *slot = decode_channel(value.clamp(0.0, 255.0) / 255.0);
        }
        Ok(self.linear_to_lab(linear))
    }

    /// Convert Lab to sRGB (0-255), clamped to the displayable gamut
    pub fn lab_to_rgb(&self, lab: Lab) -> Srgb<u8> {
        let fy = (lab.l + 16.0) / 116.0;
        let fx = fy + lab.a / 500.0;
        let fz = fy - lab.b / 200.0;

        let xyz = [
            lab_f_inverse(fx) * self.white_point[0],
            lab_f_inverse(fy) * self.white_point[1],
            lab_f_inverse(fz) * self.white_point[2],
        ];

        let m = srgb_k::FROM_XYZ;
        let mut out = [0u8; 3];
        for (channel, row) in out.iter_mut().zip(m.iter()) {
            let linear = row[0] * xyz[0] + row[1] * xyz[1] + row[2] * xyz[2];
            let encoded = encode_channel(linear.clamp(0.0, 1.0));
            *channel = (encoded * 255.0).round().clamp(0.0, 255.0) as u8;
        }
        Srgb::new(out[0], out[1], out[2])
    }

    /// Convert sRGB to hexadecimal color string (e.g. "#00F3FF")
    pub fn srgb_to_hex(&self, srgb: Srgb<u8>) -> String {
        format!("#{:02X}{:02X}{:02X}", srgb.red, srgb.green, srgb.blue)
    }

    /// Parse hexadecimal color string ("#RRGGBB" or "RRGGBB") to sRGB
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the string is not six hex digits
    pub fn hex_to_srgb(&self, hex: &str) -> Result<Srgb<u8>> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(AnalysisError::invalid_input(format!(
                "Invalid hex color: expected 6 characters, got {}",
                hex.len()
            )));
        }

        let parse = |range: std::ops::Range<usize>, name: &str| {
            u8::from_str_radix(&hex[range], 16).map_err(|e| {
                AnalysisError::invalid_input(format!("Invalid {} value: {}", name, e))
            })
        };

        Ok(Srgb::new(
            parse(0..2, "red")?,
            parse(2..4, "green")?,
            parse(4..6, "blue")?,
        ))
    }

    fn linear_to_lab(&self, linear: [f32; 3]) -> Lab {
        let m = srgb_k::TO_XYZ;
        let [r, g, b] = linear;
        let x = (m[0][0] * r + m[0][1] * g + m[0][2] * b) / self.white_point[0];
        let y = (m[1][0] * r + m[1][1] * g + m[1][2] * b) / self.white_point[1];
        let z = (m[2][0] * r + m[2][1] * g + m[2][2] * b) / self.white_point[2];

        let fx = lab_f(x);
        let fy = lab_f(y);
        let fz = lab_f(z);

        Lab::new(116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz))
    }
}

/// sRGB inverse gamma: encoded [0,1] → linear [0,1]
fn decode_channel(c: f32) -> f32 {
    if c > srgb_k::LINEAR_THRESHOLD {
        ((c + 0.055) / 1.055).powf(srgb_k::GAMMA)
    } else {
        c / srgb_k::LINEAR_SLOPE
    }
}

/// sRGB gamma: linear [0,1] → encoded [0,1]
fn encode_channel(c: f32) -> f32 {
    if c > srgb_k::ENCODED_THRESHOLD {
        1.055 * c.powf(1.0 / srgb_k::GAMMA) - 0.055
    } else {
        c * srgb_k::LINEAR_SLOPE
    }
}

fn lab_f(t: f32) -> f32 {
    if t > lab_k::EPSILON {
        t.cbrt()
    } else {
        lab_k::LINEAR_SLOPE * t + lab_k::LINEAR_OFFSET
    }
}

fn lab_f_inverse(f: f32) -> f32 {
    let cubed = f * f * f;
    if cubed > lab_k::EPSILON {
        cubed
    } else {
        (f - lab_k::LINEAR_OFFSET) / lab_k::LINEAR_SLOPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn converter() -> ColorConverter {
        ColorConverter::new()
    }

    #[test]
    fn test_rgb_to_lab_black() {
        let lab = converter().rgb_to_lab(Srgb::new(0, 0, 0));
        assert!(lab.l.abs() < 1e-3);
        assert!(lab.a.abs() < 1e-3);
        assert!(lab.b.abs() < 1e-3);
    }

    #[test]
    fn test_rgb_to_lab_white() {
        let lab = converter().rgb_to_lab(Srgb::new(255, 255, 255));
        assert!(lab.l > 99.9 && lab.l < 100.1);
        assert!(lab.a.abs() < 0.1);
        assert!(lab.b.abs() < 0.1);
    }

    #[test]
    fn test_grayscale_is_achromatic() {
        let conv = converter();
        for v in (0..=255u16).step_by(5) {
            let v = v as u8;
            let lab = conv.rgb_to_lab(Srgb::new(v, v, v));
            assert!(lab.a.abs() < 0.1, "gray {} has a* = {}", v, lab.a);
            assert!(lab.b.abs() < 0.1, "gray {} has b* = {}", v, lab.b);
        }
    }

    #[test]
    fn test_reference_colors_land_in_expected_regions() {
        let conv = converter();

        // Cyan-blue: light, green-blue quadrant
        let safe = conv.rgb_to_lab(Srgb::new(0, 243, 255));
        assert!((safe.l - 87.6).abs() < 1.0);
        assert!(safe.a < -35.0 && safe.b < -10.0);

        // Purple: strong red and strong blue
        let warning = conv.rgb_to_lab(Srgb::new(189, 0, 255));
        assert!((warning.l - 49.5).abs() < 1.0);
        assert!(warning.a > 80.0 && warning.b < -70.0);

        // Pink-red: strong red, yellowish
        let danger = conv.rgb_to_lab(Srgb::new(255, 0, 85));
        assert!((danger.l - 54.0).abs() < 1.0);
        assert!(danger.a > 75.0 && danger.b > 20.0);
    }

    #[test]
    fn test_channels_to_lab_clamps_overshoot() {
        let conv = converter();
        let clamped = conv.channels_to_lab(260.0, -3.0, 128.0).unwrap();
        let exact = conv.rgb_to_lab(Srgb::new(255, 0, 128));
        assert!((clamped.l - exact.l).abs() < 1e-4);
        assert!((clamped.a - exact.a).abs() < 1e-4);
        assert!((clamped.b - exact.b).abs() < 1e-4);
    }

    #[test]
    fn test_channels_to_lab_rejects_nan() {
        let err = converter().channels_to_lab(f32::NAN, 0.0, 0.0).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput { .. }));
        assert!(converter().channels_to_lab(0.0, f32::INFINITY, 0.0).is_err());
    }

    #[test]
    fn test_lab_round_trip() {
        let conv = converter();
        let samples = [
            Srgb::new(0u8, 243, 255),
            Srgb::new(189, 0, 255),
            Srgb::new(255, 0, 85),
            Srgb::new(12, 34, 56),
            Srgb::new(200, 180, 40),
            Srgb::new(128, 128, 128),
        ];
        for rgb in samples {
            let lab = conv.rgb_to_lab(rgb);
            let back = conv.rgb_to_lab(conv.lab_to_rgb(lab));
            assert!((back.l - lab.l).abs() < 1.0, "{:?}: L {} vs {}", rgb, back.l, lab.l);
            assert!((back.a - lab.a).abs() < 1.5, "{:?}: a {} vs {}", rgb, back.a, lab.a);
            assert!((back.b - lab.b).abs() < 1.5, "{:?}: b {} vs {}", rgb, back.b, lab.b);
        }
    }

    #[test]
    fn test_lab_to_rgb_recovers_input() {
        let conv = converter();
        let rgb = Srgb::new(40u8, 120, 200);
        let back = conv.lab_to_rgb(conv.rgb_to_lab(rgb));
        assert!((back.red as i16 - 40).abs() <= 1);
        assert!((back.green as i16 - 120).abs() <= 1);
        assert!((back.blue as i16 - 200).abs() <= 1);
    }

    #[test]
    fn test_srgb_to_hex() {
        let conv = converter();
        assert_eq!(conv.srgb_to_hex(Srgb::new(0, 243, 255)), "#00F3FF");
        assert_eq!(conv.srgb_to_hex(Srgb::new(255, 0, 85)), "#FF0055");
    }

    #[test]
    fn test_hex_to_srgb() {
        let conv = converter();
        assert_eq!(conv.hex_to_srgb("#BD00FF").unwrap(), Srgb::new(189, 0, 255));
        assert_eq!(conv.hex_to_srgb("00f3ff").unwrap(), Srgb::new(0, 243, 255));
    }

    #[test]
    fn test_hex_to_srgb_invalid() {
        let conv = converter();
        assert!(conv.hex_to_srgb("#FF").is_err());
        assert!(conv.hex_to_srgb("#GGGGGG").is_err());
    }
}
