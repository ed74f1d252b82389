//! Region of interest extraction and color averaging
//!
//! A region is described in percentages of the source frame, the way the
//! capture UI reports it. The sampler crops or rectifies that region and
//! reduces it to one average color.

use image::{imageops, RgbaImage};
use palette::Srgb;
use serde::{Deserialize, Serialize};

use super::rectify::{PixelPoint, RectifiedSize, Rectifier};
use crate::config::SamplingConfig;
use crate::{AnalysisError, Result};

/// A point in percent of frame width/height (0-100)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentPoint {
    pub x: f32,
    pub y: f32,
}

impl PercentPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn to_pixels(self, width: u32, height: u32) -> Result<PixelPoint> {
        let in_frame = |v: f32| v.is_finite() && (0.0..=100.0).contains(&v);
        if !in_frame(self.x) || !in_frame(self.y) {
            return Err(AnalysisError::invalid_input(format!(
                "corner ({}, {}) is outside the 0-100% frame",
                self.x, self.y
            )));
        }
        Ok(PixelPoint::new(
            self.x * width as f32 / 100.0,
            self.y * height as f32 / 100.0,
        ))
    }
}

/// Four strip corners as placed by the user
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub tl: PercentPoint,
    pub tr: PercentPoint,
    pub bl: PercentPoint,
    pub br: PercentPoint,
}

impl Default for Quad {
    /// The capture UI's initial corner placement
    fn default() -> Self {
        Self {
            tl: PercentPoint::new(25.0, 25.0),
            tr: PercentPoint::new(75.0, 25.0),
            bl: PercentPoint::new(25.0, 75.0),
            br: PercentPoint::new(75.0, 75.0),
        }
    }
}

/// Axis-aligned rectangle in percent of the frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Which part of the frame to sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RegionShape {
    Rectangle(PercentRect),
    Quadrilateral(Quad),
    /// Fixed box in the middle of the frame
    #[default]
    CenterBox,
}

/// Crops or rectifies regions and averages their color
#[derive(Debug, Clone)]
pub struct RegionSampler {
    center_box_width_percent: f32,
    center_box_height_percent: f32,
    rectifier: Rectifier,
}

impl Default for RegionSampler {
    fn default() -> Self {
        Self::new(&SamplingConfig::default())
    }
}

impl RegionSampler {
    pub fn new(config: &SamplingConfig) -> Self {
        let size = if config.rectify_from_corners {
            RectifiedSize::FromCorners
        } else {
            RectifiedSize::Fixed {
                width: config.rectified_width,
                height: config.rectified_height,
            }
        };
        Self {
            center_box_width_percent: config.center_box_width_percent,
            center_box_height_percent: config.center_box_height_percent,
            rectifier: Rectifier::new(size),
        }
    }

    /// Extract the pixels of `shape` from `image`
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the image is empty, the region has zero
    /// area, or a quadrilateral is degenerate
    pub fn extract(&self, image: &RgbaImage, shape: &RegionShape) -> Result<RgbaImage> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(AnalysisError::invalid_input("source image is empty"));
        }

        match shape {
            RegionShape::Rectangle(rect) => {
                let (x, y, w, h) = rect_to_pixels(rect, width, height)?;
                Ok(imageops::crop_imm(image, x, y, w, h).to_image())
            }
            RegionShape::CenterBox => {
                let crop_w = ((width as f32 * self.center_box_width_percent / 100.0) as u32).min(width);
                let crop_h = ((height as f32 * self.center_box_height_percent / 100.0) as u32).min(height);
                if crop_w == 0 || crop_h == 0 {
                    return Err(AnalysisError::invalid_input(format!(
                        "center box of a {}x{} image has zero area",
                        width, height
                    )));
                }
                let x = (width - crop_w) / 2;
                let y = (height - crop_h) / 2;
                log::debug!("center box {}x{} at ({}, {})", crop_w, crop_h, x, y);
                Ok(imageops::crop_imm(image, x, y, crop_w, crop_h).to_image())
            }
            RegionShape::Quadrilateral(quad) => {
                let corners = [
                    quad.tl.to_pixels(width, height)?,
                    quad.tr.to_pixels(width, height)?,
                    quad.br.to_pixels(width, height)?,
                    quad.bl.to_pixels(width, height)?,
                ];
                self.rectifier.rectify(image, corners)
            }
        }
    }

    /// Mean R, G, B over every pixel of the region (alpha ignored)
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the region has no pixels
    pub fn average_channels(&self, region: &RgbaImage) -> Result<[f32; 3]> {
        let count = region.width() as u64 * region.height() as u64;
        if count == 0 {
            return Err(AnalysisError::invalid_input("pixel buffer is empty"));
        }

        let mut sums = [0u64; 3];
        for pixel in region.pixels() {
            sums[0] += pixel.0[0] as u64;
            sums[1] += pixel.0[1] as u64;
            sums[2] += pixel.0[2] as u64;
        }
        Ok(sums.map(|s| (s as f64 / count as f64) as f32))
    }

    /// Average color of the region, each channel rounded half away from zero
    pub fn average_color(&self, region: &RgbaImage) -> Result<Srgb<u8>> {
        let [r, g, b] = self.average_channels(region)?;
        let round = |c: f32| c.round().clamp(0.0, 255.0) as u8;
        Ok(Srgb::new(round(r), round(g), round(b)))
    }
}

/// Convert a percent rectangle to a pixel crop clamped to the frame
fn rect_to_pixels(rect: &PercentRect, width: u32, height: u32) -> Result<(u32, u32, u32, u32)> {
    let values = [rect.x, rect.y, rect.width, rect.height];
    if values.iter().any(|v| !v.is_finite()) {
        return Err(AnalysisError::invalid_input("rectangle has non-finite bounds"));
    }

    let to_px = |pct: f32, extent: u32| (pct as f64 * extent as f64 / 100.0).clamp(0.0, extent as f64);
    let x0 = to_px(rect.x, width).floor() as u32;
    let y0 = to_px(rect.y, height).floor() as u32;
    let x1 = to_px(rect.x + rect.width, width).ceil() as u32;
    let y1 = to_px(rect.y + rect.height, height).ceil() as u32;

    if rect.width <= 0.0 || rect.height <= 0.0 || x1 <= x0 || y1 <= y0 {
        return Err(AnalysisError::invalid_input(format!(
            "rectangle region {:?} has zero area",
            rect
        )));
    }
    Ok((x0, y0, x1 - x0, y1 - y0))
}
