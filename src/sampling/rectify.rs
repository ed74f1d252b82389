//! Perspective rectification of a quadrilateral strip region
//!
//! Implements the quad → rectangle step that precedes color averaging:
//! - Keeps the user's corner labels unless they describe a crossed polygon
//! - Computes the projection from the output rectangle to the source quad
//! - Warps the source with bilinear interpolation, clamped to its border

use image::{Rgba, RgbaImage};
use imageproc::geometric_transformations::{warp_into_with, Interpolation, Projection};

use crate::constants::sampling::{BORDER_INSET, MAX_RECTIFIED_SIDE};
use crate::{AnalysisError, Result};

/// A point in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f32,
    pub y: f32,
}

impl PixelPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn distance(&self, other: &PixelPoint) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Output dimensions of the rectified strip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RectifiedSize {
    /// Fixed output size in pixels
    Fixed { width: u32, height: u32 },
    /// Longest opposing edge lengths of the quad
    FromCorners,
}

/// Quadrilateral → rectangle rectifier
#[derive(Debug, Clone, Copy)]
pub struct Rectifier {
    size: RectifiedSize,
}

impl Rectifier {
    pub fn new(size: RectifiedSize) -> Self {
        Self { size }
    }

    /// Rectify the quad region of `image` into an axis-aligned image
    ///
    /// `corners` are TL, TR, BR, BL as labelled by the caller.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the source is smaller than 2×2, the quad
    /// has zero area or is concave, or the output size is out of range
    pub fn rectify(&self, image: &RgbaImage, corners: [PixelPoint; 4]) -> Result<RgbaImage> {
        let (src_w, src_h) = image.dimensions();
        if src_w < 2 || src_h < 2 {
            return Err(AnalysisError::invalid_input(format!(
                "cannot rectify from a {}x{} image",
                src_w, src_h
            )));
        }

        let ordered = order_corners(corners);

        let area = polygon_area(&ordered);
        if !(area >= 1.0) {
            return Err(AnalysisError::invalid_input(format!(
                "quadrilateral region has zero area ({:.3} px²)",
                area
            )));
        }
        if !is_convex(&ordered) {
            return Err(AnalysisError::invalid_input("quadrilateral region is not convex"));
        }

        let (width, height) = match self.size {
            RectifiedSize::Fixed { width, height } => (width, height),
            RectifiedSize::FromCorners => compute_output_size(&ordered),
        };
        if width == 0 || height == 0 || width > MAX_RECTIFIED_SIDE || height > MAX_RECTIFIED_SIDE {
            return Err(AnalysisError::invalid_input(format!(
                "rectified region size {}x{} is outside 1-{}",
                width, height, MAX_RECTIFIED_SIDE
            )));
        }

        let (w, h) = (width as f32, height as f32);
        let rect = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)];
        let quad = ordered.map(|p| (p.x, p.y));
        let to_source = Projection::from_control_points(rect, quad).ok_or_else(|| {
            AnalysisError::invalid_input("region corners are degenerate (collinear or repeated)")
        })?;

        let max_x = (src_w - 1) as f32 - BORDER_INSET;
        let max_y = (src_h - 1) as f32 - BORDER_INSET;

        log::debug!("rectifying quad {:?} into {}x{}", ordered, width, height);
        let mut out = RgbaImage::new(width, height);
        warp_into_with(
            image,
            move |x, y| {
                // Pixel centers in, pixel indices out; max() also maps NaN to the border
                let (sx, sy) = to_source * (x + 0.5, y + 0.5);
                ((sx - 0.5).max(0.0).min(max_x), (sy - 0.5).max(0.0).min(max_y))
            },
            Interpolation::Bilinear,
            Rgba([0, 0, 0, 0]),
            &mut out,
        );
        Ok(out)
    }
}

/// Corners as TL, TR, BR, BL
///
/// Labels are kept when they trace a simple polygon. A crossed (bow-tie)
/// labelling is re-traced clockwise around the centroid, starting from the
/// corner with the smallest x+y.
pub fn order_corners(corners: [PixelPoint; 4]) -> [PixelPoint; 4] {
    let [tl, tr, br, bl] = corners;
    if !segments_cross(tl, tr, br, bl) && !segments_cross(tr, br, bl, tl) {
        return corners;
    }

    let cx = corners.iter().map(|p| p.x).sum::<f32>() / 4.0;
    let cy = corners.iter().map(|p| p.y).sum::<f32>() / 4.0;

    let mut pts = corners;
    pts.sort_by(|a, b| (a.y - cy).atan2(a.x - cx).total_cmp(&(b.y - cy).atan2(b.x - cx)));

    let start = (0..4)
        .min_by(|&i, &j| (pts[i].x + pts[i].y).total_cmp(&(pts[j].x + pts[j].y)))
        .unwrap_or(0);
    pts.rotate_left(start);
    pts
}

/// Output size from ordered corners: longest horizontal and vertical edges
pub fn compute_output_size(corners: &[PixelPoint; 4]) -> (u32, u32) {
    let [tl, tr, br, bl] = corners;

    let top_width = tl.distance(tr);
    let bottom_width = bl.distance(br);
    let width = top_width.max(bottom_width).round().min(MAX_RECTIFIED_SIDE as f32) as u32;

    let left_height = tl.distance(bl);
    let right_height = tr.distance(br);
    let height = left_height.max(right_height).round().min(MAX_RECTIFIED_SIDE as f32) as u32;

    (width, height)
}

fn cross(o: PixelPoint, a: PixelPoint, b: PixelPoint) -> f32 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Proper intersection of segments `ab` and `cd`
fn segments_cross(a: PixelPoint, b: PixelPoint, c: PixelPoint, d: PixelPoint) -> bool {
    let d1 = cross(a, b, c);
    let d2 = cross(a, b, d);
    let d3 = cross(c, d, a);
    let d4 = cross(c, d, b);
    d1 * d2 < 0.0 && d3 * d4 < 0.0
}

fn is_convex(points: &[PixelPoint; 4]) -> bool {
    let turns: Vec<f32> = (0..4)
        .map(|i| cross(points[i], points[(i + 1) % 4], points[(i + 2) % 4]))
        .collect();
    turns.iter().all(|&t| t >= 0.0) || turns.iter().all(|&t| t <= 0.0)
}

/// Shoelace area of an ordered polygon
fn polygon_area(points: &[PixelPoint; 4]) -> f32 {
    let mut twice = 0.0;
    for i in 0..4 {
        let p = points[i];
        let q = points[(i + 1) % 4];
        twice += p.x * q.y - q.x * p.y;
    }
    (twice / 2.0).abs()
}
