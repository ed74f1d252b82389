//! Lightness equalization
//!
//! Spreads the L* histogram of a frame over the full range while keeping
//! each pixel's a*/b* chroma, so a dim or flat photo keeps its hues.

use image::{GrayImage, Luma, RgbaImage};
use imageproc::contrast::equalize_histogram;
use palette::{Lab, Srgb};

use crate::color::ColorConverter;

/// Equalize the lightness channel of `image`; alpha is kept
pub fn equalize_lightness(image: &RgbaImage, converter: &ColorConverter) -> RgbaImage {
    let (width, height) = image.dimensions();
    let labs: Vec<Lab> = image
        .pixels()
        .map(|p| converter.rgb_to_lab(Srgb::new(p.0[0], p.0[1], p.0[2])))
        .collect();

    let lightness = GrayImage::from_fn(width, height, |x, y| {
        let l = labs[(y * width + x) as usize].l;
        Luma([(l * 255.0 / 100.0).round().clamp(0.0, 255.0) as u8])
    });
    let equalized = equalize_histogram(&lightness);

    let mut out = image.clone();
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let lab = labs[(y * width + x) as usize];
        let l = equalized.get_pixel(x, y).0[0] as f32 * 100.0 / 255.0;
        let rgb = converter.lab_to_rgb(Lab::new(l, lab.a, lab.b));
        pixel.0[0] = rgb.red;
        pixel.0[1] = rgb.green;
        pixel.0[2] = rgb.blue;
    }

    log::debug!("equalized lightness of {}x{} frame", width, height);
    out
}
