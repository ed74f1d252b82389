//! Nearest-reference risk classification
//!
//! Classifies a Lab color by its distance to the three reference colors:
//! - Nearest reference wins, exact ties resolve toward the more severe state
//! - Score is interpolated inside the winner's band from the distance ratio
//!   between the winner and its nearest competitor
//! - Percentages are normalized inverse-distance weights
//!
//! Everything here is a pure function of the input color, the reference set
//! and the score bands.

use image::RgbaImage;
use palette::{Lab, Srgb};
use serde::{Deserialize, Serialize};

use super::category::RiskCategory;
use crate::calibration::{ReferenceSet, WhiteBalance};
use crate::color::{delta_e, ColorConverter};
use crate::config::ClassificationConfig;
use crate::constants::scoring;
use crate::sampling::RegionSampler;
use crate::{AnalysisError, Result};

/// Inclusive score range for one category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBand {
    pub min: f32,
    pub max: f32,
}

impl ScoreBand {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn midpoint(&self) -> f32 {
        (self.min + self.max) / 2.0
    }

    fn validate(&self, name: &str) -> Result<()> {
        let ok = self.min.is_finite()
            && self.max.is_finite()
            && self.min >= 0.0
            && self.max <= 100.0
            && self.min <= self.max;
        if ok {
            Ok(())
        } else {
            Err(AnalysisError::invalid_input(format!(
                "{} score band [{}, {}] must lie within 0-100 with min <= max",
                name, self.min, self.max
            )))
        }
    }
}

/// Score bands per category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBands {
    pub safe: ScoreBand,
    pub warning: ScoreBand,
    pub danger: ScoreBand,
}

impl Default for ScoreBands {
    fn default() -> Self {
        Self {
            safe: ScoreBand::new(scoring::SAFE_BAND.0, scoring::SAFE_BAND.1),
            warning: ScoreBand::new(scoring::WARNING_BAND.0, scoring::WARNING_BAND.1),
            danger: ScoreBand::new(scoring::DANGER_BAND.0, scoring::DANGER_BAND.1),
        }
    }
}

impl ScoreBands {
    pub fn get(&self, category: RiskCategory) -> ScoreBand {
        match category {
            RiskCategory::Safe => self.safe,
            RiskCategory::Warning => self.warning,
            RiskCategory::Danger => self.danger,
        }
    }

    /// Check every band lies within 0-100 and is not inverted
    pub fn validate(&self) -> Result<()> {
        self.safe.validate("safe")?;
        self.warning.validate("warning")?;
        self.danger.validate("danger")
    }
}

/// Share of each category, summing to 100
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percentages {
    pub safe: f32,
    pub warning: f32,
    pub danger: f32,
}

impl Percentages {
    pub fn get(&self, category: RiskCategory) -> f32 {
        match category {
            RiskCategory::Safe => self.safe,
            RiskCategory::Warning => self.warning,
            RiskCategory::Danger => self.danger,
        }
    }

    pub fn total(&self) -> f32 {
        self.safe + self.warning + self.danger
    }

    fn from_weights(weights: [f64; 3]) -> Self {
        let sum: f64 = weights.iter().sum();
        let pct = |w: f64| (w / sum * 100.0) as f32;
        Self {
            safe: pct(weights[0]),
            warning: pct(weights[1]),
            danger: pct(weights[2]),
        }
    }
}

/// ΔE from a sample to each reference
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryDistances {
    pub safe: f32,
    pub warning: f32,
    pub danger: f32,
}

impl CategoryDistances {
    pub fn get(&self, category: RiskCategory) -> f32 {
        match category {
            RiskCategory::Safe => self.safe,
            RiskCategory::Warning => self.warning,
            RiskCategory::Danger => self.danger,
        }
    }

    /// Closest category; exact ties go to the more severe category
    pub fn nearest(&self) -> RiskCategory {
        let [first, rest @ ..] = RiskCategory::TIE_BREAK_ORDER;
        rest.into_iter().fold(first, |best, candidate| {
            if self.get(candidate) < self.get(best) {
                candidate
            } else {
                best
            }
        })
    }

    /// Closest category other than `winner`, with the same tie rule
    fn runner_up(&self, winner: RiskCategory) -> RiskCategory {
        RiskCategory::TIE_BREAK_ORDER
            .into_iter()
            .filter(|c| *c != winner)
            .fold(None, |best: Option<RiskCategory>, candidate| match best {
                Some(b) if self.get(candidate) >= self.get(b) => Some(b),
                _ => Some(candidate),
            })
            .unwrap_or(winner)
    }
}

/// Classification of one sampled color
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub risk: RiskCategory,
    /// 0-100, inside the band of `risk`
    pub score: u8,
    pub percentages: Percentages,
}

/// Risk classifier over an immutable reference set
#[derive(Debug, Clone)]
pub struct RiskClassifier {
    references: ReferenceSet,
    bands: ScoreBands,
    converter: ColorConverter,
}

impl Default for RiskClassifier {
    fn default() -> Self {
        Self {
            references: ReferenceSet::default(),
            bands: ScoreBands::default(),
            converter: ColorConverter::new(),
        }
    }
}

impl RiskClassifier {
    /// Create a classifier with custom references and bands
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if a score band is malformed
    pub fn new(references: ReferenceSet, bands: ScoreBands) -> Result<Self> {
        bands.validate()?;
        Ok(Self {
            references,
            bands,
            converter: ColorConverter::new(),
        })
    }

    /// Create a classifier from configuration
    pub fn from_config(config: &ClassificationConfig) -> Result<Self> {
        Self::new(config.reference_set(), config.score_bands)
    }

    pub fn references(&self) -> &ReferenceSet {
        &self.references
    }

    pub fn bands(&self) -> &ScoreBands {
        &self.bands
    }

    /// Distance from `lab` to every reference
    pub fn distances(&self, lab: Lab) -> CategoryDistances {
        CategoryDistances {
            safe: delta_e(lab, self.references.safe),
            warning: delta_e(lab, self.references.warning),
            danger: delta_e(lab, self.references.danger),
        }
    }

    /// Classify a Lab color
    pub fn classify_lab(&self, lab: Lab) -> ClassificationResult {
        let distances = self.distances(lab);
        let risk = distances.nearest();
        let score = self.score(risk, &distances);
        let percentages = Self::percentages(&distances);

        log::debug!(
            "Lab({:.1}, {:.1}, {:.1}) ΔE safe={:.1} warning={:.1} danger={:.1} -> {} ({})",
            lab.l,
            lab.a,
            lab.b,
            distances.safe,
            distances.warning,
            distances.danger,
            risk,
            score
        );

        ClassificationResult {
            risk,
            score,
            percentages,
        }
    }

    /// Classify an sRGB color (0-255)
    pub fn classify_rgb(&self, rgb: Srgb<u8>) -> ClassificationResult {
        self.classify_lab(self.converter.rgb_to_lab(rgb))
    }

    /// Classify floating channels on the 0-255 scale (clamped)
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if any channel is not finite
    pub fn classify_channels(&self, channels: [f32; 3]) -> Result<ClassificationResult> {
        let lab = self.converter.channels_to_lab(channels[0], channels[1], channels[2])?;
        Ok(self.classify_lab(lab))
    }

    /// Classify an already-extracted region by its average color
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the region has no pixels
    pub fn classify_region(&self, region: &RgbaImage) -> Result<ClassificationResult> {
        let channels = RegionSampler::default().average_channels(region)?;
        self.classify_channels(channels)
    }

    /// Deterministic score inside the winner's band
    ///
    /// `t = 2·d_win / (d_win + d_next)` runs from 0 on the reference to 1 on
    /// the decision boundary with the nearest competitor. Safe rises from
    /// its band minimum, danger falls from its band maximum, and warning
    /// moves from its band midpoint toward whichever neighbor is closer.
    pub fn score(&self, risk: RiskCategory, distances: &CategoryDistances) -> u8 {
        let runner_up = distances.runner_up(risk);
        let d_win = distances.get(risk);
        let d_next = distances.get(runner_up);
        let t = if d_win + d_next > 0.0 {
            (2.0 * d_win / (d_win + d_next)).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let band = self.bands.get(risk);
        let raw = match risk {
            RiskCategory::Safe => band.min + t * (band.max - band.min),
            RiskCategory::Danger => band.max - t * (band.max - band.min),
            RiskCategory::Warning => {
                let half = (band.max - band.min) / 2.0;
                match runner_up {
                    RiskCategory::Safe => band.midpoint() - t * half,
                    _ => band.midpoint() + t * half,
                }
            }
        };

        raw.clamp(band.min, band.max).round().clamp(0.0, 100.0) as u8
    }

    /// Normalized inverse-distance weights
    ///
    /// Categories at distance zero share 100% between them.
    pub fn percentages(distances: &CategoryDistances) -> Percentages {
        let d = [distances.safe, distances.warning, distances.danger];
        let weights = if d.iter().any(|&x| x == 0.0) {
            d.map(|x| if x == 0.0 { 1.0 } else { 0.0 })
        } else {
            d.map(|x| 1.0 / x as f64)
        };
        Percentages::from_weights(weights)
    }

    /// Per-pixel nearest-reference vote across a region
    ///
    /// Each pixel is optionally white balanced, converted to Lab and assigned
    /// to its nearest reference; the result is the share of pixels per
    /// category.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the region has no pixels
    pub fn classify_pixels(&self, region: &RgbaImage, white_balance: Option<&WhiteBalance>) -> Result<Percentages> {
        if region.width() == 0 || region.height() == 0 {
            return Err(AnalysisError::invalid_input("pixel buffer is empty"));
        }

        let mut counts = [0u64; 3];
        for pixel in region.pixels() {
            let mut channels = [pixel.0[0] as f32, pixel.0[1] as f32, pixel.0[2] as f32];
            if let Some(wb) = white_balance {
                channels = wb.apply_channels(channels);
            }
            let lab = self.converter.channels_to_lab(channels[0], channels[1], channels[2])?;
            let slot = match self.distances(lab).nearest() {
                RiskCategory::Safe => 0,
                RiskCategory::Warning => 1,
                RiskCategory::Danger => 2,
            };
            counts[slot] += 1;
        }

        Ok(Percentages::from_weights(counts.map(|c| c as f64)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn classifier() -> RiskClassifier {
        RiskClassifier::default()
    }

    fn assert_sums_to_100(p: &Percentages) {
        assert!((p.total() - 100.0).abs() < 0.01, "percentages sum to {}", p.total());
    }

    #[test]
    fn test_safe_reference_classifies_safe() {
        let result = classifier().classify_rgb(Srgb::new(0, 243, 255));
        assert_eq!(result.risk, RiskCategory::Safe);
        assert!(result.score <= 20);
        assert_eq!(result.percentages.safe, 100.0);
    }

    #[test]
    fn test_warning_reference_classifies_warning() {
        let result = classifier().classify_rgb(Srgb::new(189, 0, 255));
        assert_eq!(result.risk, RiskCategory::Warning);
        assert!((40..=70).contains(&result.score));
    }

    #[test]
    fn test_danger_reference_classifies_danger() {
        let result = classifier().classify_rgb(Srgb::new(255, 0, 85));
        assert_eq!(result.risk, RiskCategory::Danger);
        assert!((80..=100).contains(&result.score));
    }

    #[test]
    fn test_reference_scores_sit_on_anchors() {
        let c = classifier();
        assert_eq!(c.classify_rgb(Srgb::new(0, 243, 255)).score, 0);
        assert_eq!(c.classify_rgb(Srgb::new(189, 0, 255)).score, 55);
        assert_eq!(c.classify_rgb(Srgb::new(255, 0, 85)).score, 100);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let c = classifier();
        let rgb = Srgb::new(120, 90, 200);
        let first = c.classify_rgb(rgb);
        for _ in 0..10 {
            assert_eq!(c.classify_rgb(rgb), first);
        }
    }

    #[test]
    fn test_score_rises_away_from_safe_reference() {
        let refs = ReferenceSet::default();
        let c = classifier();
        let step = |k: f32| {
            let w = refs.warning;
            let s = refs.safe;
            Lab::new(s.l + (w.l - s.l) * k, s.a + (w.a - s.a) * k, s.b + (w.b - s.b) * k)
        };
        let near = c.classify_lab(step(0.05));
        let farther = c.classify_lab(step(0.3));
        assert_eq!(near.risk, RiskCategory::Safe);
        assert_eq!(farther.risk, RiskCategory::Safe);
        assert!(near.score < farther.score);
        assert!(farther.score <= 20);
    }

    #[test]
    fn test_warning_score_leans_toward_neighbor() {
        let refs = ReferenceSet::default();
        let c = classifier();
        let toward = |target: Lab, k: f32| {
            let w = refs.warning;
            Lab::new(
                w.l + (target.l - w.l) * k,
                w.a + (target.a - w.a) * k,
                w.b + (target.b - w.b) * k,
            )
        };
        // Far enough toward safe that safe, not danger, is the runner-up
        let toward_safe = c.classify_lab(toward(refs.safe, 0.45));
        let toward_danger = c.classify_lab(toward(refs.danger, 0.3));
        assert_eq!(toward_safe.risk, RiskCategory::Warning);
        assert_eq!(toward_danger.risk, RiskCategory::Warning);
        assert!(toward_safe.score < 55 && toward_safe.score >= 40);
        assert!(toward_danger.score > 55 && toward_danger.score <= 70);
    }

    #[test]
    fn test_exact_tie_prefers_danger() {
        let d = CategoryDistances {
            safe: 10.0,
            warning: 10.0,
            danger: 10.0,
        };
        assert_eq!(d.nearest(), RiskCategory::Danger);

        let d = CategoryDistances {
            safe: 5.0,
            warning: 5.0,
            danger: 9.0,
        };
        assert_eq!(d.nearest(), RiskCategory::Warning);
    }

    #[test]
    fn test_tie_between_references_via_shared_color() {
        // Two categories with identical references tie on every sample
        let lab = Lab::new(50.0, 10.0, 10.0);
        let refs = ReferenceSet::new(lab, Lab::new(80.0, 0.0, 0.0), lab);
        let c = RiskClassifier::new(refs, ScoreBands::default()).unwrap();
        let result = c.classify_lab(Lab::new(52.0, 11.0, 9.0));
        assert_eq!(result.risk, RiskCategory::Danger);
    }

    #[test]
    fn test_boundary_sample_scores_band_edge() {
        // Equidistant from safe and warning, far from danger: warning wins
        // the tie and sits on the safe-side edge of its band
        let refs = ReferenceSet::new(
            Lab::new(50.0, -40.0, 0.0),
            Lab::new(50.0, 40.0, 0.0),
            Lab::new(50.0, 0.0, 200.0),
        );
        let c = RiskClassifier::new(refs, ScoreBands::default()).unwrap();
        let result = c.classify_lab(Lab::new(50.0, 0.0, 0.0));
        assert_eq!(result.risk, RiskCategory::Warning);
        assert_eq!(result.score, 40);
    }

    #[test]
    fn test_percentages_sum_to_100() {
        let c = classifier();
        for rgb in [
            Srgb::new(0u8, 0, 0),
            Srgb::new(255, 255, 255),
            Srgb::new(100, 150, 200),
            Srgb::new(220, 30, 140),
            Srgb::new(189, 0, 255),
        ] {
            assert_sums_to_100(&c.classify_rgb(rgb).percentages);
        }
    }

    #[test]
    fn test_percentages_favor_nearest() {
        let d = CategoryDistances {
            safe: 10.0,
            warning: 20.0,
            danger: 40.0,
        };
        let p = RiskClassifier::percentages(&d);
        assert!(p.safe > p.warning && p.warning > p.danger);
        assert!((p.safe - 400.0 / 7.0).abs() < 1e-3);
        assert_sums_to_100(&p);
    }

    #[test]
    fn test_percentages_split_zero_distances() {
        let d = CategoryDistances {
            safe: 0.0,
            warning: 3.0,
            danger: 0.0,
        };
        let p = RiskClassifier::percentages(&d);
        assert_eq!(p.safe, 50.0);
        assert_eq!(p.warning, 0.0);
        assert_eq!(p.danger, 50.0);
    }

    #[test]
    fn test_classify_channels_rejects_nan() {
        assert!(classifier().classify_channels([f32::NAN, 0.0, 0.0]).is_err());
        let ok = classifier().classify_channels([-2.0, 243.4, 258.0]).unwrap();
        assert_eq!(ok.risk, RiskCategory::Safe);
    }

    #[test]
    fn test_invalid_bands_are_rejected() {
        let mut bands = ScoreBands::default();
        bands.warning = ScoreBand::new(70.0, 40.0);
        assert!(RiskClassifier::new(ReferenceSet::default(), bands).is_err());

        bands.warning = ScoreBand::new(40.0, 120.0);
        assert!(RiskClassifier::new(ReferenceSet::default(), bands).is_err());
    }

    #[test]
    fn test_pixel_votes() {
        let image = RgbaImage::from_fn(10, 10, |x, _| match x {
            0..=5 => Rgba([0, 243, 255, 255]),
            6..=8 => Rgba([189, 0, 255, 255]),
            _ => Rgba([255, 0, 85, 255]),
        });
        let votes = classifier().classify_pixels(&image, None).unwrap();
        assert!((votes.safe - 60.0).abs() < 1e-3);
        assert!((votes.warning - 30.0).abs() < 1e-3);
        assert!((votes.danger - 10.0).abs() < 1e-3);
        assert_sums_to_100(&votes);
    }

    #[test]
    fn test_pixel_votes_empty_region() {
        assert!(classifier().classify_pixels(&RgbaImage::new(0, 3), None).is_err());
    }

    #[test]
    fn test_classify_region_averages_first() {
        // Mostly warning with a few safe pixels still averages to warning
        let region = RgbaImage::from_fn(10, 10, |x, y| {
            if x == 0 && y < 3 {
                Rgba([0, 243, 255, 255])
            } else {
                Rgba([189, 0, 255, 255])
            }
        });
        let result = classifier().classify_region(&region).unwrap();
        assert_eq!(result.risk, RiskCategory::Warning);
        assert!(classifier().classify_region(&RgbaImage::new(4, 0)).is_err());
    }
}
