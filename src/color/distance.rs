//! Perceptual color difference
//!
//! Euclidean distance in Lab (ΔE76). Classification only depends on which
//! reference is closest, so the cheaper metric is used instead of CIEDE2000.

use palette::Lab;

use crate::constants::thresholds::JUST_NOTICEABLE_DELTA_E;

/// Compute Delta E (ΔE76) between two Lab colors
pub fn delta_e(lab1: Lab, lab2: Lab) -> f32 {
    let dl = lab1.l - lab2.l;
    let da = lab1.a - lab2.a;
    let db = lab1.b - lab2.b;
    (dl * dl + da * da + db * db).sqrt()
}

/// True when two colors are closer than the just-noticeable difference
pub fn is_imperceptible(lab1: Lab, lab2: Lab) -> bool {
    delta_e(lab1, lab2) < JUST_NOTICEABLE_DELTA_E
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_e_same_color() {
        let lab = Lab::new(50.0, 12.0, -7.0);
        assert_eq!(delta_e(lab, lab), 0.0);
    }

    #[test]
    fn test_delta_e_is_symmetric() {
        let pairs = [
            (Lab::new(50.0, 0.0, 0.0), Lab::new(60.0, 10.0, 10.0)),
            (Lab::new(87.6, -42.8, -19.4), Lab::new(54.0, 82.0, 28.7)),
            (Lab::new(0.0, 0.0, 0.0), Lab::new(100.0, -128.0, 127.0)),
        ];
        for (x, y) in pairs {
            assert_eq!(delta_e(x, y), delta_e(y, x));
        }
    }

    #[test]
    fn test_delta_e_known_value() {
        let lab1 = Lab::new(50.0, 0.0, 0.0);
        let lab2 = Lab::new(53.0, 4.0, 0.0);
        assert!((delta_e(lab1, lab2) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_just_noticeable_threshold() {
        let base = Lab::new(60.0, 20.0, -10.0);
        assert!(is_imperceptible(base, Lab::new(61.0, 20.5, -10.5)));
        assert!(!is_imperceptible(base, Lab::new(63.0, 20.0, -10.0)));
    }
}
