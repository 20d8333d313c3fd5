//! Scale Metric
//!
//! Distances on the cyclical scale spectrum, where 0 and 1 are the same point.

/// Cyclical distance between two scales in [0, 1).
pub fn scale_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).abs();
    d.min(1.0 - d)
}

/// Encounter weight for a pair at the given distance. Closer pairs weigh more.
pub fn encounter_weight(distance: f64, epsilon: f64) -> f64 {
    1.0 / (epsilon + distance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_distance_wraps_around() {
        assert!((scale_distance(0.01, 0.99) - 0.02).abs() < 1e-12);
        assert!((scale_distance(0.2, 0.7) - 0.5).abs() < 1e-12);
        assert_eq!(scale_distance(0.3, 0.3), 0.0);
    }

    #[test]
    fn test_weight_favors_close_pairs() {
        let close = encounter_weight(scale_distance(0.01, 0.02), 0.01);
        let far = encounter_weight(scale_distance(0.01, 0.9), 0.01);
        assert!(close > far * 5.0);
        assert!(encounter_weight(0.0, 0.01).is_finite());
    }

    proptest! {
        #[test]
        fn prop_symmetric_and_bounded(a in 0.0f64..1.0, b in 0.0f64..1.0) {
            let d = scale_distance(a, b);
            prop_assert_eq!(d, scale_distance(b, a));
            prop_assert!(d >= 0.0);
            prop_assert!(d <= 0.5);
        }

        #[test]
        fn prop_zero_only_on_equal(a in 0.0f64..1.0, b in 0.0f64..1.0) {
            prop_assert_eq!(scale_distance(a, a), 0.0);
            if a != b {
                prop_assert!(scale_distance(a, b) > 0.0);
            }
        }

        #[test]
        fn prop_triangle_inequality(a in 0.0f64..1.0, b in 0.0f64..1.0, c in 0.0f64..1.0) {
            let direct = scale_distance(a, c);
            let via = scale_distance(a, b) + scale_distance(b, c);
            prop_assert!(direct <= via + 1e-12);
        }
    }
}
