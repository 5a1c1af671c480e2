//! Property tests for threshold bands and saliency normalization

use ictus::gradcam::{gradient_weights, weighted_saliency};
use ictus::{classify, RiskLevel, StrokeType};
use ndarray::{Array1, Array3};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_detection_flag_matches_strict_rule(confidence in 0.0_f64..=100.0) {
        let decision = classify(confidence);
        prop_assert_eq!(decision.detected, confidence > 50.0);
    }

    #[test]
    fn prop_risk_bands_are_ordered(confidence in 0.0_f64..=100.0) {
        let decision = classify(confidence);
        let expected = if confidence > 80.0 {
            RiskLevel::High
        } else if confidence > 60.0 {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        };
        prop_assert_eq!(decision.risk, expected);
    }

    #[test]
    fn prop_stroke_type_band_edges(confidence in 0.0_f64..=100.0) {
        let decision = classify(confidence);
        match decision.stroke_type {
            StrokeType::None => prop_assert!(confidence < 50.0),
            StrokeType::PossibleTia => prop_assert!((50.0..70.0).contains(&confidence)),
            StrokeType::LikelyIschemic => prop_assert!((70.0..85.0).contains(&confidence)),
            StrokeType::LikelyHemorrhagic => prop_assert!(confidence >= 85.0),
        }
    }

    #[test]
    fn prop_detected_implies_banded(confidence in 0.0_f64..=100.0) {
        let decision = classify(confidence);
        if decision.detected {
            prop_assert_ne!(decision.stroke_type, StrokeType::None);
        }
    }

    #[test]
    fn prop_saliency_values_in_unit_interval(
        values in proptest::collection::vec(-10.0_f32..10.0, 36),
        weights in proptest::collection::vec(-2.0_f32..2.0, 4),
    ) {
        let activation = Array3::from_shape_vec((3, 3, 4), values).unwrap();
        let weights = Array1::from_vec(weights);

        let map = weighted_saliency(&activation, &weights);
        for &v in map.iter() {
            prop_assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn prop_saliency_max_is_one_or_map_is_zero(
        values in proptest::collection::vec(-10.0_f32..10.0, 36),
        weights in proptest::collection::vec(-2.0_f32..2.0, 4),
    ) {
        let activation = Array3::from_shape_vec((3, 3, 4), values).unwrap();
        let weights = Array1::from_vec(weights);

        let map = weighted_saliency(&activation, &weights);
        let max = map.iter().fold(0.0_f32, |m, &v| m.max(v));
        prop_assert!(max == 1.0 || map.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn prop_gradient_weights_one_per_channel(
        values in proptest::collection::vec(-5.0_f32..5.0, 48),
    ) {
        let gradient = Array3::from_shape_vec((4, 4, 3), values).unwrap();
        let weights = gradient_weights(&gradient);
        prop_assert_eq!(weights.len(), 3);
    }
}
