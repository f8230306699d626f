use proptest::prelude::*;

use eta_dashboard::{
    classify_risk, collect_inputs, derive_eta_bounds, types::RiskTier, WidgetState,
};

proptest! {
    #[test]
    fn max_eta_never_below_min_eta(p in 0.0f64..10_000.0) {
        let (min_eta, max_eta) = derive_eta_bounds(p);
        prop_assert!(max_eta >= min_eta);
        prop_assert_eq!(max_eta, (p + p * 0.10 + 3.0).round_ties_even() as i64);
    }

    #[test]
    fn risk_ladder_is_total(max_eta in any::<i64>()) {
        let tier = classify_risk(max_eta);
        let expected = if max_eta > 45 {
            RiskTier::High
        } else if max_eta > 30 {
            RiskTier::Moderate
        } else {
            RiskTier::Low
        };
        prop_assert_eq!(tier, expected);
        prop_assert!([30u8, 60, 85].contains(&tier.score()));
    }

    #[test]
    fn sliders_always_yield_in_range_inputs(
        age in proptest::option::of(any::<i64>()),
        rating in proptest::option::of(any::<f64>()),
        distance_km in proptest::option::of(any::<f64>()),
    ) {
        let inputs = collect_inputs(&WidgetState {
            age,
            rating,
            distance_km,
            ..WidgetState::default()
        });
        prop_assert!((18..=60).contains(&inputs.age));
        prop_assert!((1.0..=5.0).contains(&inputs.rating));
        prop_assert!((0.5..=25.0).contains(&inputs.distance_km));
    }
}
