use fsim_core::Complex64;
use fsim_estimate::{trimmed_range, ComplexEstimator, Estimate, RealEstimator, THROW_RATIO};
use proptest::prelude::*;

/// Drives an estimator so that its history equals `targets` exactly.
///
/// Each flush records the cumulative average, so the sample fed before flush
/// `i` is chosen to move the average onto `targets[i]`.
fn real_with_history(targets: &[f64]) -> RealEstimator {
    let mut estimator = RealEstimator::new("x");
    let mut previous = 0.0;
    for (step, target) in targets.iter().enumerate() {
        let weight_after = step as f64 + 2.0;
        let sample = target * weight_after - previous * (weight_after - 1.0);
        estimator.measure(sample);
        estimator.add_statistics();
        previous = *target;
    }
    estimator
}

#[test]
fn documented_history_example() {
    let result = trimmed_range(&[1.0, 5.0, 2.0, 9.0, 3.0, 7.0]).unwrap();
    assert_eq!(result.error, 3.5);
    assert!((result.ratio - 1.0 / 9.0).abs() < 1e-12);
}

#[test]
fn estimator_uses_running_average_as_mean() {
    let mut estimator = real_with_history(&[1.0, 5.0, 2.0, 9.0, 3.0, 7.0]);
    for (recorded, expected) in estimator.history().iter().zip([1.0, 5.0, 2.0, 9.0, 3.0, 7.0]) {
        assert!((recorded - expected).abs() < 1e-9);
    }
    let estimate = estimator.estimate();
    assert!((estimate.mean - 7.0).abs() < 1e-9);
    assert!((estimate.error - 3.5).abs() < 1e-9);
    assert!((estimator.ratio() - 1.0 / 9.0).abs() < 1e-9);
}

#[test]
fn complex_ratio_follows_wider_component() {
    // real: min at 3, max at 4 (gap 1); imaginary: min at 2, max at 6 (gap 4)
    let history = [
        Complex64::new(0.0, 0.0),
        Complex64::new(0.0, 0.0),
        Complex64::new(0.5, -2.0),
        Complex64::new(0.1, 0.0),
        Complex64::new(0.9, 0.0),
        Complex64::new(0.5, 0.0),
        Complex64::new(0.5, 3.0),
    ];
    let result = trimmed_range(&history).unwrap();
    assert!((result.error.re - 0.4).abs() < 1e-12);
    assert!((result.error.im - 2.5).abs() < 1e-12);
    let expected = 4.0 / 7.0 * (1.0 - THROW_RATIO);
    assert!((result.ratio - expected).abs() < 1e-12);
}

#[test]
fn complex_ratio_compares_signed_gaps() {
    let history = [
        Complex64::new(1.0, 4.0),
        Complex64::new(2.0, 3.0),
        Complex64::new(3.0, 2.0),
    ];
    let result = trimmed_range(&history).unwrap();
    // retained [1, 2]: real gap +1, imaginary gap -1
    let expected = 1.0 / 3.0 * (1.0 - THROW_RATIO);
    assert!((result.ratio - expected).abs() < 1e-12);
}

#[test]
fn descending_history_gives_negative_ratio() {
    let result = trimmed_range(&[9.0, 8.0, 7.0, 6.0, 5.0, 4.0]).unwrap();
    assert!(result.ratio < 0.0);
    assert_eq!(result.error, 1.5);
}

#[test]
fn empty_history_keeps_cached_estimate() {
    let mut estimator = RealEstimator::new("x");
    estimator.measure(3.0);
    assert_eq!(estimator.estimate(), Estimate::default());
    assert_eq!(estimator.ratio(), 1.0);

    estimator.add_statistics();
    let first = estimator.estimate();
    estimator.clear_statistics();
    assert_eq!(estimator.estimate(), first);
    assert_eq!(estimator.last_estimate(), first);
    assert_eq!(estimator.ratio(), 1.0);
}

#[test]
fn clear_resets_to_unit_normalization() {
    let mut estimator = ComplexEstimator::new("1");
    estimator.measure(Complex64::new(1.0, 1.0));
    estimator.add_statistics();
    estimator.clear_statistics();
    assert!(estimator.history().is_empty());
    assert_eq!(estimator.accumulator(), Complex64::new(0.0, 0.0));
    assert_eq!(estimator.normalization(), 1.0);
}

#[test]
fn flush_does_not_reset_running_sums() {
    let mut estimator = RealEstimator::new("x");
    estimator.measure(2.0);
    estimator.add_statistics();
    estimator.measure(4.0);
    estimator.add_statistics();
    assert_eq!(estimator.accumulator(), 6.0);
    assert_eq!(estimator.normalization(), 3.0);
    assert_eq!(estimator.history(), &[1.0, 2.0]);
}

#[test]
fn squeeze_keeps_running_average() {
    let mut estimator = RealEstimator::new("x");
    for value in [1.0, 2.0, 3.0] {
        estimator.measure(value);
    }
    estimator.squeeze_statistics(2.0);
    assert_eq!(estimator.normalization(), 2.0);
    assert_eq!(estimator.accumulator(), 3.0);
    estimator.measure(6.0);
    assert_eq!(estimator.accumulator() / estimator.normalization(), 3.0);
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "squeeze factor must be positive")]
fn squeeze_rejects_zero_factor() {
    let mut estimator = RealEstimator::new("x");
    estimator.measure(1.0);
    estimator.squeeze_statistics(0.0);
}

#[test]
fn estimates_render_like_reports() {
    assert_eq!(Estimate::new(1.5, 0.25).to_string(), "1.5+/-0.25");
    let complex = Estimate::new(Complex64::new(1.0, -2.0), Complex64::new(0.5, 0.125));
    assert_eq!(complex.to_string(), "(1+/-0.5,-2+/-0.125)");
}

proptest! {
    #[test]
    fn error_bounds_the_retained_spread(history in prop::collection::vec(-1.0e3f64..1.0e3, 1..64)) {
        let result = trimmed_range(&history).unwrap();
        let start = history.len() / 3;
        let retained = &history[start..];
        let max = retained.iter().cloned().fold(f64::MIN, f64::max);
        let min = retained.iter().cloned().fold(f64::MAX, f64::min);
        prop_assert!((result.error - (max - min) / 2.0).abs() < 1e-9);
        prop_assert!(result.ratio.abs() <= 1.0 - THROW_RATIO + 1e-12);
    }
}
