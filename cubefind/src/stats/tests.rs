use super::*;
use crate::math::MADFM_TO_SIGMA;
use crate::testing::normal_samples;

fn masked_example() -> StatsContainer {
    let values = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
    let mask = [true, true, true, true, true, false];
    StatsContainer::calculate(&values, Some(&mask)).unwrap()
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

#[test]
fn test_robust_masked_example() {
    let mut stats = masked_example();
    assert!(stats.use_robust());
    assert_eq!(stats.median(), 3.0);
    assert_eq!(stats.madfm(), 1.0);
    assert!((stats.spread() - 1.4826).abs() < 1e-4);

    stats.set_threshold_snr(2.0);
    assert!((stats.threshold() - 5.97).abs() < 0.01);
    assert!(stats.is_detection(7.0));
    assert!(!stats.is_detection(5.0));
}

#[test]
fn test_classic_statistics() {
    let mut stats = masked_example();
    stats.set_use_robust(false);
    assert_eq!(stats.mean(), 3.0);
    // Sample standard deviation of 1..=5
    assert!((stats.stddev() - 2.5f32.sqrt()).abs() < 1e-6);
    assert_eq!(stats.middle(), 3.0);
    assert_eq!(stats.spread(), stats.stddev());
}

#[test]
fn test_non_finite_values_skipped() {
    let values = [1.0, f32::NAN, 2.0, f32::INFINITY, 3.0];
    let stats = StatsContainer::calculate(&values, None).unwrap();
    assert_eq!(stats.median(), 2.0);
    assert_eq!(stats.mean(), 2.0);
}

#[test]
fn test_degenerate_inputs_are_errors() {
    assert_eq!(
        StatsContainer::calculate(&[], None),
        Err(StatsError::NoValidValues)
    );
    assert_eq!(
        StatsContainer::calculate(&[1.0, 2.0], Some(&[false, false])),
        Err(StatsError::NoValidValues)
    );
    assert_eq!(
        StatsContainer::calculate(&[4.0], None),
        Err(StatsError::InsufficientValues { count: 1 })
    );
    assert_eq!(
        StatsContainer::calculate(&[1.0, 2.0], Some(&[true])),
        Err(StatsError::LengthMismatch { values: 2, mask: 1 })
    );
}

#[test]
fn test_gaussian_noise_estimates_agree() {
    let values = normal_samples(11, 20_000, 5.0, 2.0);
    let stats = StatsContainer::calculate(&values, None).unwrap();
    assert!((stats.mean() - 5.0).abs() < 0.05);
    assert!((stats.median() - 5.0).abs() < 0.05);
    assert!((stats.stddev() - 2.0).abs() < 0.05);
    assert!((stats.madfm() * MADFM_TO_SIGMA - 2.0).abs() < 0.08);
}

#[test]
fn test_define_and_scale_noise() {
    let mut stats = StatsContainer::define(1.0, 0.5, 2.0, 1.0);
    assert_eq!(stats.middle(), 0.5);
    stats.set_use_robust(false);
    assert_eq!(stats.middle(), 1.0);
    assert_eq!(stats.spread(), 2.0);

    stats.scale_noise(3.0);
    assert_eq!(stats.stddev(), 6.0);
    assert_eq!(stats.madfm(), 3.0);
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

#[test]
fn test_snr_round_trip() {
    let stats = masked_example();
    for snr in [-3.0f32, 0.0, 0.7, 2.0, 5.5, 12.0] {
        let back = stats.value_to_snr(stats.snr_to_value(snr));
        assert!((back - snr).abs() < 1e-5, "snr={snr} back={back}");
    }
}

#[test]
fn test_direct_threshold_is_strict() {
    let mut stats = StatsContainer::define(0.0, 0.0, 1.0, 1.0);
    stats.set_threshold(4.0);
    assert!(!stats.is_detection(4.0));
    assert!(stats.is_detection(4.0001));
    assert!((stats.threshold_snr() - 4.0 / MADFM_TO_SIGMA).abs() < 1e-5);
}

#[test]
fn test_p_value_of_middle_is_half() {
    let stats = masked_example();
    assert!((stats.p_value(stats.middle()) - 0.5).abs() < 1e-12);
    assert!(stats.p_value(100.0) < 1e-10);
}

fn noise_with_sources() -> Vec<f32> {
    let mut values = normal_samples(3, 20_000, 0.0, 1.0);
    values.extend(std::iter::repeat_n(12.0, 40));
    values
}

#[test]
fn test_fdr_detects_bright_sources() {
    let values = noise_with_sources();
    let mut stats = StatsContainer::calculate(&values, None).unwrap();
    stats.setup_fdr(&values, 0.01, 20).unwrap();

    assert!(stats.use_fdr());
    assert!(stats.p_threshold() > 0.0);
    assert!(stats.is_detection(12.0));
    assert!(!stats.is_detection(0.0));
    assert!(stats.threshold() > 2.0 && stats.threshold() <= 12.0 + 1e-3);

    // Flux threshold and p-value threshold describe the same cut.
    let margin = 0.01 * stats.spread();
    assert!(stats.is_detection(stats.threshold() + margin));
    assert!(!stats.is_detection(stats.threshold() - margin));
}

#[test]
fn test_fdr_without_passing_voxels_detects_nothing() {
    let values = normal_samples(5, 2_000, 0.0, 1.0);
    let mut stats = StatsContainer::calculate(&values, None).unwrap();
    stats.setup_fdr(&values, 1e-9, 20).unwrap();
    assert_eq!(stats.p_threshold(), 0.0);
    assert!(!stats.is_detection(1e6));
}

#[test]
fn test_fdr_monotonic_in_alpha() {
    let values = noise_with_sources();
    let base = StatsContainer::calculate(&values, None).unwrap();

    let mut previous = 0;
    for alpha in [0.001, 0.005, 0.01, 0.05, 0.1, 0.2] {
        let mut stats = base;
        stats.setup_fdr(&values, alpha, 20).unwrap();
        let count = values.iter().filter(|&&v| stats.is_detection(v)).count();
        assert!(
            count >= previous,
            "alpha {alpha}: {count} detections < {previous}"
        );
        previous = count;
    }
    assert!(previous >= 40);
}

#[test]
fn test_set_threshold_disables_fdr() {
    let values = noise_with_sources();
    let mut stats = StatsContainer::calculate(&values, None).unwrap();
    stats.setup_fdr(&values, 0.05, 1).unwrap();
    stats.set_threshold_snr(3.0);
    assert!(!stats.use_fdr());
}

#[test]
fn test_setup_fdr_empty_is_error() {
    let mut stats = masked_example();
    assert_eq!(stats.setup_fdr(&[], 0.05, 1), Err(StatsError::NoValidValues));
}
