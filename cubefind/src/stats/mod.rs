//! Background noise model and detection threshold.
//!
//! [`StatsContainer`] holds both the classic (mean, stddev) and the robust
//! (median, MADFM) estimates of the noise. `middle`/`spread` select between the
//! two, and the threshold is set directly, from a signal-to-noise cut, or with
//! the False Discovery Rate method (see [`fdr`]).

pub mod fdr;

#[cfg(test)]
mod tests;

use rayon::prelude::*;

use crate::error::StatsError;
use crate::math::{Moments, madfm_to_sigma, median_and_madfm_f32_mut};

/// Noise statistics plus the active detection threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsContainer {
    mean: f32,
    stddev: f32,
    median: f32,
    madfm: f32,
    /// Flux threshold. For FDR this is the flux equivalent of `p_threshold`.
    threshold: f32,
    /// Largest p-value still counted as a detection (FDR only).
    p_threshold: f64,
    use_robust: bool,
    use_fdr: bool,
}

impl StatsContainer {
    /// Compute statistics from `values`, optionally restricted by `mask`.
    ///
    /// `mask[i] == true` keeps `values[i]`. Non-finite values are always skipped.
    /// Robust statistics are selected by default.
    pub fn calculate(values: &[f32], mask: Option<&[bool]>) -> Result<Self, StatsError> {
        let mut kept: Vec<f32> = match mask {
            Some(mask) => {
                if mask.len() != values.len() {
                    return Err(StatsError::LengthMismatch {
                        values: values.len(),
                        mask: mask.len(),
                    });
                }
                values
                    .iter()
                    .zip(mask)
                    .filter(|&(v, &m)| m && v.is_finite())
                    .map(|(&v, _)| v)
                    .collect()
            }
            None => values.iter().copied().filter(|v| v.is_finite()).collect(),
        };

        match kept.len() {
            0 => return Err(StatsError::NoValidValues),
            1 => return Err(StatsError::InsufficientValues { count: 1 }),
            _ => {}
        }

        let moments: Moments = kept.iter().copied().collect();
        // Both are Some for two or more values.
        let mean = moments.mean().unwrap_or_default() as f32;
        let stddev = moments.stddev().unwrap_or_default() as f32;
        let (median, madfm) = median_and_madfm_f32_mut(&mut kept);

        tracing::debug!(
            count = moments.count(),
            mean,
            stddev,
            median,
            madfm,
            "Noise statistics"
        );

        Ok(Self::define(mean, median, stddev, madfm))
    }

    /// Assign statistics computed elsewhere.
    pub fn define(mean: f32, median: f32, stddev: f32, madfm: f32) -> Self {
        Self {
            mean,
            stddev,
            median,
            madfm,
            threshold: 0.0,
            p_threshold: 0.0,
            use_robust: true,
            use_fdr: false,
        }
    }

    /// Choose between (median, MADFM) and (mean, stddev).
    pub fn set_use_robust(&mut self, use_robust: bool) {
        self.use_robust = use_robust;
    }

    #[inline]
    pub fn use_robust(&self) -> bool {
        self.use_robust
    }

    #[inline]
    pub fn use_fdr(&self) -> bool {
        self.use_fdr
    }

    #[inline]
    pub fn mean(&self) -> f32 {
        self.mean
    }

    #[inline]
    pub fn stddev(&self) -> f32 {
        self.stddev
    }

    #[inline]
    pub fn median(&self) -> f32 {
        self.median
    }

    #[inline]
    pub fn madfm(&self) -> f32 {
        self.madfm
    }

    #[inline]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    #[inline]
    pub fn p_threshold(&self) -> f64 {
        self.p_threshold
    }

    /// Noise level: median when robust, mean otherwise.
    #[inline]
    pub fn middle(&self) -> f32 {
        if self.use_robust {
            self.median
        } else {
            self.mean
        }
    }

    /// Noise spread as a Gaussian-equivalent standard deviation.
    #[inline]
    pub fn spread(&self) -> f32 {
        if self.use_robust {
            madfm_to_sigma(self.madfm)
        } else {
            self.stddev
        }
    }

    /// Multiply the noise spread by `factor`, keeping stddev and MADFM consistent.
    ///
    /// Used when the statistics came from a filtered cube whose noise differs
    /// from the original by a known factor.
    pub fn scale_noise(&mut self, factor: f32) {
        self.stddev *= factor;
        self.madfm *= factor;
    }

    /// Set a flux threshold directly. Disables FDR.
    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold;
        self.use_fdr = false;
    }

    /// Set the threshold to `middle + snr * spread`. Disables FDR.
    pub fn set_threshold_snr(&mut self, snr: f32) {
        self.set_threshold(self.snr_to_value(snr));
    }

    /// Signal-to-noise ratio of the current threshold.
    #[inline]
    pub fn threshold_snr(&self) -> f32 {
        self.value_to_snr(self.threshold)
    }

    /// Set up the False Discovery Rate threshold from every valid flux value.
    ///
    /// `num_correlated` is the number of mutually correlated voxels (beam area
    /// times correlated channels). When no voxel passes, the p-value threshold
    /// is 0 and nothing is a detection.
    pub fn setup_fdr(
        &mut self,
        values: &[f32],
        alpha: f32,
        num_correlated: usize,
    ) -> Result<(), StatsError> {
        if values.is_empty() {
            return Err(StatsError::NoValidValues);
        }

        let p_values: Vec<f64> = values.par_iter().map(|&v| self.p_value(v)).collect();
        let p_threshold = fdr::benjamini_hochberg(p_values, alpha as f64, num_correlated);

        self.use_fdr = true;
        self.p_threshold = p_threshold;
        self.threshold = if p_threshold > 0.0 {
            let z = fdr::inverse_survival(p_threshold);
            self.snr_to_value(z as f32)
        } else {
            f32::INFINITY
        };

        tracing::debug!(
            alpha,
            num_correlated,
            p_threshold,
            threshold = self.threshold,
            "FDR threshold"
        );
        Ok(())
    }

    /// One-tailed Gaussian p-value of a flux value under the noise model.
    #[inline]
    pub fn p_value(&self, value: f32) -> f64 {
        fdr::survival(self.value_to_snr(value) as f64)
    }

    #[inline]
    pub fn value_to_snr(&self, value: f32) -> f32 {
        (value - self.middle()) / self.spread()
    }

    #[inline]
    pub fn snr_to_value(&self, snr: f32) -> f32 {
        self.middle() + snr * self.spread()
    }

    /// True if `value` is significant under the active thresholding method.
    #[inline]
    pub fn is_detection(&self, value: f32) -> bool {
        if self.use_fdr {
            self.p_threshold > 0.0 && self.p_value(value) <= self.p_threshold
        } else {
            value > self.threshold
        }
    }
}
