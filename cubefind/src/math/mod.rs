//! Order statistics and moments used by the noise model.

pub(crate) mod bbox;

pub use bbox::Aabb;


/// MADFM to standard deviation conversion factor.
///
/// For a normal distribution, σ ≈ 1.4826 × MADFM.
/// This is the exact value: 1 / Φ⁻¹(3/4) where Φ⁻¹ is the inverse CDF.
pub const MADFM_TO_SIGMA: f32 = 1.4826022;

/// Convert MADFM to the equivalent Gaussian standard deviation.
#[inline]
pub fn madfm_to_sigma(madfm: f32) -> f32 {
    madfm * MADFM_TO_SIGMA
}

/// Convert a Gaussian standard deviation to the equivalent MADFM.
#[inline]
pub fn sigma_to_madfm(sigma: f32) -> f32 {
    sigma / MADFM_TO_SIGMA
}

/// Calculate the median of f32 values in-place.
///
/// Mutates the input buffer (partial sort via quickselect). Even-length input
/// averages the two middle values.
#[inline]
pub fn median_f32_mut(data: &mut [f32]) -> f32 {
    debug_assert!(!data.is_empty());

    let len = data.len();
    let mid = len / 2;

    let (left_part, upper, _) = data.select_nth_unstable_by(mid, f32::total_cmp);
    let upper = *upper;
    if len & 1 == 1 {
        upper
    } else {
        let lower = left_part.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        (lower + upper) * 0.5
    }
}

/// Compute median and MADFM together.
///
/// The buffer is overwritten with absolute deviations from the median.
pub fn median_and_madfm_f32_mut(data: &mut [f32]) -> (f32, f32) {
    debug_assert!(!data.is_empty());

    let median = median_f32_mut(data);
    for v in data.iter_mut() {
        *v = (*v - median).abs();
    }
    let madfm = median_f32_mut(data);

    (median, madfm)
}

/// Running first and second moments, accumulated in f64.
#[derive(Debug, Clone, Copy, Default)]
pub struct Moments {
    count: usize,
    sum: f64,
    sum_sq: f64,
}

impl Moments {
    #[inline]
    pub fn push(&mut self, value: f32) {
        let v = value as f64;
        self.count += 1;
        self.sum += v;
        self.sum_sq += v * v;
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Mean, or `None` when empty.
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }

    /// Sample standard deviation (n - 1 denominator), or `None` with fewer than 2 values.
    pub fn stddev(&self) -> Option<f64> {
        if self.count < 2 {
            return None;
        }
        let n = self.count as f64;
        let variance = (self.sum_sq - self.sum * self.sum / n) / (n - 1.0);
        // Cancellation can leave a tiny negative residue for constant input.
        Some(variance.max(0.0).sqrt())
    }
}

impl FromIterator<f32> for Moments {
    fn from_iter<I: IntoIterator<Item = f32>>(iter: I) -> Self {
        let mut moments = Moments::default();
        for v in iter {
            moments.push(v);
        }
        moments
    }
}
