//! Testing utilities for cubefind.

#![allow(dead_code)]

use common::buffer3::Buffer3;
use rand::prelude::*;

use crate::cube::FluxCube;

/// Initialize tracing subscriber for tests.
/// Safe to call multiple times - will only initialize once.
/// Respects RUST_LOG env var, defaults to "info".
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Standard normal deviate via the Box-Muller transform.
pub fn next_gaussian(rng: &mut StdRng) -> f32 {
    // Open interval keeps ln() finite.
    let u1: f64 = rng.random_range(f64::EPSILON..1.0);
    let u2: f64 = rng.random_range(0.0..1.0);
    ((-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()) as f32
}

/// `n` deterministic samples from N(mean, sigma²).
pub fn normal_samples(seed: u64, n: usize, mean: f32, sigma: f32) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| mean + sigma * next_gaussian(&mut rng)).collect()
}

/// Add deterministic Gaussian noise to a value slice.
pub fn add_gaussian_noise(values: &mut [f32], sigma: f32, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    for v in values.iter_mut() {
        *v += sigma * next_gaussian(&mut rng);
    }
}

/// Builder for small synthetic cubes with noise and injected sources.
#[derive(Debug, Clone)]
pub struct SyntheticCube {
    values: Buffer3<f32>,
    mask: Option<Buffer3<bool>>,
}

impl SyntheticCube {
    pub fn new(width: usize, height: usize, depth: usize) -> Self {
        Self {
            values: Buffer3::new_filled(width, height, depth, 0.0),
            mask: None,
        }
    }

    pub fn noise(mut self, sigma: f32, seed: u64) -> Self {
        add_gaussian_noise(&mut self.values, sigma, seed);
        self
    }

    /// Add `flux` to a single voxel.
    pub fn voxel(mut self, x: usize, y: usize, z: usize, flux: f32) -> Self {
        self.values[(x, y, z)] += flux;
        self
    }

    /// Add `flux` to every voxel of an inclusive box.
    pub fn block(
        mut self,
        (x0, x1): (usize, usize),
        (y0, y1): (usize, usize),
        (z0, z1): (usize, usize),
        flux: f32,
    ) -> Self {
        for z in z0..=z1 {
            for y in y0..=y1 {
                for x in x0..=x1 {
                    self.values[(x, y, z)] += flux;
                }
            }
        }
        self
    }

    /// Add a separable Gaussian source centred on (cx, cy, cz).
    pub fn gaussian_source(
        mut self,
        (cx, cy, cz): (f32, f32, f32),
        peak: f32,
        sigma_xy: f32,
        sigma_z: f32,
    ) -> Self {
        let (w, h, d) = (
            self.values.width(),
            self.values.height(),
            self.values.depth(),
        );
        for z in 0..d {
            let dz = (z as f32 - cz) / sigma_z;
            for y in 0..h {
                let dy = (y as f32 - cy) / sigma_xy;
                for x in 0..w {
                    let dx = (x as f32 - cx) / sigma_xy;
                    self.values[(x, y, z)] += peak * (-0.5 * (dx * dx + dy * dy + dz * dz)).exp();
                }
            }
        }
        self
    }

    /// Mark a voxel invalid.
    pub fn blank(mut self, x: usize, y: usize, z: usize) -> Self {
        let (w, h, d) = (
            self.values.width(),
            self.values.height(),
            self.values.depth(),
        );
        let mask = self
            .mask
            .get_or_insert_with(|| Buffer3::new_filled(w, h, d, true));
        mask[(x, y, z)] = false;
        self
    }

    pub fn build(self) -> FluxCube {
        match self.mask {
            Some(mask) => FluxCube::with_mask(self.values, mask),
            None => FluxCube::new(self.values),
        }
    }
}
