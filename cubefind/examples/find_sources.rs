//! Example: Find sources in a synthetic spectral cube
//!
//! Builds a 64x64x48 cube of Gaussian noise with a few injected sources, runs
//! the source finder and prints a catalogue. An optional YAML or JSON parameter
//! file overrides the default configuration; missing keys keep their defaults.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example find_sources
//! cargo run --example find_sources -- params.yaml
//! ```

use std::time::Instant;

use common::log_setup::{LogConfig, setup_logging};
use cubefind::{Buffer3, Config, CubeFinder, FluxCube};
use rand::prelude::*;

const WIDTH: usize = 64;
const HEIGHT: usize = 64;
const DEPTH: usize = 48;

/// Injected sources: centre (x, y, z), peak, spatial sigma, spectral sigma.
const SOURCES: [((f32, f32, f32), f32, f32, f32); 4] = [
    ((12.0, 14.0, 10.0), 8.0, 1.5, 3.0),
    ((40.0, 20.0, 24.0), 6.0, 2.0, 4.0),
    ((30.0, 48.0, 30.0), 10.0, 1.2, 2.0),
    ((52.0, 52.0, 8.0), 5.0, 2.5, 5.0),
];

fn main() {
    setup_logging(&LogConfig {
        file_prefix: "find_sources".to_string(),
        ..LogConfig::default()
    })
    .unwrap_or_else(|e| panic!("Logging setup failed: {}", e));

    let config = match std::env::args().nth(1) {
        Some(path) => load_config(&path),
        None => Config::robust_fdr(),
    };

    let cube = synthetic_cube(42);
    tracing::info!(
        width = WIDTH,
        height = HEIGHT,
        depth = DEPTH,
        sources = SOURCES.len(),
        "Synthetic cube ready"
    );

    let start = Instant::now();
    let result = CubeFinder::new(config)
        .find(&cube)
        .unwrap_or_else(|e| panic!("Source finding failed: {}", e));
    let elapsed = start.elapsed();

    let stats = &result.stats;
    println!(
        "Noise: middle = {:.3}, spread = {:.3}, threshold = {:.3} ({:.2} sigma)",
        stats.middle(),
        stats.spread(),
        stats.threshold(),
        stats.threshold_snr()
    );
    println!("{:#?}", result.diagnostics);
    println!(
        "{:>4} {:>8} {:>8} {:>8} {:>6} {:>6} {:>10} {:>8}",
        "id", "x", "y", "z", "nvox", "nchan", "flux", "peak"
    );
    for det in &result.detections {
        let (x, y, z) = det.weighted_centroid().unwrap_or_default();
        println!(
            "{:>4} {:>8.2} {:>8.2} {:>8.2} {:>6} {:>6} {:>10.2} {:>8.2}",
            det.id(),
            x,
            y,
            z,
            det.num_voxels(),
            det.num_channels(),
            det.total_flux().unwrap_or_default(),
            det.peak_flux().unwrap_or_default()
        );
    }
    tracing::info!(
        detections = result.detections.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "Done"
    );
}

fn load_config(path: &str) -> Config {
    let config: Config = common::load_from_file(path)
        .unwrap_or_else(|e| panic!("Failed to load parameters: {}", e));
    tracing::info!(path, "Loaded parameters");
    config
}

fn synthetic_cube(seed: u64) -> FluxCube {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut values: Vec<f32> = (0..WIDTH * HEIGHT * DEPTH)
        .map(|_| gaussian(&mut rng))
        .collect();

    for &((cx, cy, cz), peak, sigma_xy, sigma_z) in &SOURCES {
        for z in 0..DEPTH {
            let dz = (z as f32 - cz) / sigma_z;
            for y in 0..HEIGHT {
                let dy = (y as f32 - cy) / sigma_xy;
                for x in 0..WIDTH {
                    let dx = (x as f32 - cx) / sigma_xy;
                    let idx = (z * HEIGHT + y) * WIDTH + x;
                    values[idx] += peak * (-0.5 * (dx * dx + dy * dy + dz * dz)).exp();
                }
            }
        }
    }

    FluxCube::new(Buffer3::new(WIDTH, HEIGHT, DEPTH, values))
}

/// Box-Muller standard normal sample.
fn gaussian(rng: &mut StdRng) -> f32 {
    let u1: f32 = rng.random_range(f32::EPSILON..1.0);
    let u2: f32 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (std::f32::consts::TAU * u2).cos()
}
