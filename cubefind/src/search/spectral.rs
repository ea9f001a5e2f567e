//! Per-spectrum search: runs of consecutive detected channels at one pixel.

use rayon::prelude::*;

use crate::cube::FluxCube;
use crate::stats::StatsContainer;

/// A run of detected channels `z_start..z_end` at pixel (x, y).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpectralRun {
    pub x: i64,
    pub y: i64,
    pub z_start: i64,
    pub z_end: i64,
}

/// Every spectral run in the cube, ordered by (y, x, z_start).
pub fn find_spectral_runs(cube: &FluxCube, stats: &StatsContainer) -> Vec<SpectralRun> {
    let (width, depth) = (cube.width(), cube.depth());
    (0..cube.height())
        .into_par_iter()
        .flat_map_iter(|y| {
            let mut runs = Vec::new();
            for x in 0..width {
                let mut start = None;
                for z in 0..depth {
                    let hit = cube.value(x, y, z).is_some_and(|v| stats.is_detection(v));
                    match (hit, start) {
                        (true, None) => start = Some(z),
                        (false, Some(s)) => {
                            runs.push(run_at(x, y, s, z));
                            start = None;
                        }
                        _ => {}
                    }
                }
                if let Some(s) = start {
                    runs.push(run_at(x, y, s, depth));
                }
            }
            runs
        })
        .collect()
}

fn run_at(x: usize, y: usize, z_start: usize, z_end: usize) -> SpectralRun {
    SpectralRun {
        x: x as i64,
        y: y as i64,
        z_start: z_start as i64,
        z_end: z_end as i64,
    }
}
