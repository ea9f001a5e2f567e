//! Per-channel connected component search.
//!
//! Each channel image is scanned row by row. Runs of detected pixels are
//! labeled against the previous row under 8-connectivity, then every component
//! becomes an [`Object2D`].

use rayon::prelude::*;

use crate::cube::FluxCube;
use crate::region::{Object2D, Scan};
use crate::search::union_find::UnionFind;
use crate::stats::StatsContainer;

// ============================================================================
// Run-Length Encoding
// ============================================================================

/// A horizontal run of detected pixels.
#[derive(Debug, Clone, Copy)]
pub(super) struct Run {
    start: usize, // Starting x coordinate (inclusive)
    end: usize,   // Ending x coordinate (exclusive)
    label: u32,
}

impl Run {
    /// Columns of the previous row that can connect to this run.
    #[inline]
    fn search_window(&self) -> (usize, usize) {
        (self.start.saturating_sub(1), self.end + 1)
    }
}

/// Check if two runs from adjacent rows are 8-connected.
#[inline]
fn runs_connected(prev: &Run, curr: &Run) -> bool {
    prev.start < curr.end + 1 && prev.end + 1 > curr.start
}

/// Append the runs of detected voxels in one row.
pub(super) fn extract_runs_from_row(
    flux: &[f32],
    valid: &[bool],
    stats: &StatsContainer,
    runs: &mut Vec<Run>,
) {
    let mut run_start = None;
    for (x, (&value, &ok)) in flux.iter().zip(valid).enumerate() {
        let hit = ok && stats.is_detection(value);
        match (hit, run_start) {
            (true, None) => run_start = Some(x),
            (false, Some(start)) => {
                runs.push(Run {
                    start,
                    end: x,
                    label: 0,
                });
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = run_start {
        runs.push(Run {
            start,
            end: flux.len(),
            label: 0,
        });
    }
}

/// Merge current row's runs with previous row's runs via union-find.
///
/// For each run in `curr_runs`, finds connected runs in `prev_runs` and merges
/// their labels. Runs without a neighbour get a new label.
fn merge_runs_with_prev(curr_runs: &mut [Run], prev_runs: &[Run], uf: &mut UnionFind) {
    let mut prev_idx = 0;
    for run in curr_runs.iter_mut() {
        let (search_start, search_end) = run.search_window();

        while prev_idx < prev_runs.len() && prev_runs[prev_idx].end <= search_start {
            prev_idx += 1;
        }

        let mut assigned_label = None;
        let mut check_idx = prev_idx;
        while check_idx < prev_runs.len() && prev_runs[check_idx].start < search_end {
            let prev_run = &prev_runs[check_idx];
            if runs_connected(prev_run, run) {
                match assigned_label {
                    Some(label) if label != prev_run.label => uf.union(label, prev_run.label),
                    None => assigned_label = Some(prev_run.label),
                    _ => {}
                }
            }
            check_idx += 1;
        }

        run.label = assigned_label.unwrap_or_else(|| uf.make_set());
    }
}

// ============================================================================
// Channel labeling
// ============================================================================

/// Connected components of one channel, in raster order of their first pixel.
pub fn label_channel(cube: &FluxCube, stats: &StatsContainer, z: usize) -> Vec<Object2D> {
    let width = cube.width();
    let flux = cube.flux().plane(z);
    let valid = cube.mask().plane(z);

    let mut uf = UnionFind::new();
    let mut labeled: Vec<(usize, Run)> = Vec::new();
    let mut prev_runs: Vec<Run> = Vec::with_capacity(width / 4);
    let mut curr_runs: Vec<Run> = Vec::with_capacity(width / 4);

    for y in 0..cube.height() {
        curr_runs.clear();
        let row = y * width..(y + 1) * width;
        extract_runs_from_row(&flux[row.clone()], &valid[row], stats, &mut curr_runs);

        if curr_runs.is_empty() {
            prev_runs.clear();
            continue;
        }

        merge_runs_with_prev(&mut curr_runs, &prev_runs, &mut uf);
        labeled.extend(curr_runs.iter().map(|&run| (y, run)));
        std::mem::swap(&mut prev_runs, &mut curr_runs);
    }

    let (components, count) = uf.flatten();
    let mut objects = vec![Object2D::new(); count];
    for (y, run) in labeled {
        let component = components[(run.label - 1) as usize];
        objects[component].add_scan(Scan::new(
            y as i64,
            run.start as i64,
            (run.end - run.start) as i64,
        ));
    }
    objects
}

/// Label every channel in parallel. Output is ordered by channel.
pub fn label_channels(cube: &FluxCube, stats: &StatsContainer) -> Vec<(i64, Vec<Object2D>)> {
    (0..cube.depth())
        .into_par_iter()
        .map(|z| (z as i64, label_channel(cube, stats, z)))
        .collect()
}
