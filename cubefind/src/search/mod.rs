//! Raw detection search over a thresholded cube.
//!
//! - [`search_spatial`]: connected components in each channel image.
//! - [`search_spectral`]: runs of detected channels in each spectrum.
//!
//! Both return raw detections in a deterministic order, ready for merging.

pub mod spatial;
pub mod spectral;
pub(crate) mod union_find;

use rayon::prelude::*;

use crate::config::SearchType;
use crate::cube::FluxCube;
use crate::detection::Detection;
use crate::error::RegionError;
use crate::region::{Object3D, Scan};
use crate::stats::StatsContainer;

/// Raw detections grouped by the unit they were found in.
///
/// Spatial search yields one group per channel, spectral search one per
/// spatial pixel. Two-stage merging merges within each group first.
#[derive(Debug, Default)]
pub struct RawDetections {
    pub groups: Vec<Vec<Detection>>,
}

impl RawDetections {
    pub fn len(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(Vec::is_empty)
    }

    pub fn into_flat(self) -> Vec<Detection> {
        self.groups.into_iter().flatten().collect()
    }
}

/// Run the configured search.
pub fn search(
    cube: &FluxCube,
    stats: &StatsContainer,
    search_type: SearchType,
) -> Result<RawDetections, RegionError> {
    match search_type {
        SearchType::Spatial => search_spatial(cube, stats),
        SearchType::Spectral => Ok(search_spectral(cube, stats)),
    }
}

/// One raw detection per connected component of each channel image.
pub fn search_spatial(
    cube: &FluxCube,
    stats: &StatsContainer,
) -> Result<RawDetections, RegionError> {
    let mut groups = Vec::with_capacity(cube.depth());
    for (z, objects) in spatial::label_channels(cube, stats) {
        let group = objects
            .into_iter()
            .map(|obj| Detection::from_channel(z, obj))
            .collect::<Result<Vec<_>, _>>()?;
        groups.push(group);
    }
    let raw = RawDetections { groups };
    tracing::debug!(raw_detections = raw.len(), "Spatial search");
    Ok(raw)
}

/// One raw detection per run of consecutive detected channels.
pub fn search_spectral(cube: &FluxCube, stats: &StatsContainer) -> RawDetections {
    let mut groups: Vec<Vec<Detection>> = Vec::new();
    let mut current: Option<(i64, i64)> = None;
    for run in spectral::find_spectral_runs(cube, stats) {
        let mut object = Object3D::new();
        for z in run.z_start..run.z_end {
            object.add_scan(Scan::pixel(run.x, run.y), z);
        }
        let det = Detection::from_object(object);

        match groups.last_mut() {
            Some(group) if current == Some((run.x, run.y)) => group.push(det),
            _ => {
                groups.push(vec![det]);
                current = Some((run.x, run.y));
            }
        }
    }
    let raw = RawDetections { groups };
    tracing::debug!(raw_detections = raw.len(), "Spectral search");
    raw
}

/// Number of valid voxels passing the detection test.
pub fn count_detected_voxels(cube: &FluxCube, stats: &StatsContainer) -> usize {
    cube.flux()
        .values()
        .par_iter()
        .zip(cube.mask().values().par_iter())
        .filter(|&(&v, &ok)| ok && stats.is_detection(v))
        .count()
}
