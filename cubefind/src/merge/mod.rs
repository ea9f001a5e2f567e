//! Merging of fragmentary detections.
//!
//! Each pair goes through a cheap bounding-box test ([`is_near`]) and, only if
//! that passes, a channel-by-channel pixel test ([`is_close`]). Pairs passing
//! both form the edges of a graph whose connected components are unioned into
//! single detections.
//!
//! Pair evaluation is parallel. The union step is a sequential union-find over
//! detection indices, so the result does not depend on thread scheduling or on
//! the order in which edges are found.


use rayon::prelude::*;

use crate::config::Config;
use crate::detection::Detection;
use crate::region::object2d::spatial_gap;
use crate::search::union_find::UnionFind;

/// Adjacency tolerances used by the merge tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeParams {
    /// Only merge objects whose pixels are 8-connected.
    pub flag_adjacent: bool,
    /// Maximum pixel separation when `flag_adjacent` is false.
    pub thresh_spatial: f32,
    /// Maximum channel separation.
    pub thresh_velocity: f32,
}

impl MergeParams {
    pub fn from_config(config: &Config) -> Self {
        Self {
            flag_adjacent: config.flag_adjacent,
            thresh_spatial: config.thresh_spatial,
            thresh_velocity: config.thresh_velocity,
        }
    }

    /// Bounding-box tolerance on x and y.
    #[inline]
    pub fn spatial_gap(&self) -> i64 {
        spatial_gap(self.thresh_spatial, self.flag_adjacent)
    }

    /// Bounding-box tolerance on z.
    #[inline]
    pub fn velocity_gap(&self) -> i64 {
        self.thresh_velocity.ceil() as i64
    }

    /// Largest integer channel separation that still counts as close.
    #[inline]
    fn channel_tolerance(&self) -> i64 {
        self.thresh_velocity.floor() as i64
    }
}

// ============================================================================
// Pair tests
// ============================================================================

/// Bounding boxes within the spatial and velocity gaps.
pub fn is_near(a: &Detection, b: &Detection, params: &MergeParams) -> bool {
    let (Some(a_z_min), Some(a_z_max), Some(b_z_min), Some(b_z_max)) =
        (a.z_min(), a.z_max(), b.z_min(), b.z_max())
    else {
        return false;
    };
    let z_gap = (b_z_min - a_z_max).max(a_z_min - b_z_max);
    z_gap <= params.velocity_gap() && a.bbox().within_gap(&b.bbox(), params.spatial_gap())
}

/// Some pair of channel maps within the velocity threshold passes the 2-D test.
pub fn is_close(a: &Detection, b: &Detection, params: &MergeParams) -> bool {
    let tolerance = params.channel_tolerance();
    a.object().channels().any(|(za, obj_a)| {
        b.object().channels_near(za, tolerance).any(|(_, obj_b)| {
            obj_a.can_merge(obj_b, params.thresh_spatial, params.flag_adjacent)
        })
    })
}

/// [`is_near`] followed by [`is_close`]. Symmetric.
pub fn can_merge(a: &Detection, b: &Detection, params: &MergeParams) -> bool {
    is_near(a, b, params) && is_close(a, b, params)
}

// ============================================================================
// Merging
// ============================================================================

/// Index pairs `(i, j)`, `i < j`, that can merge.
///
/// Candidates are swept in order of first channel, so pairs whose channel
/// ranges are too far apart are never visited.
pub fn find_merge_pairs(detections: &[Detection], params: &MergeParams) -> Vec<(usize, usize)> {
    let z_gap = params.velocity_gap();
    let mut order: Vec<(i64, i64, usize)> = detections
        .iter()
        .enumerate()
        .filter_map(|(i, det)| Some((det.z_min()?, det.z_max()?, i)))
        .collect();
    order.sort_unstable();

    let mut pairs: Vec<(usize, usize)> = order
        .par_iter()
        .enumerate()
        .flat_map_iter(|(k, &(_, z_max, i))| {
            order[k + 1..]
                .iter()
                .take_while(move |&&(z_min, _, _)| z_min - z_max <= z_gap)
                .filter(move |&&(_, _, j)| can_merge(&detections[i], &detections[j], params))
                .map(move |&(_, _, j)| (i.min(j), i.max(j)))
        })
        .collect();
    pairs.sort_unstable();
    pairs
}

/// Union connected components of the `can_merge` graph in a single pass.
///
/// Each component keeps the position of its lowest-index member and absorbs
/// the others in ascending index order. Returns the merged list and whether
/// anything was merged.
pub fn merge_pass(detections: Vec<Detection>, params: &MergeParams) -> (Vec<Detection>, bool) {
    let pairs = find_merge_pairs(&detections, params);
    if pairs.is_empty() {
        return (detections, false);
    }

    let mut uf = UnionFind::with_sets(detections.len());
    for &(i, j) in &pairs {
        uf.union(i as u32 + 1, j as u32 + 1);
    }
    let (components, count) = uf.flatten();

    let mut merged: Vec<Option<Detection>> = (0..count).map(|_| None).collect();
    for (det, component) in detections.into_iter().zip(components) {
        if let Some(target) = &mut merged[component] {
            target.add_detection(&det);
        } else {
            merged[component] = Some(det);
        }
    }
    (merged.into_iter().flatten().collect(), true)
}

/// Merge until no pair of detections can merge.
pub fn merge_detections(mut detections: Vec<Detection>, params: &MergeParams) -> Vec<Detection> {
    let before = detections.len();
    let mut passes = 0;
    loop {
        let (next, changed) = merge_pass(detections, params);
        detections = next;
        passes += 1;
        if !changed {
            break;
        }
    }
    tracing::debug!(before, after = detections.len(), passes, "Merged detections");
    detections
}

/// Merge within each group first, then across all groups.
pub fn merge_two_stage(groups: Vec<Vec<Detection>>, params: &MergeParams) -> Vec<Detection> {
    let local: Vec<Detection> = groups
        .into_par_iter()
        .flat_map_iter(|group| merge_detections(group, params))
        .collect();
    merge_detections(local, params)
}
