//! Growth of detections down to a secondary threshold.
//!
//! Starting from every voxel of a detection, valid neighbours strictly brighter
//! than the growth threshold are added breadth-first. Neighbours are the 8 surrounding
//! pixels in the same channel plus the same pixel in the adjacent channels.
//! A voxel is claimed by at most one detection; claims are tracked in a sparse
//! set, never a dense volume.

use std::collections::{HashSet, VecDeque};

use crate::cube::FluxCube;
use crate::detection::Detection;

type VoxelKey = (i64, i64, i64);

const NEIGHBOUR_OFFSETS: [VoxelKey; 10] = [
    (-1, -1, 0),
    (0, -1, 0),
    (1, -1, 0),
    (-1, 0, 0),
    (1, 0, 0),
    (-1, 1, 0),
    (0, 1, 0),
    (1, 1, 0),
    (0, 0, -1),
    (0, 0, 1),
];

/// Grow every detection in place. Returns the number of voxels added.
///
/// Detections are grown in list order; an earlier detection wins a voxel both
/// could reach.
pub fn grow_detections(
    detections: &mut [Detection],
    cube: &FluxCube,
    growth_threshold: f32,
) -> usize {
    let mut claimed: HashSet<VoxelKey> = detections
        .iter()
        .flat_map(|det| det.object().voxels())
        .collect();

    let mut added = 0;
    for det in detections.iter_mut() {
        added += grow_detection(det, cube, growth_threshold, &mut claimed);
    }

    tracing::debug!(
        detections = detections.len(),
        added_voxels = added,
        growth_threshold,
        "Grew detections"
    );
    added
}

fn grow_detection(
    det: &mut Detection,
    cube: &FluxCube,
    growth_threshold: f32,
    claimed: &mut HashSet<VoxelKey>,
) -> usize {
    let mut queue: VecDeque<VoxelKey> = det.object().voxels().collect();
    let mut grown: Vec<VoxelKey> = Vec::new();

    while let Some((x, y, z)) = queue.pop_front() {
        for (dx, dy, dz) in NEIGHBOUR_OFFSETS {
            let next = (x + dx, y + dy, z + dz);
            if claimed.contains(&next) {
                continue;
            }
            let bright = cube
                .valid_value_at(next.0, next.1, next.2)
                .is_some_and(|v| v > growth_threshold);
            if bright {
                claimed.insert(next);
                grown.push(next);
                queue.push_back(next);
            }
        }
    }

    for &(x, y, z) in &grown {
        det.add_pixel(x, y, z);
    }
    grown.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SyntheticCube;

    fn seed(x: i64, y: i64, z: i64) -> Detection {
        let mut det = Detection::new();
        det.add_pixel(x, y, z);
        det
    }

    #[test]
    fn test_grows_through_connected_faint_voxels() {
        let cube = SyntheticCube::new(8, 8, 4)
            .block((2, 4), (2, 2), (1, 1), 2.0)
            .voxel(3, 2, 2, 2.0)
            .voxel(6, 6, 1, 2.0)
            .build();
        let mut detections = vec![seed(2, 2, 1)];
        let added = grow_detections(&mut detections, &cube, 1.0);

        assert_eq!(added, 3);
        let det = &detections[0];
        assert_eq!(det.num_voxels(), 4);
        assert!(det.object().is_in_object(4, 2, 1));
        assert!(det.object().is_in_object(3, 2, 2));
        assert!(!det.object().is_in_object(6, 6, 1));
        assert!(det.is_stale());
    }

    #[test]
    fn test_diagonal_channel_step_is_not_a_neighbour() {
        let cube = SyntheticCube::new(4, 4, 4).voxel(2, 2, 2, 5.0).build();
        let mut detections = vec![seed(1, 1, 1)];
        assert_eq!(grow_detections(&mut detections, &cube, 1.0), 0);
    }

    #[test]
    fn test_earlier_detection_claims_shared_voxels() {
        let cube = SyntheticCube::new(6, 1, 1)
            .block((0, 5), (0, 0), (0, 0), 2.0)
            .build();
        let mut detections = vec![seed(0, 0, 0), seed(5, 0, 0)];
        grow_detections(&mut detections, &cube, 1.0);

        assert_eq!(detections[0].num_voxels(), 5);
        assert_eq!(detections[1].num_voxels(), 1);
        let total: usize = detections.iter().map(Detection::num_voxels).sum();
        assert_eq!(total, 6);
    }

    #[test]
    fn test_masked_and_outside_voxels_are_skipped() {
        let cube = SyntheticCube::new(3, 1, 1)
            .block((0, 2), (0, 0), (0, 0), 2.0)
            .blank(1, 0, 0)
            .build();
        let mut detections = vec![seed(0, 0, 0)];
        assert_eq!(grow_detections(&mut detections, &cube, 1.0), 0);
    }

    #[test]
    fn test_voxel_at_growth_threshold_is_not_added() {
        let cube = SyntheticCube::new(3, 1, 1)
            .voxel(1, 0, 0, 1.0)
            .voxel(2, 0, 0, 1.5)
            .build();
        let mut detections = vec![seed(0, 0, 0)];
        assert_eq!(grow_detections(&mut detections, &cube, 1.0), 0);

        let mut detections = vec![seed(0, 0, 0)];
        assert_eq!(grow_detections(&mut detections, &cube, 0.5), 2);
    }
}
