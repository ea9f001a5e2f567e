use std::collections::BTreeSet;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use rand::prelude::*;

use super::*;

fn assert_aggregates_match_recompute(obj: &Object2D) {
    let mut recomputed = obj.clone();
    recomputed.calc_params();
    assert_eq!(obj.num_pix(), recomputed.num_pix(), "num_pix");
    assert_eq!(obj.x_sum(), recomputed.x_sum(), "x_sum");
    assert_eq!(obj.y_sum(), recomputed.y_sum(), "y_sum");
    assert_eq!(obj.bbox(), recomputed.bbox(), "bbox");
}

fn assert_no_touching_scans(obj: &Object2D) {
    let scans = obj.scans();
    for i in 0..scans.len() {
        for j in (i + 1)..scans.len() {
            assert!(
                !scans[i].touches(&scans[j]),
                "scans {:?} and {:?} touch",
                scans[i],
                scans[j]
            );
        }
    }
}

fn pixel_set(obj: &Object2D) -> BTreeSet<(i64, i64)> {
    obj.pixels().collect()
}

// ---------------------------------------------------------------------------
// Insertion
// ---------------------------------------------------------------------------

#[test]
fn test_add_pixel_grows_existing_scan() {
    let mut obj = Object2D::new();
    obj.add_pixel(5, 2);
    obj.add_pixel(6, 2);
    obj.add_pixel(4, 2);
    assert_eq!(obj.scans(), &[Scan::new(2, 4, 3)]);
    assert_eq!(obj.num_pix(), 3);
    assert_eq!(obj.x_sum(), 15);
    assert_eq!(obj.y_sum(), 6);
    assert_eq!(obj.bbox(), Aabb::new(4, 6, 2, 2));
}

#[test]
fn test_add_pixel_bridges_two_scans() {
    let mut obj = Object2D::new();
    obj.add_scan(Scan::new(0, 0, 3));
    obj.add_scan(Scan::new(0, 4, 3));
    assert_eq!(obj.num_scans(), 2);

    obj.add_pixel(3, 0);
    assert_eq!(obj.scans(), &[Scan::new(0, 0, 7)]);
    assert_eq!(obj.num_pix(), 7);
    assert_aggregates_match_recompute(&obj);
}

#[test]
fn test_add_pixel_duplicate_is_noop() {
    let mut obj = Object2D::new();
    obj.add_scan(Scan::new(1, 1, 4));
    obj.add_pixel(2, 1);
    assert_eq!(obj.num_pix(), 4);
    assert_eq!(obj.x_sum(), 1 + 2 + 3 + 4);
}

#[test]
fn test_add_scan_subtracts_overlap() {
    let mut obj = Object2D::new();
    obj.add_scan(Scan::new(3, 0, 4)); // 0..=3
    obj.add_scan(Scan::new(3, 2, 4)); // 2..=5, overlaps 2..=3
    assert_eq!(obj.scans(), &[Scan::new(3, 0, 6)]);
    assert_eq!(obj.num_pix(), 6);
    assert_eq!(obj.x_sum(), 15);
    assert_eq!(obj.y_sum(), 18);
}

#[test]
fn test_add_scan_bridges_several_scans() {
    let mut obj = Object2D::new();
    obj.add_scan(Scan::new(0, 0, 2)); // 0..=1
    obj.add_scan(Scan::new(0, 4, 2)); // 4..=5
    obj.add_scan(Scan::new(0, 8, 2)); // 8..=9
    obj.add_scan(Scan::new(1, 0, 10)); // other row untouched
    obj.add_scan(Scan::new(0, 1, 8)); // 1..=8 bridges all three
    assert_eq!(obj.num_scans(), 2);
    assert!(obj.scans().contains(&Scan::new(0, 0, 10)));
    assert_eq!(obj.num_pix(), 20);
    assert_aggregates_match_recompute(&obj);
}

#[test]
fn test_random_insertions_match_recompute() {
    let mut rng = StdRng::seed_from_u64(0xC0BE);
    for _ in 0..50 {
        let mut obj = Object2D::new();
        let mut expected = BTreeSet::new();
        for _ in 0..60 {
            let y = rng.random_range(0..6);
            let x = rng.random_range(0..20);
            if rng.random_bool(0.5) {
                obj.add_pixel(x, y);
                expected.insert((x, y));
            } else {
                let len = rng.random_range(1..6);
                obj.add_scan(Scan::new(y, x, len));
                expected.extend((x..x + len).map(|xx| (xx, y)));
            }
            assert_aggregates_match_recompute(&obj);
            assert_no_touching_scans(&obj);
        }
        assert_eq!(pixel_set(&obj), expected);
        assert_eq!(obj.num_pix(), expected.len());
    }
}

// ---------------------------------------------------------------------------
// Cleanup
// ---------------------------------------------------------------------------

#[test]
fn test_cleanup_merges_overlapping_scans() {
    let mut obj = Object2D::from_scans(vec![
        Scan::new(0, 0, 4),
        Scan::new(0, 2, 4),
        Scan::new(0, 3, 1),
        Scan::new(2, 0, 1),
    ]);
    // Double counted before cleanup
    assert_eq!(obj.num_pix(), 10);

    obj.cleanup();
    assert_eq!(obj.num_scans(), 2);
    assert_eq!(obj.num_pix(), 7);
    assert_eq!(pixel_set(&obj).len(), 7);
}

#[test]
fn test_cleanup_keeps_touching_scans_separate() {
    let mut obj = Object2D::from_scans(vec![Scan::new(0, 0, 2), Scan::new(0, 2, 2)]);
    obj.cleanup();
    assert_eq!(obj.num_scans(), 2);
    assert_eq!(obj.num_pix(), 4);
}

#[test]
fn test_cleanup_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(17);
    let scans: Vec<Scan> = (0..40)
        .map(|_| {
            Scan::new(
                rng.random_range(0..5),
                rng.random_range(0..30),
                rng.random_range(1..8),
            )
        })
        .collect();
    let mut obj = Object2D::from_scans(scans);
    obj.cleanup();
    let once: Vec<Scan> = obj.scans().to_vec();
    let once_pix = obj.num_pix();

    obj.cleanup();
    assert_eq!(obj.scans(), once.as_slice());
    assert_eq!(obj.num_pix(), once_pix);
}

// ---------------------------------------------------------------------------
// Offsets and auxiliary predicates
// ---------------------------------------------------------------------------

#[test]
fn test_add_offsets_translates_everything() {
    let mut obj = Object2D::new();
    obj.add_scan(Scan::new(1, 2, 3));
    obj.add_pixel(3, 2);
    obj.add_offsets(10, 20);

    assert!(obj.is_in_object(12, 21));
    assert!(obj.is_in_object(13, 22));
    assert!(!obj.is_in_object(2, 1));
    assert_eq!(obj.bbox(), Aabb::new(12, 14, 21, 22));
    assert_aggregates_match_recompute(&obj);
}

#[test]
fn test_distinct_rows_and_columns() {
    let mut obj = Object2D::new();
    obj.add_scan(Scan::new(0, 0, 3));
    obj.add_scan(Scan::new(1, 2, 3));
    obj.add_pixel(9, 5);
    assert_eq!(obj.num_distinct_y(), 3);
    assert_eq!(obj.num_distinct_x(), 6); // 0,1,2,3,4,9
}

#[test]
fn test_scan_overlaps() {
    let mut a = Object2D::new();
    a.add_scan(Scan::new(0, 0, 3));
    let mut b = Object2D::new();
    b.add_scan(Scan::new(0, 3, 3));
    assert!(!a.scan_overlaps(&b));
    b.add_pixel(2, 0);
    assert!(a.scan_overlaps(&b));
}

#[test]
fn test_centroid() {
    let mut obj = Object2D::new();
    assert!(obj.centroid().is_none());
    obj.add_scan(Scan::new(2, 0, 5));
    assert_eq!(obj.centroid(), Some((2.0, 2.0)));
}

// ---------------------------------------------------------------------------
// Proximity
// ---------------------------------------------------------------------------

fn single_pixel(x: i64, y: i64) -> Object2D {
    let mut obj = Object2D::new();
    obj.add_pixel(x, y);
    obj
}

#[test]
fn test_can_merge_adjacent_only() {
    let a = single_pixel(0, 0);
    assert!(a.can_merge(&single_pixel(1, 1), 3.0, true));
    assert!(!a.can_merge(&single_pixel(2, 0), 3.0, true));
}

#[test]
fn test_can_merge_spatial_threshold() {
    let a = single_pixel(0, 0);
    assert!(a.can_merge(&single_pixel(3, 0), 3.0, false));
    assert!(!a.can_merge(&single_pixel(4, 0), 3.0, false));
    // Box gap passes (ceil(3) = 3 per axis) but Euclidean distance is 4.24
    assert!(a.is_near(&single_pixel(3, 3), 3));
    assert!(!a.can_merge(&single_pixel(3, 3), 3.0, false));
}

#[test]
fn test_can_merge_is_symmetric() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..200 {
        let mut a = Object2D::new();
        let mut b = Object2D::new();
        for _ in 0..4 {
            a.add_scan(Scan::new(
                rng.random_range(0..10),
                rng.random_range(0..10),
                rng.random_range(1..4),
            ));
            b.add_scan(Scan::new(
                rng.random_range(0..10),
                rng.random_range(5..20),
                rng.random_range(1..4),
            ));
        }
        let thresh = rng.random_range(0.5f32..4.0);
        for adjacent in [true, false] {
            assert_eq!(
                a.can_merge(&b, thresh, adjacent),
                b.can_merge(&a, thresh, adjacent)
            );
        }
    }
}

#[test]
fn test_empty_objects_never_merge() {
    let a = Object2D::new();
    assert!(!a.can_merge(&single_pixel(0, 0), 10.0, false));
}

// ---------------------------------------------------------------------------
// Shape
// ---------------------------------------------------------------------------

#[test]
fn test_position_angle_horizontal_and_vertical() {
    let mut horizontal = Object2D::new();
    horizontal.add_scan(Scan::new(0, 0, 5));
    assert!(horizontal.position_angle().unwrap().abs() < 1e-12);

    let mut vertical = Object2D::new();
    for y in 0..5 {
        vertical.add_pixel(3, y);
    }
    assert!((vertical.position_angle().unwrap() - FRAC_PI_2).abs() < 1e-12);
}

#[test]
fn test_position_angle_diagonal() {
    let mut diagonal = Object2D::new();
    for i in 0..4 {
        diagonal.add_pixel(i, i);
    }
    assert!((diagonal.position_angle().unwrap() - FRAC_PI_4).abs() < 1e-12);

    let mut anti = Object2D::new();
    for i in 0..4 {
        anti.add_pixel(i, -i);
    }
    assert!((anti.position_angle().unwrap() + FRAC_PI_4).abs() < 1e-12);
}

#[test]
fn test_principal_axes() {
    let mut line = Object2D::new();
    line.add_scan(Scan::new(0, 0, 5));
    let (major, minor) = line.principal_axes().unwrap();
    assert!((major - 5.0).abs() < 1e-9);
    assert!((minor - 1.0).abs() < 1e-9);

    let (major, minor) = single_pixel(7, 7).principal_axes().unwrap();
    assert!((major - 1.0).abs() < 1e-9);
    assert!((minor - 1.0).abs() < 1e-9);

    assert!(Object2D::new().principal_axes().is_none());
}
