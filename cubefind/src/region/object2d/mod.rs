//! Sparse 2-D region built from coalescing row scans.
//!
//! Pixel count, coordinate sums and bounding box are maintained incrementally on
//! every insertion. [`Object2D::calc_params`] recomputes them from scratch and is
//! only needed after bulk construction via [`Object2D::from_scans`].

#[cfg(test)]
mod tests;

use std::collections::BTreeSet;
use std::f64::consts::FRAC_PI_2;

use crate::math::Aabb;
use crate::region::scan::Scan;

/// A spatial region of significant pixels.
#[derive(Debug, Clone, Default)]
pub struct Object2D {
    scans: Vec<Scan>,
    num_pix: usize,
    x_sum: i64,
    y_sum: i64,
    bbox: Aabb,
}

/// Sum of the integers in `[start, end]`.
#[inline]
fn column_sum(start: i64, end: i64) -> i64 {
    (start + end) * (end - start + 1) / 2
}

impl Object2D {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw scans without coalescing, then recompute aggregates.
    ///
    /// Overlapping scans are counted twice until [`Object2D::cleanup`] runs.
    pub fn from_scans(scans: Vec<Scan>) -> Self {
        let mut obj = Self {
            scans,
            ..Self::default()
        };
        obj.calc_params();
        obj
    }

    /// Add one pixel, extending or joining existing scans on its row.
    pub fn add_pixel(&mut self, x: i64, y: i64) {
        if self.is_in_object(x, y) {
            return;
        }

        let grown = self.scans.iter().position(|s| {
            s.y() == y && (s.x() == x + 1 || s.x_max() + 1 == x)
        });

        match grown {
            Some(idx) => {
                if self.scans[idx].x() == x + 1 {
                    self.scans[idx].grow_left();
                } else {
                    self.scans[idx].grow_right();
                }
                // A single pixel can close at most one gap on its row.
                let grown_scan = self.scans[idx];
                if let Some(other) = self
                    .scans
                    .iter()
                    .enumerate()
                    .position(|(i, s)| i != idx && s.touches(&grown_scan))
                {
                    let other_scan = self.scans[other];
                    self.scans[idx] = Scan::new(
                        y,
                        grown_scan.x().min(other_scan.x()),
                        grown_scan.len() + other_scan.len(),
                    );
                    self.scans.swap_remove(other);
                }
            }
            None => self.scans.push(Scan::pixel(x, y)),
        }

        self.num_pix += 1;
        self.x_sum += x;
        self.y_sum += y;
        self.bbox.include(x, y);
    }

    /// Add a run, coalescing it with every same-row scan it touches.
    ///
    /// Pixels already present are not counted twice.
    pub fn add_scan(&mut self, scan: Scan) {
        let y = scan.y();
        let mut merged = scan;
        let mut overlap_pix = 0i64;
        let mut overlap_x_sum = 0i64;

        let mut i = 0;
        while i < self.scans.len() {
            let existing = self.scans[i];
            if existing.touches(&scan) {
                if existing.overlaps(&scan) {
                    let start = existing.x().max(scan.x());
                    let end = existing.x_max().min(scan.x_max());
                    overlap_pix += end - start + 1;
                    overlap_x_sum += column_sum(start, end);
                }
                let x = merged.x().min(existing.x());
                let x_max = merged.x_max().max(existing.x_max());
                merged = Scan::new(y, x, x_max - x + 1);
                self.scans.swap_remove(i);
            } else {
                i += 1;
            }
        }
        self.scans.push(merged);

        let added = scan.len() - overlap_pix;
        self.num_pix += added as usize;
        self.x_sum += column_sum(scan.x(), scan.x_max()) - overlap_x_sum;
        self.y_sum += y * added;
        self.bbox.include_run(y, scan.x(), scan.x_max());
    }

    /// Add every scan of `other`.
    pub fn add_object(&mut self, other: &Object2D) {
        for scan in &other.scans {
            self.add_scan(*scan);
        }
    }

    /// Linear membership test.
    pub fn is_in_object(&self, x: i64, y: i64) -> bool {
        self.scans.iter().any(|s| s.is_in_scan(x, y))
    }

    /// Recompute all aggregates from the scan list.
    pub fn calc_params(&mut self) {
        self.num_pix = 0;
        self.x_sum = 0;
        self.y_sum = 0;
        self.bbox = Aabb::empty();
        for scan in &self.scans {
            self.num_pix += scan.len() as usize;
            self.x_sum += column_sum(scan.x(), scan.x_max());
            self.y_sum += scan.y() * scan.len();
            self.bbox.include_run(scan.y(), scan.x(), scan.x_max());
        }
    }

    /// Union overlapping same-row scan pairs until none remain, then recompute aggregates.
    pub fn cleanup(&mut self) {
        loop {
            let pair = (0..self.scans.len()).find_map(|i| {
                ((i + 1)..self.scans.len())
                    .find(|&j| self.scans[i].overlaps(&self.scans[j]))
                    .map(|j| (i, j))
            });
            let Some((i, j)) = pair else {
                break;
            };
            let a = self.scans[i];
            let b = self.scans[j];
            let x = a.x().min(b.x());
            let x_max = a.x_max().max(b.x_max());
            self.scans[i] = Scan::new(a.y(), x, x_max - x + 1);
            self.scans.swap_remove(j);
        }
        self.calc_params();
    }

    /// Rigid translation by (dx, dy).
    pub fn add_offsets(&mut self, dx: i64, dy: i64) {
        for scan in &mut self.scans {
            scan.add_offsets(dx, dy);
        }
        let n = self.num_pix as i64;
        self.x_sum += dx * n;
        self.y_sum += dy * n;
        self.bbox.offset(dx, dy);
    }

    #[inline]
    pub fn scans(&self) -> &[Scan] {
        &self.scans
    }

    #[inline]
    pub fn num_scans(&self) -> usize {
        self.scans.len()
    }

    #[inline]
    pub fn num_pix(&self) -> usize {
        self.num_pix
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_pix == 0
    }

    #[inline]
    pub fn x_sum(&self) -> i64 {
        self.x_sum
    }

    #[inline]
    pub fn y_sum(&self) -> i64 {
        self.y_sum
    }

    #[inline]
    pub fn bbox(&self) -> Aabb {
        self.bbox
    }

    /// Unweighted centroid, `None` when empty.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.num_pix == 0 {
            return None;
        }
        let n = self.num_pix as f64;
        Some((self.x_sum as f64 / n, self.y_sum as f64 / n))
    }

    /// Iterate over every pixel as (x, y).
    pub fn pixels(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.scans
            .iter()
            .flat_map(|s| s.columns().map(move |x| (x, s.y())))
    }

    pub fn num_distinct_y(&self) -> usize {
        self.scans.iter().map(|s| s.y()).collect::<BTreeSet<_>>().len()
    }

    pub fn num_distinct_x(&self) -> usize {
        self.scans
            .iter()
            .flat_map(|s| s.columns())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// True if any scan of `self` shares a pixel with any scan of `other`.
    pub fn scan_overlaps(&self, other: &Object2D) -> bool {
        self.scans
            .iter()
            .any(|a| other.scans.iter().any(|b| a.overlaps(b)))
    }

    /// Bounding boxes are within `gap` pixels of each other on both axes.
    #[inline]
    pub fn is_near(&self, other: &Object2D, gap: i64) -> bool {
        !self.is_empty() && !other.is_empty() && self.bbox.within_gap(&other.bbox, gap)
    }

    /// Pixel-level proximity.
    ///
    /// With `adjacent_only`, some pair of pixels must be 8-connected; otherwise some
    /// pair must be no further apart than `thresh_spatial`.
    pub fn is_close(&self, other: &Object2D, thresh_spatial: f32, adjacent_only: bool) -> bool {
        let thresh = thresh_spatial as f64;
        self.scans.iter().any(|a| {
            other.scans.iter().any(|b| {
                if adjacent_only {
                    a.is_adjacent_to(b)
                } else {
                    a.min_separation(b) <= thresh
                }
            })
        })
    }

    /// Box test followed by the pixel-level test.
    pub fn can_merge(&self, other: &Object2D, thresh_spatial: f32, adjacent_only: bool) -> bool {
        let gap = spatial_gap(thresh_spatial, adjacent_only);
        self.is_near(other, gap) && self.is_close(other, thresh_spatial, adjacent_only)
    }

    /// Orientation of the major axis in radians, counter-clockwise from +x,
    /// in `(-π/2, π/2]`. `None` when empty.
    pub fn position_angle(&self) -> Option<f64> {
        let (mxx, myy, mxy) = self.second_moments()?;
        if mxy.abs() <= 1e-9 * (mxx + myy).max(1.0) {
            return Some(if mxx >= myy { 0.0 } else { FRAC_PI_2 });
        }
        Some(0.5 * (2.0 * mxy).atan2(mxx - myy))
    }

    /// Extents (major, minor) of the pixel footprint along the principal axes,
    /// each at least half a pixel. `None` when empty.
    pub fn principal_axes(&self) -> Option<(f64, f64)> {
        let theta = self.position_angle()?;
        let (sin, cos) = theta.sin_cos();

        let mut u_range = (f64::INFINITY, f64::NEG_INFINITY);
        let mut v_range = (f64::INFINITY, f64::NEG_INFINITY);
        for (x, y) in self.pixels() {
            for (cx, cy) in [(-0.5, -0.5), (-0.5, 0.5), (0.5, -0.5), (0.5, 0.5)] {
                let px = x as f64 + cx;
                let py = y as f64 + cy;
                let u = px * cos + py * sin;
                let v = -px * sin + py * cos;
                u_range = (u_range.0.min(u), u_range.1.max(u));
                v_range = (v_range.0.min(v), v_range.1.max(v));
            }
        }

        let along = (u_range.1 - u_range.0).max(0.5);
        let across = (v_range.1 - v_range.0).max(0.5);
        Some((along.max(across), along.min(across)))
    }

    /// Central second moments (Mxx, Myy, Mxy) of the pixel coordinates.
    fn second_moments(&self) -> Option<(f64, f64, f64)> {
        let (xc, yc) = self.centroid()?;
        let mut mxx = 0.0;
        let mut myy = 0.0;
        let mut mxy = 0.0;
        for (x, y) in self.pixels() {
            let dx = x as f64 - xc;
            let dy = y as f64 - yc;
            mxx += dx * dx;
            myy += dy * dy;
            mxy += dx * dy;
        }
        Some((mxx, myy, mxy))
    }
}

/// Box-gap tolerance in pixels for spatial proximity tests.
#[inline]
pub fn spatial_gap(thresh_spatial: f32, adjacent_only: bool) -> i64 {
    if adjacent_only {
        1
    } else {
        thresh_spatial.ceil() as i64
    }
}
