//! A horizontal run of significant pixels on one row.

use crate::error::RegionError;
use crate::math::bbox::interval_gap;

/// A run of `len` contiguous pixels starting at column `x` on row `y`.
///
/// Ordering is by row, then start column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Scan {
    y: i64,
    x: i64,
    len: i64,
}

impl Scan {
    /// Create a scan. Panics if `len < 1`.
    #[inline]
    pub fn new(y: i64, x: i64, len: i64) -> Self {
        assert!(len >= 1, "scan length must be at least 1, got {}", len);
        Self { y, x, len }
    }

    /// A single-pixel scan.
    #[inline]
    pub fn pixel(x: i64, y: i64) -> Self {
        Self { y, x, len: 1 }
    }

    #[inline]
    pub fn y(&self) -> i64 {
        self.y
    }

    #[inline]
    pub fn x(&self) -> i64 {
        self.x
    }

    #[inline]
    pub fn len(&self) -> i64 {
        self.len
    }

    /// Last column covered by the scan.
    #[inline]
    pub fn x_max(&self) -> i64 {
        self.x + self.len - 1
    }

    #[inline]
    pub fn is_in_scan(&self, x: i64, y: i64) -> bool {
        y == self.y && x >= self.x && x <= self.x_max()
    }

    /// Extend one column to the left.
    #[inline]
    pub fn grow_left(&mut self) {
        self.x -= 1;
        self.len += 1;
    }

    /// Extend one column to the right.
    #[inline]
    pub fn grow_right(&mut self) {
        self.len += 1;
    }

    /// Same row and the column ranges overlap or abut.
    #[inline]
    pub fn touches(&self, other: &Scan) -> bool {
        self.y == other.y && interval_gap(self.x, self.x_max(), other.x, other.x_max()) <= 1
    }

    /// Same row and at least one shared column.
    #[inline]
    pub fn overlaps(&self, other: &Scan) -> bool {
        self.y == other.y && interval_gap(self.x, self.x_max(), other.x, other.x_max()) <= 0
    }

    /// 8-connected: rows differ by at most one and columns overlap or abut.
    #[inline]
    pub fn is_adjacent_to(&self, other: &Scan) -> bool {
        (self.y - other.y).abs() <= 1
            && interval_gap(self.x, self.x_max(), other.x, other.x_max()) <= 1
    }

    /// Smallest Euclidean distance between any pixel of `self` and any pixel of `other`.
    pub fn min_separation(&self, other: &Scan) -> f64 {
        let dx = interval_gap(self.x, self.x_max(), other.x, other.x_max()).max(0) as f64;
        let dy = (self.y - other.y).abs() as f64;
        dx.hypot(dy)
    }

    /// Combined extent of two touching scans on the same row.
    pub fn unite(&self, other: &Scan) -> Result<Scan, RegionError> {
        self.check_same_row(other)?;
        if !self.touches(other) {
            return Err(RegionError::ScansNotTouching {
                y: self.y,
                a_start: self.x,
                a_end: self.x_max(),
                b_start: other.x,
                b_end: other.x_max(),
            });
        }
        let x = self.x.min(other.x);
        let x_max = self.x_max().max(other.x_max());
        Ok(Scan::new(self.y, x, x_max - x + 1))
    }

    /// Shared columns of two overlapping scans on the same row.
    pub fn intersect(&self, other: &Scan) -> Result<Scan, RegionError> {
        self.check_same_row(other)?;
        if !self.overlaps(other) {
            return Err(RegionError::ScansNotOverlapping {
                y: self.y,
                a_start: self.x,
                a_end: self.x_max(),
                b_start: other.x,
                b_end: other.x_max(),
            });
        }
        let x = self.x.max(other.x);
        let x_max = self.x_max().min(other.x_max());
        Ok(Scan::new(self.y, x, x_max - x + 1))
    }

    /// Rigid translation.
    #[inline]
    pub fn add_offsets(&mut self, dx: i64, dy: i64) {
        self.x += dx;
        self.y += dy;
    }

    /// Columns covered by the scan.
    #[inline]
    pub fn columns(&self) -> std::ops::RangeInclusive<i64> {
        self.x..=self.x_max()
    }

    fn check_same_row(&self, other: &Scan) -> Result<(), RegionError> {
        if self.y != other.y {
            return Err(RegionError::ScanRowMismatch {
                first: self.y,
                second: other.y,
            });
        }
        Ok(())
    }
}
