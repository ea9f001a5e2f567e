//! Axis-aligned spatial bounding box for pixel regions.

/// Axis-aligned bounding box with signed pixel coordinates.
///
/// Uses inclusive bounds: a pixel at (x, y) is inside if
/// `x_min <= x <= x_max` and `y_min <= y <= y_max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aabb {
    pub x_min: i64,
    pub x_max: i64,
    pub y_min: i64,
    pub y_max: i64,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

impl Aabb {
    #[inline]
    pub const fn new(x_min: i64, x_max: i64, y_min: i64, y_max: i64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// Create an empty bounding box (for accumulation).
    ///
    /// The empty box has inverted bounds so that any point
    /// included via `include()` will set the initial bounds.
    #[inline]
    pub const fn empty() -> Self {
        Self {
            x_min: i64::MAX,
            x_max: i64::MIN,
            y_min: i64::MAX,
            y_max: i64::MIN,
        }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.x_min > self.x_max || self.y_min > self.y_max
    }

    /// Expand this bounding box to include the given point.
    #[inline]
    pub fn include(&mut self, x: i64, y: i64) {
        self.x_min = self.x_min.min(x);
        self.x_max = self.x_max.max(x);
        self.y_min = self.y_min.min(y);
        self.y_max = self.y_max.max(y);
    }

    /// Expand to include a horizontal run `[x_start, x_end]` on row `y`.
    #[inline]
    pub fn include_run(&mut self, y: i64, x_start: i64, x_end: i64) {
        self.x_min = self.x_min.min(x_start);
        self.x_max = self.x_max.max(x_end);
        self.y_min = self.y_min.min(y);
        self.y_max = self.y_max.max(y);
    }

    /// Smallest box containing both.
    #[inline]
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            x_min: self.x_min.min(other.x_min),
            x_max: self.x_max.max(other.x_max),
            y_min: self.y_min.min(other.y_min),
            y_max: self.y_max.max(other.y_max),
        }
    }

    /// Translate by (dx, dy).
    #[inline]
    pub fn offset(&mut self, dx: i64, dy: i64) {
        if self.is_empty() {
            return;
        }
        self.x_min += dx;
        self.x_max += dx;
        self.y_min += dy;
        self.y_max += dy;
    }

    /// True if the boxes are separated by at most `gap` pixels on both axes.
    ///
    /// Boxes that overlap or share an edge always pass; `gap = 1` accepts boxes
    /// whose facing edges are in neighbouring columns/rows.
    #[inline]
    pub fn within_gap(&self, other: &Aabb, gap: i64) -> bool {
        interval_gap(self.x_min, self.x_max, other.x_min, other.x_max) <= gap
            && interval_gap(self.y_min, self.y_max, other.y_min, other.y_max) <= gap
    }

    #[inline]
    pub const fn width(&self) -> i64 {
        self.x_max - self.x_min + 1
    }

    #[inline]
    pub const fn height(&self) -> i64 {
        self.y_max - self.y_min + 1
    }

    #[inline]
    pub const fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max
    }
}

/// Distance between closed integer intervals `[a_min, a_max]` and `[b_min, b_max]`.
///
/// Zero or negative when they overlap, 1 when they are adjacent.
#[inline]
pub fn interval_gap(a_min: i64, a_max: i64, b_min: i64, b_max: i64) -> i64 {
    (b_min - a_max).max(a_min - b_max)
}
