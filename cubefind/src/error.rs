use thiserror::Error;

/// Structural precondition violations on the region model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionError {
    #[error("Scans lie on different rows ({first} and {second})")]
    ScanRowMismatch { first: i64, second: i64 },

    #[error("Scans on row {y} do not touch: [{a_start}, {a_end}] and [{b_start}, {b_end}]")]
    ScansNotTouching {
        y: i64,
        a_start: i64,
        a_end: i64,
        b_start: i64,
        b_end: i64,
    },

    #[error("Scans on row {y} do not overlap: [{a_start}, {a_end}] and [{b_start}, {b_end}]")]
    ScansNotOverlapping {
        y: i64,
        a_start: i64,
        a_end: i64,
        b_start: i64,
        b_end: i64,
    },

    #[error("Region is empty")]
    EmptyRegion,

    #[error("Voxel ({x}, {y}, {z}) lies outside the {width}x{height}x{depth} cube")]
    VoxelOutsideCube {
        x: i64,
        y: i64,
        z: i64,
        width: usize,
        height: usize,
        depth: usize,
    },
}

/// Degenerate inputs to the noise statistics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    #[error("No valid values to compute statistics from")]
    NoValidValues,

    #[error("At least 2 valid values are needed for a spread estimate, got {count}")]
    InsufficientValues { count: usize },

    #[error("Mask length {mask} does not match value count {values}")]
    LengthMismatch { values: usize, mask: usize },
}

/// Errors from a complete source-finding run.
#[derive(Debug, Error)]
pub enum FindError {
    #[error("Noise statistics failed: {0}")]
    Stats(#[from] StatsError),

    #[error("Region operation failed: {0}")]
    Region(#[from] RegionError),
}
