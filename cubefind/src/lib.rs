//! Cubefind - Source finding in spectral data cubes.
//!
//! This library finds sources in 3-D (x, y, channel) flux cubes:
//! - Robust noise statistics and thresholds from a signal-to-noise cut or the
//!   False Discovery Rate method
//! - Sparse run-length region model for 2-D and 3-D objects
//! - Spatial and spectral searches, merging, growth and rejection
//! - Per-source fluxes, centroids and shape parameters
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use cubefind::{Buffer3, Config, CubeFinder, FluxCube};
//!
//! let cube = FluxCube::new(Buffer3::new(width, height, depth, values));
//! let finder = CubeFinder::new(Config::robust_fdr());
//! let result = finder.find(&cube)?;
//!
//! println!("Found {} sources", result.detections.len());
//! ```

pub mod config;
pub mod cube;
pub mod detection;
pub mod error;
pub(crate) mod finder;
pub mod grow;
pub mod math;
pub mod merge;
pub mod region;
pub mod search;
pub mod stats;

#[cfg(test)]
pub(crate) mod testing;

pub mod prelude;

// ============================================================================
// Data
// ============================================================================

pub use common::buffer3::Buffer3;
pub use cube::{CubeDims, FluxCube};

// ============================================================================
// Region model
// ============================================================================

pub use math::Aabb;
pub use region::{Object2D, Object3D, Scan, Voxel};

// ============================================================================
// Statistics
// ============================================================================

pub use stats::StatsContainer;

// ============================================================================
// Source finding
// ============================================================================

pub use config::{Config, SearchType};
pub use detection::{Detection, RejectionFloors, SourceParams};
pub use error::{FindError, RegionError, StatsError};
pub use finder::{CubeFinder, FindDiagnostics, FindResult};
pub use merge::MergeParams;
