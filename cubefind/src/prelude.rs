//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use cubefind::prelude::*;
//! ```

// Data
pub use crate::{Buffer3, CubeDims, FluxCube};

// Region model
pub use crate::{Object2D, Object3D, Scan};

// Source finding - main API
pub use crate::{
    Config, CubeFinder, Detection, FindDiagnostics, FindError, FindResult, SearchType,
    StatsContainer,
};
