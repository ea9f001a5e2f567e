//! Sparse region model: scans, 2-D objects and 3-D objects.

pub mod object2d;
pub mod object3d;
pub mod scan;

pub use object2d::Object2D;
pub use object3d::Object3D;
pub use scan::Scan;

/// A single voxel with its flux.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voxel {
    pub x: i64,
    pub y: i64,
    pub z: i64,
    pub flux: f32,
}
