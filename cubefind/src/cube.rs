//! Flux cube plus per-voxel validity mask.

use common::buffer3::Buffer3;

use crate::error::RegionError;

/// Cube dimensions as (width, height, channels).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CubeDims {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
}

impl CubeDims {
    #[inline]
    pub fn spatial_size(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn num_voxels(&self) -> usize {
        self.width * self.height * self.depth
    }
}

/// Read-only input to every stage of the finder.
///
/// Axes are x (fastest), y, then channel z.
#[derive(Debug, Clone)]
pub struct FluxCube {
    flux: Buffer3<f32>,
    valid: Buffer3<bool>,
}

impl FluxCube {
    /// Wrap a flux buffer, treating non-finite voxels as invalid.
    pub fn new(flux: Buffer3<f32>) -> Self {
        let valid = Buffer3::new(
            flux.width(),
            flux.height(),
            flux.depth(),
            flux.iter().map(|v| v.is_finite()).collect(),
        );
        Self { flux, valid }
    }

    /// Wrap a flux buffer with an explicit validity mask.
    ///
    /// Non-finite voxels are invalid regardless of the mask.
    pub fn with_mask(flux: Buffer3<f32>, mask: Buffer3<bool>) -> Self {
        assert!(
            flux.width() == mask.width()
                && flux.height() == mask.height()
                && flux.depth() == mask.depth(),
            "mask dimensions {}x{}x{} do not match flux {}x{}x{}",
            mask.width(),
            mask.height(),
            mask.depth(),
            flux.width(),
            flux.height(),
            flux.depth()
        );
        let valid = Buffer3::new(
            flux.width(),
            flux.height(),
            flux.depth(),
            flux.iter()
                .zip(mask.iter())
                .map(|(v, &m)| m && v.is_finite())
                .collect(),
        );
        Self { flux, valid }
    }

    #[inline]
    pub fn dims(&self) -> CubeDims {
        CubeDims {
            width: self.flux.width(),
            height: self.flux.height(),
            depth: self.flux.depth(),
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.flux.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.flux.height()
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.flux.depth()
    }

    #[inline]
    pub fn flux(&self) -> &Buffer3<f32> {
        &self.flux
    }

    #[inline]
    pub fn mask(&self) -> &Buffer3<bool> {
        &self.valid
    }

    #[inline]
    pub fn is_valid(&self, x: usize, y: usize, z: usize) -> bool {
        self.valid[(x, y, z)]
    }

    /// Flux at a voxel, `None` when the voxel is masked out.
    #[inline]
    pub fn value(&self, x: usize, y: usize, z: usize) -> Option<f32> {
        self.is_valid(x, y, z).then(|| self.flux[(x, y, z)])
    }

    /// True if signed coordinates fall inside the cube.
    #[inline]
    pub fn contains(&self, x: i64, y: i64, z: i64) -> bool {
        x >= 0
            && y >= 0
            && z >= 0
            && (x as usize) < self.width()
            && (y as usize) < self.height()
            && (z as usize) < self.depth()
    }

    /// Raw flux at signed coordinates, failing outside the cube.
    pub fn flux_at(&self, x: i64, y: i64, z: i64) -> Result<f32, RegionError> {
        if !self.contains(x, y, z) {
            return Err(RegionError::VoxelOutsideCube {
                x,
                y,
                z,
                width: self.width(),
                height: self.height(),
                depth: self.depth(),
            });
        }
        Ok(self.flux[(x as usize, y as usize, z as usize)])
    }

    /// Valid flux at signed coordinates, `None` when outside or masked.
    #[inline]
    pub fn valid_value_at(&self, x: i64, y: i64, z: i64) -> Option<f32> {
        if !self.contains(x, y, z) {
            return None;
        }
        self.value(x as usize, y as usize, z as usize)
    }

    /// Every valid flux value, in storage order.
    pub fn valid_values(&self) -> Vec<f32> {
        self.flux
            .iter()
            .zip(self.valid.iter())
            .filter_map(|(&v, &ok)| ok.then_some(v))
            .collect()
    }
}
