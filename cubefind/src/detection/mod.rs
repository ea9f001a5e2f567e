//! Detection result types.
//!
//! A [`Detection`] owns an [`Object3D`] and, once [`Detection::calc_fluxes`] has
//! run, the derived [`SourceParams`]. Any structural change drops the derived
//! values so stale numbers are never reported.


use crate::config::Config;
use crate::cube::FluxCube;
use crate::error::RegionError;
use crate::math::Aabb;
use crate::region::{Object2D, Object3D, Scan, Voxel};

/// Derived quantities of a detection, computed from the flux cube.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceParams {
    /// Sum of the flux of every voxel.
    pub total_flux: f64,
    /// Largest voxel flux.
    pub peak_flux: f32,
    /// Position of the brightest voxel. The first one wins ties.
    pub peak: (i64, i64, i64),
    /// Flux-weighted centroid. Falls back to `average` when the total flux is not positive.
    pub weighted_centroid: (f64, f64, f64),
    /// Unweighted mean voxel position.
    pub average: (f64, f64, f64),
    /// Position angle of the spatial map in radians, from +x.
    pub position_angle: f64,
    /// Major axis extent of the spatial map in pixels.
    pub major_axis: f64,
    /// Minor axis extent of the spatial map in pixels.
    pub minor_axis: f64,
    /// Touches the spatial border or the first or last channel.
    pub at_edge: bool,
    /// Total flux is negative.
    pub negative_flux: bool,
}

/// A source candidate: a voxel region plus its derived parameters.
#[derive(Debug, Clone, Default)]
pub struct Detection {
    /// Permanent 1-based identifier. 0 until the finder numbers the survivors.
    id: usize,
    object: Object3D,
    params: Option<SourceParams>,
}

impl Detection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_object(object: Object3D) -> Self {
        Self {
            id: 0,
            object,
            params: None,
        }
    }

    /// A raw detection covering one channel map.
    pub fn from_channel(z: i64, obj: Object2D) -> Result<Self, RegionError> {
        let mut object = Object3D::new();
        object.add_channel(z, obj)?;
        Ok(Self::from_object(object))
    }

    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn set_id(&mut self, id: usize) {
        self.id = id;
    }

    #[inline]
    pub fn object(&self) -> &Object3D {
        &self.object
    }

    pub fn into_object(self) -> Object3D {
        self.object
    }

    // ------------------------------------------------------------------------
    // Mutation. Everything below drops the derived parameters.
    // ------------------------------------------------------------------------

    pub fn add_pixel(&mut self, x: i64, y: i64, z: i64) {
        self.object.add_pixel(x, y, z);
        self.params = None;
    }

    pub fn add_scan(&mut self, scan: Scan, z: i64) {
        self.object.add_scan(scan, z);
        self.params = None;
    }

    pub fn add_channel(&mut self, z: i64, obj: Object2D) -> Result<(), RegionError> {
        self.object.add_channel(z, obj)?;
        self.params = None;
        Ok(())
    }

    /// Absorb every voxel of `other`.
    pub fn add_detection(&mut self, other: &Detection) {
        self.object.add_object(&other.object);
        self.params = None;
    }

    pub fn add_offsets(&mut self, dx: i64, dy: i64, dz: i64) {
        self.object.add_offsets(dx, dy, dz);
        self.params = None;
    }

    // ------------------------------------------------------------------------
    // Derived parameters
    // ------------------------------------------------------------------------

    /// Compute fluxes, centroids, shape and flags from the cube.
    pub fn calc_fluxes(&mut self, cube: &FluxCube) -> Result<(), RegionError> {
        let voxels = self.object.pixel_set(cube)?;

        let mut total_flux = 0.0f64;
        let mut weighted = (0.0f64, 0.0f64, 0.0f64);
        let mut peak = voxels[0];
        for v in &voxels {
            let f = v.flux as f64;
            total_flux += f;
            weighted.0 += f * v.x as f64;
            weighted.1 += f * v.y as f64;
            weighted.2 += f * v.z as f64;
            if v.flux > peak.flux {
                peak = *v;
            }
        }

        let average = self.object.centroid().ok_or(RegionError::EmptyRegion)?;
        let weighted_centroid = if total_flux > 0.0 {
            (
                weighted.0 / total_flux,
                weighted.1 / total_flux,
                weighted.2 / total_flux,
            )
        } else {
            average
        };

        let spatial = self.object.spatial_map();
        let position_angle = spatial.position_angle().unwrap_or(0.0);
        let (major_axis, minor_axis) = spatial.principal_axes().unwrap_or((0.5, 0.5));

        self.params = Some(SourceParams {
            total_flux,
            peak_flux: peak.flux,
            peak: (peak.x, peak.y, peak.z),
            weighted_centroid,
            average,
            position_angle,
            major_axis,
            minor_axis,
            at_edge: self.touches_edge(cube),
            negative_flux: total_flux < 0.0,
        });
        Ok(())
    }

    fn touches_edge(&self, cube: &FluxCube) -> bool {
        let bbox = self.object.bbox();
        let (Some(z_min), Some(z_max)) = (self.object.z_min(), self.object.z_max()) else {
            return false;
        };
        bbox.x_min <= 0
            || bbox.y_min <= 0
            || z_min <= 0
            || bbox.x_max >= cube.width() as i64 - 1
            || bbox.y_max >= cube.height() as i64 - 1
            || z_max >= cube.depth() as i64 - 1
    }

    /// Derived parameters, `None` until [`calc_fluxes`](Self::calc_fluxes) runs
    /// after the last structural change.
    #[inline]
    pub fn params(&self) -> Option<&SourceParams> {
        self.params.as_ref()
    }

    #[inline]
    pub fn is_stale(&self) -> bool {
        self.params.is_none()
    }

    pub fn total_flux(&self) -> Option<f64> {
        self.params.map(|p| p.total_flux)
    }

    pub fn peak_flux(&self) -> Option<f32> {
        self.params.map(|p| p.peak_flux)
    }

    pub fn weighted_centroid(&self) -> Option<(f64, f64, f64)> {
        self.params.map(|p| p.weighted_centroid)
    }

    pub fn is_at_edge(&self) -> Option<bool> {
        self.params.map(|p| p.at_edge)
    }

    pub fn has_negative_flux(&self) -> Option<bool> {
        self.params.map(|p| p.negative_flux)
    }

    // ------------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------------

    pub fn pixel_set(&self, cube: &FluxCube) -> Result<Vec<Voxel>, RegionError> {
        self.object.pixel_set(cube)
    }

    #[inline]
    pub fn bbox(&self) -> Aabb {
        self.object.bbox()
    }

    #[inline]
    pub fn z_min(&self) -> Option<i64> {
        self.object.z_min()
    }

    #[inline]
    pub fn z_max(&self) -> Option<i64> {
        self.object.z_max()
    }

    #[inline]
    pub fn num_voxels(&self) -> usize {
        self.object.num_vox()
    }

    #[inline]
    pub fn num_channels(&self) -> usize {
        self.object.num_channels()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.object.is_empty()
    }

    /// Mean voxel position, available without the flux cube.
    #[inline]
    pub fn centre(&self) -> Option<(f64, f64, f64)> {
        self.object.centroid()
    }
}

// ============================================================================
// Rejection
// ============================================================================

/// Minimum sizes a detection must reach to be kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectionFloors {
    pub min_pix: usize,
    pub min_channels: usize,
    pub min_voxels: usize,
}

impl RejectionFloors {
    pub fn from_config(config: &Config) -> Self {
        Self {
            min_pix: config.min_pix,
            min_channels: config.min_channels,
            min_voxels: config.effective_min_voxels(),
        }
    }

    /// True if `det` meets every floor.
    pub fn accepts(&self, det: &Detection) -> bool {
        det.num_voxels() >= self.min_voxels
            && det.object.max_adjacent_channels() >= self.min_channels
            && det.object.num_spatial_pix() >= self.min_pix
    }
}

/// Drop detections below the floors, keeping the order of the rest.
pub fn reject_detections(detections: Vec<Detection>, floors: &RejectionFloors) -> Vec<Detection> {
    let before = detections.len();
    let kept: Vec<Detection> = detections
        .into_iter()
        .filter(|det| floors.accepts(det))
        .collect();
    tracing::debug!(before, after = kept.len(), "Rejected small detections");
    kept
}
