//! Sparse 3-D region: an ordered map from channel to [`Object2D`].
//!
//! Voxel count, coordinate sums and spatial bounding box are folded in on every
//! insertion. The channel range comes straight from the first and last map keys.


use std::collections::BTreeMap;

use crate::cube::FluxCube;
use crate::error::RegionError;
use crate::math::Aabb;
use crate::region::Voxel;
use crate::region::object2d::Object2D;
use crate::region::scan::Scan;

/// Per-channel contribution to the parent aggregates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ChannelSums {
    num_pix: usize,
    x_sum: i64,
    y_sum: i64,
}

impl ChannelSums {
    fn of(obj: &Object2D) -> Self {
        Self {
            num_pix: obj.num_pix(),
            x_sum: obj.x_sum(),
            y_sum: obj.y_sum(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Object3D {
    channels: BTreeMap<i64, Object2D>,
    num_vox: usize,
    x_sum: i64,
    y_sum: i64,
    z_sum: i64,
    bbox: Aabb,
}

impl Object3D {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_pixel(&mut self, x: i64, y: i64, z: i64) {
        let obj = self.channels.entry(z).or_default();
        let before = ChannelSums::of(obj);
        obj.add_pixel(x, y);
        let after = ChannelSums::of(obj);
        self.apply_channel_delta(z, before, after);
    }

    pub fn add_scan(&mut self, scan: Scan, z: i64) {
        let obj = self.channels.entry(z).or_default();
        let before = ChannelSums::of(obj);
        obj.add_scan(scan);
        let after = ChannelSums::of(obj);
        self.apply_channel_delta(z, before, after);
    }

    /// Insert a whole channel map, uniting with any existing map for `z`.
    pub fn add_channel(&mut self, z: i64, obj: Object2D) -> Result<(), RegionError> {
        if obj.is_empty() {
            return Err(RegionError::EmptyRegion);
        }
        match self.channels.get_mut(&z) {
            Some(existing) => {
                let before = ChannelSums::of(existing);
                existing.add_object(&obj);
                let after = ChannelSums::of(existing);
                self.apply_channel_delta(z, before, after);
            }
            None => {
                let sums = ChannelSums::of(&obj);
                self.channels.insert(z, obj);
                self.apply_channel_delta(z, ChannelSums::default(), sums);
            }
        }
        Ok(())
    }

    /// Fold every channel of `other` into `self`.
    pub fn add_object(&mut self, other: &Object3D) {
        for (&z, obj) in &other.channels {
            match self.channels.get_mut(&z) {
                Some(existing) => {
                    let before = ChannelSums::of(existing);
                    existing.add_object(obj);
                    let after = ChannelSums::of(existing);
                    self.apply_channel_delta(z, before, after);
                }
                None => {
                    self.channels.insert(z, obj.clone());
                    self.apply_channel_delta(z, ChannelSums::default(), ChannelSums::of(obj));
                }
            }
        }
    }

    fn apply_channel_delta(&mut self, z: i64, before: ChannelSums, after: ChannelSums) {
        if let Some(obj) = self.channels.get(&z) {
            self.bbox = self.bbox.union(&obj.bbox());
        }
        let added = after.num_pix as i64 - before.num_pix as i64;
        self.num_vox = (self.num_vox as i64 + added) as usize;
        self.x_sum += after.x_sum - before.x_sum;
        self.y_sum += after.y_sum - before.y_sum;
        self.z_sum += z * added;
    }

    pub fn is_in_object(&self, x: i64, y: i64, z: i64) -> bool {
        self.channels
            .get(&z)
            .is_some_and(|obj| obj.is_in_object(x, y))
    }

    /// Recompute all aggregates from the channel maps.
    pub fn calc_params(&mut self) {
        self.num_vox = 0;
        self.x_sum = 0;
        self.y_sum = 0;
        self.z_sum = 0;
        self.bbox = Aabb::empty();
        for (&z, obj) in self.channels.iter_mut() {
            obj.calc_params();
            self.num_vox += obj.num_pix();
            self.x_sum += obj.x_sum();
            self.y_sum += obj.y_sum();
            self.z_sum += z * obj.num_pix() as i64;
            self.bbox = self.bbox.union(&obj.bbox());
        }
    }

    /// Rigid translation by (dx, dy, dz).
    pub fn add_offsets(&mut self, dx: i64, dy: i64, dz: i64) {
        let channels = std::mem::take(&mut self.channels);
        self.channels = channels
            .into_iter()
            .map(|(z, mut obj)| {
                obj.add_offsets(dx, dy);
                (z + dz, obj)
            })
            .collect();
        let n = self.num_vox as i64;
        self.x_sum += dx * n;
        self.y_sum += dy * n;
        self.z_sum += dz * n;
        self.bbox.offset(dx, dy);
    }

    /// Length of the longest run of consecutive channel numbers.
    pub fn max_adjacent_channels(&self) -> usize {
        let mut best = 0;
        let mut run = 0;
        let mut prev: Option<i64> = None;
        for &z in self.channels.keys() {
            run = match prev {
                Some(p) if z - p == 1 => run + 1,
                _ => 1,
            };
            best = best.max(run);
            prev = Some(z);
        }
        best
    }

    /// All channels flattened onto the spatial plane.
    pub fn spatial_map(&self) -> Object2D {
        let mut map = Object2D::new();
        for obj in self.channels.values() {
            map.add_object(obj);
        }
        map
    }

    /// Number of distinct spatial pixels covered by any channel.
    pub fn num_spatial_pix(&self) -> usize {
        self.spatial_map().num_pix()
    }

    /// Every voxel as (x, y, z), channel by channel in ascending order.
    pub fn voxels(&self) -> impl Iterator<Item = (i64, i64, i64)> + '_ {
        self.channels
            .iter()
            .flat_map(|(&z, obj)| obj.pixels().map(move |(x, y)| (x, y, z)))
    }

    /// Materialise every voxel together with its flux.
    pub fn pixel_set(&self, cube: &FluxCube) -> Result<Vec<Voxel>, RegionError> {
        if self.is_empty() {
            return Err(RegionError::EmptyRegion);
        }
        let mut set = Vec::with_capacity(self.num_vox);
        for (x, y, z) in self.voxels() {
            let flux = cube.flux_at(x, y, z)?;
            set.push(Voxel { x, y, z, flux });
        }
        Ok(set)
    }

    #[inline]
    pub fn channel(&self, z: i64) -> Option<&Object2D> {
        self.channels.get(&z)
    }

    /// Channel maps in ascending channel order.
    #[inline]
    pub fn channels(&self) -> impl Iterator<Item = (i64, &Object2D)> + '_ {
        self.channels.iter().map(|(&z, obj)| (z, obj))
    }

    /// Channel maps with `|channel - z| <= tolerance`, ascending.
    pub fn channels_near(
        &self,
        z: i64,
        tolerance: i64,
    ) -> impl Iterator<Item = (i64, &Object2D)> + '_ {
        let tolerance = tolerance.max(0);
        self.channels
            .range(z - tolerance..=z + tolerance)
            .map(|(&z, obj)| (z, obj))
    }

    #[inline]
    pub fn channel_numbers(&self) -> impl Iterator<Item = i64> + '_ {
        self.channels.keys().copied()
    }

    #[inline]
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    #[inline]
    pub fn num_vox(&self) -> usize {
        self.num_vox
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_vox == 0
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
    pub fn z_sum(&self) -> i64 {
        self.z_sum
    }

    /// Spatial bounding box over all channels.
    #[inline]
    pub fn bbox(&self) -> Aabb {
        self.bbox
    }

    #[inline]
    pub fn z_min(&self) -> Option<i64> {
        self.channels.keys().next().copied()
    }

    #[inline]
    pub fn z_max(&self) -> Option<i64> {
        self.channels.keys().next_back().copied()
    }

    /// Mean voxel position, `None` when empty.
    pub fn centroid(&self) -> Option<(f64, f64, f64)> {
        if self.num_vox == 0 {
            return None;
        }
        let n = self.num_vox as f64;
        Some((
            self.x_sum as f64 / n,
            self.y_sum as f64 / n,
            self.z_sum as f64 / n,
        ))
    }
}
