//! Configuration types for source finding.
//!
//! This module defines the flat [`Config`] struct used by the
//! [`CubeFinder`](crate::CubeFinder) pipeline. Parameters are grouped by comments
//! into logical sections.

use serde::{Deserialize, Serialize};

use crate::cube::CubeDims;

// ============================================================================
// Enums
// ============================================================================

/// How raw detections are extracted from the thresholded cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    /// Connected components in each channel image, joined across channels by merging.
    #[default]
    Spatial,
    /// Runs of detected channels along each spectrum, joined spatially by merging.
    Spectral,
}

// ============================================================================
// Source Finding Configuration
// ============================================================================

/// Configuration for the source-finding pipeline.
///
/// Single flat struct with all parameters grouped by pipeline stage. Partial
/// YAML or JSON documents fill the remaining fields from [`Config::default`].
///
/// # Example
///
/// ```rust,ignore
/// use cubefind::Config;
///
/// let mut config = Config::robust_fdr();
/// config.min_channels = 5;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // -- Statistics and threshold --
    /// Use median and MADFM instead of mean and standard deviation.
    pub flag_robust_stats: bool,
    /// Detection threshold in units of the noise spread above the middle.
    pub snr_cut: f32,
    /// Manual flux threshold. Overrides `snr_cut` and FDR when set.
    pub threshold: Option<f32>,
    /// Use the False Discovery Rate method to set the threshold.
    pub flag_fdr: bool,
    /// FDR false-discovery fraction.
    pub alpha_fdr: f32,
    /// Beam area in pixels, the number of spatially correlated pixels.
    pub beam_area: f32,
    /// Number of spectrally correlated channels.
    pub fdr_num_correlated_chan: usize,

    // -- Search --
    pub search_type: SearchType,

    // -- Merging --
    /// Merge only adjacent objects (gap of one pixel) instead of using `thresh_spatial`.
    pub flag_adjacent: bool,
    /// Maximum spatial separation in pixels for two objects to merge.
    pub thresh_spatial: f32,
    /// Maximum channel separation for two objects to merge.
    pub thresh_velocity: f32,
    /// Also apply the rejection floors after the first merge, before growth.
    pub flag_reject_before_merge: bool,
    /// Merge within each channel first, then across the whole cube.
    pub flag_two_stage_merging: bool,

    // -- Growth --
    /// Grow detections down to a secondary threshold.
    pub flag_growth: bool,
    /// Growth threshold in units of the noise spread.
    pub growth_cut: f32,
    /// Manual growth flux threshold. Overrides `growth_cut` when set.
    pub growth_threshold: Option<f32>,

    // -- Rejection --
    /// Minimum number of distinct spatial pixels.
    pub min_pix: usize,
    /// Minimum number of consecutive channels.
    pub min_channels: usize,
    /// Minimum number of voxels. 0 = `min_pix + min_channels - 1`.
    pub min_voxels: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // Statistics and threshold
            flag_robust_stats: true,
            snr_cut: 5.0,
            threshold: None,
            flag_fdr: false,
            alpha_fdr: 0.01,
            beam_area: 10.0,
            fdr_num_correlated_chan: 2,

            // Search
            search_type: SearchType::Spatial,

            // Merging
            flag_adjacent: true,
            thresh_spatial: 3.0,
            thresh_velocity: 7.0,
            flag_reject_before_merge: false,
            flag_two_stage_merging: true,

            // Growth
            flag_growth: false,
            growth_cut: 3.0,
            growth_threshold: None,

            // Rejection
            min_pix: 2,
            min_channels: 3,
            min_voxels: 0,
        }
    }
}

impl Config {
    /// Validate the configuration, panicking if invalid.
    pub fn validate(&self) {
        // Statistics and threshold
        assert!(
            self.snr_cut > 0.0,
            "snr_cut must be positive, got {}",
            self.snr_cut
        );
        if let Some(threshold) = self.threshold {
            assert!(
                threshold.is_finite(),
                "threshold must be finite, got {}",
                threshold
            );
        }
        assert!(
            self.alpha_fdr > 0.0 && self.alpha_fdr < 1.0,
            "alpha_fdr must be in (0, 1), got {}",
            self.alpha_fdr
        );
        assert!(
            self.beam_area > 0.0,
            "beam_area must be positive, got {}",
            self.beam_area
        );
        assert!(
            self.fdr_num_correlated_chan >= 1,
            "fdr_num_correlated_chan must be at least 1, got {}",
            self.fdr_num_correlated_chan
        );

        // Merging
        assert!(
            self.thresh_spatial >= 0.0,
            "thresh_spatial must be non-negative, got {}",
            self.thresh_spatial
        );
        assert!(
            self.thresh_velocity >= 0.0,
            "thresh_velocity must be non-negative, got {}",
            self.thresh_velocity
        );

        // Growth
        if let Some(growth_threshold) = self.growth_threshold {
            assert!(
                growth_threshold.is_finite(),
                "growth_threshold must be finite, got {}",
                growth_threshold
            );
        }

        // Rejection
        assert!(
            self.min_pix >= 1,
            "min_pix must be at least 1, got {}",
            self.min_pix
        );
        assert!(
            self.min_channels >= 1,
            "min_channels must be at least 1, got {}",
            self.min_channels
        );
    }

    /// Resolve settings that conflict with each other or with the cube size.
    ///
    /// Each fix is logged as a warning. Nothing here is fatal.
    pub fn sanitize(&mut self, dims: CubeDims) {
        let spatial_size = dims.spatial_size();
        if self.min_pix > spatial_size {
            tracing::warn!(
                min_pix = self.min_pix,
                spatial_size,
                "min_pix exceeds the image size, clamping"
            );
            self.min_pix = spatial_size.max(1);
        }
        if self.min_channels > dims.depth {
            tracing::warn!(
                min_channels = self.min_channels,
                depth = dims.depth,
                "min_channels exceeds the number of channels, clamping"
            );
            self.min_channels = dims.depth.max(1);
        }

        if self.flag_fdr && self.threshold.is_some() {
            tracing::warn!("Manual threshold given together with FDR, ignoring FDR");
            self.flag_fdr = false;
        }

        if self.flag_growth {
            match (self.threshold, self.growth_threshold) {
                (Some(_), None) => {
                    tracing::warn!(
                        "Manual threshold given without a manual growth threshold, disabling growth"
                    );
                    self.flag_growth = false;
                }
                (Some(threshold), Some(growth)) if growth >= threshold => {
                    tracing::warn!(
                        threshold,
                        growth_threshold = growth,
                        "Growth threshold is not below the detection threshold, disabling growth"
                    );
                    self.flag_growth = false;
                }
                (None, None) if !self.flag_fdr && self.growth_cut >= self.snr_cut => {
                    tracing::warn!(
                        snr_cut = self.snr_cut,
                        growth_cut = self.growth_cut,
                        "growth_cut is not below snr_cut, disabling growth"
                    );
                    self.flag_growth = false;
                }
                _ => {}
            }
        }
    }

    /// Minimum voxel count, deriving the default from the other floors.
    #[inline]
    pub fn effective_min_voxels(&self) -> usize {
        if self.min_voxels == 0 {
            self.min_pix + self.min_channels - 1
        } else {
            self.min_voxels
        }
    }

    /// Number of mutually correlated voxels used by the FDR correction.
    #[inline]
    pub fn num_correlated_voxels(&self) -> usize {
        self.beam_area.ceil() as usize * self.fdr_num_correlated_chan
    }

    // =========================================================================
    // Preset Constructors
    // =========================================================================

    /// Robust statistics with an FDR threshold and growth to 2 sigma.
    pub fn robust_fdr() -> Self {
        Self {
            flag_robust_stats: true,
            flag_fdr: true,
            alpha_fdr: 0.01,
            flag_growth: true,
            growth_cut: 2.0,
            ..Self::default()
        }
    }

    /// Merge only objects that touch, spatially and spectrally.
    pub fn adjacent_only() -> Self {
        Self {
            flag_adjacent: true,
            thresh_velocity: 1.0,
            ..Self::default()
        }
    }
}
