//! Source finder and related types.
//!
//! [`CubeFinder`] runs the whole pipeline on a [`FluxCube`]: noise statistics,
//! thresholding, search, merging, optional growth, rejection and
//! parameterisation.


use rayon::prelude::*;

use crate::config::Config;
use crate::cube::FluxCube;
use crate::detection::{Detection, RejectionFloors, reject_detections};
use crate::error::FindError;
use crate::grow::grow_detections;
use crate::merge::{MergeParams, merge_detections, merge_two_stage};
use crate::search::{count_detected_voxels, search};
use crate::stats::StatsContainer;

/// Result of source finding with diagnostics.
#[derive(Debug, Clone)]
pub struct FindResult {
    /// Final detections sorted by channel centre, then x centre. IDs start at 1.
    pub detections: Vec<Detection>,
    /// Noise statistics and the threshold that was applied.
    pub stats: StatsContainer,
    /// Counts from each stage of the pipeline.
    pub diagnostics: FindDiagnostics,
}

/// Object counts from each stage of the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindDiagnostics {
    /// Number of valid voxels passing the detection threshold.
    pub voxels_above_threshold: usize,
    /// Number of raw detections from the search.
    pub raw_detections: usize,
    /// Number of detections after the first merge.
    pub after_first_merge: usize,
    /// Number of detections removed by the early rejection pass.
    pub rejected_before_merge: usize,
    /// Number of detections after growth and the second merge.
    pub after_growth: usize,
    /// Number of voxels added by growth.
    pub grown_voxels: usize,
    /// Number of detections entering the final rejection.
    pub after_merge: usize,
    /// Number of detections removed by the final rejection.
    pub rejected: usize,
    /// Final number of detections returned.
    pub final_count: usize,
}

// =============================================================================
// CubeFinder
// =============================================================================

/// Source finder over a single flux cube.
///
/// # Example
///
/// ```rust,ignore
/// use cubefind::{Config, CubeFinder};
///
/// let finder = CubeFinder::new(Config {
///     snr_cut: 4.0,
///     min_channels: 2,
///     ..Default::default()
/// });
/// let result = finder.find(&cube)?;
/// for det in &result.detections {
///     println!("{} {:?}", det.id(), det.total_flux());
/// }
/// ```
#[derive(Debug, Default)]
pub struct CubeFinder {
    config: Config,
}

impl CubeFinder {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Find sources, measuring the noise from the cube itself.
    pub fn find(&self, cube: &FluxCube) -> Result<FindResult, FindError> {
        let stats = StatsContainer::calculate(cube.flux().values(), Some(cube.mask().values()))?;
        self.find_with_noise(cube, stats)
    }

    /// Find sources using noise statistics measured elsewhere.
    ///
    /// Only the noise estimates of `noise` are used; the estimator choice and the
    /// threshold are set again from the configuration.
    pub fn find_with_noise(
        &self,
        cube: &FluxCube,
        noise: StatsContainer,
    ) -> Result<FindResult, FindError> {
        let mut config = self.config.clone();
        config.validate();
        config.sanitize(cube.dims());

        // Step 1: Detection threshold
        let stats = apply_threshold(cube, noise, &config)?;
        let mut diagnostics = FindDiagnostics {
            voxels_above_threshold: count_detected_voxels(cube, &stats),
            ..Default::default()
        };
        tracing::debug!(
            middle = stats.middle(),
            spread = stats.spread(),
            threshold = stats.threshold(),
            voxels = diagnostics.voxels_above_threshold,
            "Thresholded cube"
        );

        // Step 2: Search
        let raw = search(cube, &stats, config.search_type)?;
        diagnostics.raw_detections = raw.len();

        // Step 3: First merge
        let params = MergeParams::from_config(&config);
        let floors = RejectionFloors::from_config(&config);
        let mut detections = if config.flag_two_stage_merging {
            merge_two_stage(raw.groups, &params)
        } else {
            merge_detections(raw.into_flat(), &params)
        };
        diagnostics.after_first_merge = detections.len();

        if config.flag_reject_before_merge {
            detections = reject_detections(detections, &floors);
            diagnostics.rejected_before_merge = diagnostics.after_first_merge - detections.len();
        }

        // Step 4: Growth and second merge
        if config.flag_growth {
            let level = config
                .growth_threshold
                .unwrap_or_else(|| stats.snr_to_value(config.growth_cut));
            if level < stats.threshold() {
                diagnostics.grown_voxels = grow_detections(&mut detections, cube, level);
                detections = merge_detections(detections, &params);
            } else {
                tracing::warn!(
                    growth_level = level,
                    threshold = stats.threshold(),
                    "Growth level is not below the detection threshold, skipping growth"
                );
            }
        }
        diagnostics.after_growth = detections.len();
        diagnostics.after_merge = detections.len();

        // Step 5: Rejection
        let mut detections = reject_detections(detections, &floors);
        diagnostics.rejected = diagnostics.after_merge - detections.len();

        // Step 6: Parameters, ordering and IDs
        detections
            .par_iter_mut()
            .try_for_each(|det| det.calc_fluxes(cube))?;
        sort_by_position(&mut detections);
        for (i, det) in detections.iter_mut().enumerate() {
            det.set_id(i + 1);
        }
        diagnostics.final_count = detections.len();

        tracing::info!(
            raw = diagnostics.raw_detections,
            merged = diagnostics.after_merge,
            grown_voxels = diagnostics.grown_voxels,
            rejected = diagnostics.rejected,
            detections = diagnostics.final_count,
            "Source finding complete"
        );

        Ok(FindResult {
            detections,
            stats,
            diagnostics,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Select the noise estimator, then set the threshold: manual value, then FDR,
/// then the SNR cut.
fn apply_threshold(
    cube: &FluxCube,
    mut stats: StatsContainer,
    config: &Config,
) -> Result<StatsContainer, FindError> {
    stats.set_use_robust(config.flag_robust_stats);
    if let Some(threshold) = config.threshold {
        stats.set_threshold(threshold);
    } else if config.flag_fdr {
        stats.setup_fdr(
            &cube.valid_values(),
            config.alpha_fdr,
            config.num_correlated_voxels(),
        )?;
    } else {
        stats.set_threshold_snr(config.snr_cut);
    }
    Ok(stats)
}

/// Sort by channel centre, then x centre.
fn sort_by_position(detections: &mut [Detection]) {
    detections.sort_by(|a, b| {
        let (ax, _, az) = a.centre().unwrap_or_default();
        let (bx, _, bz) = b.centre().unwrap_or_default();
        az.total_cmp(&bz).then(ax.total_cmp(&bx))
    });
}
