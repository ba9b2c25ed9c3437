use crate::diagnostics::{StageRecord, TimingBreakdown};
use crate::params::PipelineParams;
use crate::pipeline::{PipelineResult, StageKind};
use crate::types::{FeatureSet, MinutiaKind, SingularityKind};
use serde::Serialize;
use std::collections::BTreeMap;

pub(crate) fn format_optional(val: Option<f32>) -> String {
    val.map(|v| format!("{:.3}", v))
        .unwrap_or_else(|| "-".to_string())
}

/// Serializable summary of one extraction run, written by the CLI next to
/// the stage images.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureReport {
    pub input: InputDescriptor,
    pub params: PipelineParams,
    pub stats: StageStats,
    pub counts: FeatureCounts,
    pub features: FeatureSet,
    pub timings: TimingBreakdown,
    pub stages: Vec<StageSummary>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub width: usize,
    pub height: usize,
    pub block_rows: usize,
    pub block_cols: usize,
}

/// Intermediate quantities that explain the feature counts.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageStats {
    pub foreground_blocks: usize,
    pub valid_frequency_blocks: usize,
    pub median_wavelength: Option<f32>,
    pub gabor_kernels: usize,
    pub ridge_pixels: usize,
    pub skeleton_pixels: usize,
    pub skeleton_iterations: usize,
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureCounts {
    pub endings: usize,
    pub bifurcations: usize,
    pub loops: usize,
    pub deltas: usize,
    pub whorls: usize,
}

/// A [`StageRecord`] without its raster.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageSummary {
    pub index: usize,
    pub kind: StageKind,
    pub name: String,
    pub description: String,
    pub details: String,
    pub parameters: BTreeMap<String, String>,
    pub width: u32,
    pub height: u32,
}

impl From<&StageRecord> for StageSummary {
    fn from(r: &StageRecord) -> Self {
        Self {
            index: r.index,
            kind: r.kind,
            name: r.name.clone(),
            description: r.description.clone(),
            details: r.details.clone(),
            parameters: r.parameters.clone(),
            width: r.image.width(),
            height: r.image.height(),
        }
    }
}

impl FeatureCounts {
    pub fn of(features: &FeatureSet) -> Self {
        Self {
            endings: features.count_minutiae(MinutiaKind::Ending),
            bifurcations: features.count_minutiae(MinutiaKind::Bifurcation),
            loops: features.count_singularities(SingularityKind::Loop),
            deltas: features.count_singularities(SingularityKind::Delta),
            whorls: features.count_singularities(SingularityKind::Whorl),
        }
    }
}

impl FeatureReport {
    pub fn from_result(result: &PipelineResult, params: &PipelineParams) -> Self {
        let grid = result.segmentation.block_mask.grid;
        Self {
            input: InputDescriptor {
                width: grid.width,
                height: grid.height,
                block_rows: grid.rows,
                block_cols: grid.cols,
            },
            params: params.clone(),
            stats: StageStats {
                foreground_blocks: result.segmentation.block_mask.foreground_count(),
                valid_frequency_blocks: result.frequency.valid_count(),
                median_wavelength: result.frequency.median_wavelength(),
                gabor_kernels: result.enhancement.kernel_count,
                ridge_pixels: result.enhancement.ridges.count_set(),
                skeleton_pixels: result.skeleton.ridges.count_set(),
                skeleton_iterations: result.skeleton.iterations,
            },
            counts: FeatureCounts::of(&result.features),
            features: result.features.clone(),
            timings: result.timings.clone(),
            stages: result.stages.iter().map(StageSummary::from).collect(),
        }
    }

    /// One-line human summary used by the CLI log.
    pub fn summary_line(&self) -> String {
        format!(
            "{}x{} px, {} foreground blocks, median wavelength {}, {} endings, {} bifurcations, {} loops, {} deltas, {} whorls in {:.1} ms",
            self.input.width,
            self.input.height,
            self.stats.foreground_blocks,
            format_optional(self.stats.median_wavelength),
            self.counts.endings,
            self.counts.bifurcations,
            self.counts.loops,
            self.counts.deltas,
            self.counts.whorls,
            self.timings.total_ms
        )
    }
}
