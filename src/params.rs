//! Parameter types configuring the pipeline stages.
//!
//! Every knob lives in one [`PipelineParams`] value that is passed through
//! the pipeline. Defaults reproduce the reference configuration: 16-pixel
//! blocks, mean/variance 100/100, segmentation threshold 0.2, wavelengths in
//! [5, 15] pixels, a 3×3 crossing-number ring and 1° singularity tolerance.

use crate::error::{Error, Result};
use crate::pipeline::StageKind;
use serde::{Deserialize, Serialize};

/// Pipeline-wide parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelineParams {
    /// Block side W in pixels.
    pub block_size: usize,
    pub normalize: NormalizeParams,
    pub segment: SegmentParams,
    pub orientation: OrientationParams,
    pub frequency: FrequencyParams,
    pub gabor: GaborParams,
    pub minutiae: MinutiaeParams,
    pub singularity: SingularityParams,
    pub mosaic: MosaicLayout,
    /// Produce stage visualisations alongside the feature data.
    pub render: bool,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            block_size: 16,
            normalize: NormalizeParams::default(),
            segment: SegmentParams::default(),
            orientation: OrientationParams::default(),
            frequency: FrequencyParams::default(),
            gabor: GaborParams::default(),
            minutiae: MinutiaeParams::default(),
            singularity: SingularityParams::default(),
            mosaic: MosaicLayout::default(),
            render: true,
        }
    }
}

impl PipelineParams {
    /// Reject parameter combinations no stage can work with.
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(Error::InvalidParams("blockSize must be positive".into()));
        }
        if !(self.normalize.target_variance > 0.0) {
            return Err(Error::InvalidParams(
                "normalize.targetVariance must be positive".into(),
            ));
        }
        if !(self.segment.relative_threshold >= 0.0) {
            return Err(Error::InvalidParams(
                "segment.relativeThreshold must be non-negative".into(),
            ));
        }
        let f = &self.frequency;
        if !(f.min_wavelength > 0.0 && f.min_wavelength <= f.max_wavelength) {
            return Err(Error::InvalidParams(format!(
                "wavelength bounds [{}, {}] are invalid",
                f.min_wavelength, f.max_wavelength
            )));
        }
        if f.window < 2 || f.peak_kernel == 0 {
            return Err(Error::InvalidParams(
                "frequency.window must be >= 2 and frequency.peakKernel >= 1".into(),
            ));
        }
        if !(self.gabor.sigma_factor > 0.0 && self.gabor.angle_step_deg > 0.0) {
            return Err(Error::InvalidParams(
                "gabor.sigmaFactor and gabor.angleStepDeg must be positive".into(),
            ));
        }
        if !(self.singularity.tolerance_deg >= 0.0) {
            return Err(Error::InvalidParams(
                "singularity.toleranceDeg must be non-negative".into(),
            ));
        }
        let tiles = StageKind::MOSAIC_TILES.len();
        if self.render && self.mosaic.cells() < tiles {
            return Err(Error::InvalidParams(format!(
                "a {}x{} mosaic cannot hold {tiles} stage images",
                self.mosaic.rows, self.mosaic.cols
            )));
        }
        Ok(())
    }

    /// Build from the compact parameter set exposed at the service boundary.
    pub fn from_compact(compact: &CompactParams) -> Self {
        let mut params = Self {
            block_size: compact.block_size,
            ..Self::default()
        };
        params.segment.relative_threshold = compact.variance_threshold;
        params.frequency.min_wavelength = compact.min_wave_length;
        params.frequency.max_wavelength = compact.max_wave_length;
        params.minutiae.kernel = compact.kernel_size;
        params.singularity.tolerance_deg = compact.tolerance;
        params
    }
}

/// Flat parameter set `{blockSize, varianceThreshold, minWaveLength,
/// maxWaveLength, kernelSize, tolerance}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompactParams {
    pub block_size: usize,
    pub variance_threshold: f32,
    pub min_wave_length: f32,
    pub max_wave_length: f32,
    pub kernel_size: ScanKernel,
    pub tolerance: f32,
}

impl Default for CompactParams {
    fn default() -> Self {
        let full = PipelineParams::default();
        Self {
            block_size: full.block_size,
            variance_threshold: full.segment.relative_threshold,
            min_wave_length: full.frequency.min_wavelength,
            max_wave_length: full.frequency.max_wavelength,
            kernel_size: full.minutiae.kernel,
            tolerance: full.singularity.tolerance_deg,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NormalizeParams {
    pub target_mean: f32,
    pub target_variance: f32,
}

impl Default for NormalizeParams {
    fn default() -> Self {
        Self {
            target_mean: 100.0,
            target_variance: 100.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SegmentParams {
    /// Foreground when block stddev exceeds this fraction of the global stddev.
    pub relative_threshold: f32,
    /// Apply a 3×3 block open/close to the mask.
    pub smooth_mask: bool,
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self {
            relative_threshold: 0.2,
            smooth_mask: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrientationParams {
    /// Smooth the doubled-angle vector field over neighbouring blocks.
    pub smooth: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FrequencyParams {
    /// Length of the oriented projection window across the ridges, pixels.
    pub window: usize,
    /// Width of the grey-dilation window used to pick projection peaks.
    pub peak_kernel: usize,
    pub min_wavelength: f32,
    pub max_wavelength: f32,
}

impl Default for FrequencyParams {
    fn default() -> Self {
        Self {
            window: 32,
            peak_kernel: 5,
            min_wavelength: 5.0,
            max_wavelength: 15.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GaborParams {
    /// Spatial spread σx = σy = `sigma_factor / f`.
    pub sigma_factor: f32,
    /// Orientation quantisation step of the kernel cache, degrees.
    pub angle_step_deg: f32,
    /// Filter foreground blocks without a frequency estimate at the median frequency.
    pub median_fallback: bool,
}

impl Default for GaborParams {
    fn default() -> Self {
        Self {
            sigma_factor: 0.65,
            angle_step_deg: 3.0,
            median_fallback: true,
        }
    }
}

/// Neighbourhood ring read by the crossing-number scan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScanKernel {
    /// The 8 neighbours of a 3×3 window.
    #[default]
    #[serde(rename = "3x3", alias = "3")]
    ThreeByThree,
    /// The 16 border pixels of a 5×5 window.
    #[serde(rename = "5x5", alias = "5")]
    FiveByFive,
}

impl ScanKernel {
    pub fn size(self) -> usize {
        match self {
            Self::ThreeByThree => 3,
            Self::FiveByFive => 5,
        }
    }

    pub fn radius(self) -> usize {
        self.size() / 2
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MinutiaeParams {
    pub kernel: ScanKernel,
    /// Skeleton pixels darker than this are ridge.
    pub ridge_threshold: u8,
}

impl Default for MinutiaeParams {
    fn default() -> Self {
        Self {
            kernel: ScanKernel::ThreeByThree,
            ridge_threshold: 10,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SingularityParams {
    /// Half-width of each classification band, degrees.
    pub tolerance_deg: f32,
}

impl Default for SingularityParams {
    fn default() -> Self {
        Self { tolerance_deg: 1.0 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MosaicLayout {
    pub rows: usize,
    pub cols: usize,
}

impl Default for MosaicLayout {
    fn default() -> Self {
        Self { rows: 2, cols: 4 }
    }
}

impl MosaicLayout {
    pub fn cells(self) -> usize {
        self.rows * self.cols
    }
}
