//! Feature extraction pipeline.
//!
//! [`FeatureExtractor`] runs the stages strictly in sequence: normalization,
//! segmentation, orientation, frequency, Gabor enhancement, thinning,
//! minutiae and singularities. Every stage reads the previous outputs and
//! allocates its own. When rendering is enabled, stage visualisations and
//! the mosaic are produced afterwards from the finished outputs.
//!
//! Typical usage:
//! ```no_run
//! use fingerprint_features::image::ImageU8;
//! use fingerprint_features::{FeatureExtractor, PipelineParams};
//!
//! # fn example(gray: ImageU8) -> fingerprint_features::Result<()> {
//! let extractor = FeatureExtractor::new(PipelineParams::default());
//! let result = extractor.process(gray)?;
//! println!("{} minutiae", result.features.minutiae.len());
//! # Ok(())
//! # }
//! ```

mod reporting;
mod stages;

pub use stages::StageKind;

use crate::diagnostics::timing::elapsed_ms;
use crate::diagnostics::{FeatureReport, StageRecord, TimingBreakdown};
use crate::error::{Error, Result};
use crate::frequency::{estimate_frequency, FrequencyField};
use crate::gabor::{enhance, Enhancement};
use crate::image::io::decode_grayscale;
use crate::image::{GrayImageU8, ImageF32, ImageU8, ImageView};
use crate::minutiae;
use crate::normalize::normalize;
use crate::orientation::{estimate_orientation, OrientationField};
use crate::params::{CompactParams, PipelineParams};
use crate::segmentation::{segment, Segmentation};
use crate::singularity::extract_singularities;
use crate::skeleton::{thin, Skeleton};
use crate::types::FeatureSet;
use image::RgbImage;
use log::{debug, info, warn};
use std::time::Instant;

/// Every intermediate raster and field of one run, plus the features.
#[derive(Clone, Debug)]
pub struct PipelineResult {
    pub original: GrayImageU8,
    pub normalized: ImageF32,
    pub segmentation: Segmentation,
    pub orientation: OrientationField,
    pub frequency: FrequencyField,
    pub enhancement: Enhancement,
    pub skeleton: Skeleton,
    pub features: FeatureSet,
    /// Stage visualisations in execution order; empty when rendering is off.
    pub stages: Vec<StageRecord>,
    pub mosaic: Option<RgbImage>,
    pub timings: TimingBreakdown,
}

impl PipelineResult {
    pub fn stage(&self, kind: StageKind) -> Option<&StageRecord> {
        self.stages.iter().find(|r| r.kind == kind)
    }

    pub fn report(&self, params: &PipelineParams) -> FeatureReport {
        FeatureReport::from_result(self, params)
    }
}

/// Stateless driver holding the parameters of every stage.
#[derive(Clone, Debug, Default)]
pub struct FeatureExtractor {
    params: PipelineParams,
}

impl FeatureExtractor {
    pub fn new(params: PipelineParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    pub fn set_params(&mut self, params: PipelineParams) {
        self.params = params;
    }

    /// Run every stage to completion.
    pub fn process(&self, gray: ImageU8<'_>) -> Result<PipelineResult> {
        self.run_stages(gray, None)
    }

    /// Like [`process`](Self::process), but fail with
    /// [`Error::DeadlineExceeded`] if `deadline` passes before a stage starts.
    /// Nothing computed so far is returned.
    pub fn process_with_deadline(
        &self,
        gray: ImageU8<'_>,
        deadline: Instant,
    ) -> Result<PipelineResult> {
        self.run_stages(gray, Some(deadline))
    }

    /// Decode an encoded image (PNG, JPEG, BMP, TIFF) and process it.
    pub fn process_encoded(&self, bytes: &[u8]) -> Result<PipelineResult> {
        let gray = decode_grayscale(bytes)?;
        self.process(gray.as_view())
    }

    fn run_stages(&self, gray: ImageU8<'_>, deadline: Option<Instant>) -> Result<PipelineResult> {
        let p = &self.params;
        p.validate()?;
        check_input(&gray, p.block_size)?;

        let total_start = Instant::now();
        let mut clock = StageClock::new(deadline);

        let original = clock.stage(StageKind::Original, || Ok(copy_view(&gray)))?;
        let normalized = clock.stage(StageKind::Normalization, || {
            Ok(normalize(&ImageF32::from_u8(&gray), &p.normalize))
        })?;
        let segmentation = clock.stage(StageKind::Segmentation, || {
            Ok(segment(&normalized, p.block_size, &p.segment))
        })?;
        let mask = &segmentation.block_mask;
        let orientation = clock.stage(StageKind::Orientation, || {
            Ok(estimate_orientation(&normalized, p.block_size, &p.orientation))
        })?;
        let frequency = clock.stage(StageKind::Frequency, || {
            estimate_frequency(&segmentation.local_normalized, mask, &orientation, &p.frequency)
        })?;
        let enhancement = clock.stage(StageKind::Gabor, || {
            enhance(
                &segmentation.local_normalized,
                mask,
                &orientation,
                &frequency,
                &p.gabor,
            )
        })?;
        let skeleton = clock.stage(StageKind::Skeleton, || Ok(thin(&enhancement.ridges)))?;
        let minutiae = clock.stage(StageKind::Minutiae, || {
            Ok(minutiae::detect(&skeleton.ridges, &p.minutiae))
        })?;
        let singularities = clock.stage(StageKind::Singularities, || {
            extract_singularities(&orientation, mask, &p.singularity)
        })?;

        let mut result = PipelineResult {
            original,
            normalized,
            segmentation,
            orientation,
            frequency,
            enhancement,
            skeleton,
            features: FeatureSet {
                minutiae,
                singularities,
            },
            stages: Vec::new(),
            mosaic: None,
            timings: TimingBreakdown::default(),
        };

        if p.render {
            let (stages, mosaic) = clock.stage(StageKind::Mosaic, || {
                let stages = reporting::stage_records(&result, p);
                let mosaic = reporting::mosaic_of(&stages, p.mosaic)?;
                Ok((stages, mosaic))
            })?;
            result.stages = stages;
            result.mosaic = Some(mosaic);
        }

        let mut timings = clock.finish();
        timings.total_ms = elapsed_ms(total_start);
        info!(
            "extracted {} minutiae and {} singularities from {}x{} in {:.1} ms",
            result.features.minutiae.len(),
            result.features.singularities.len(),
            gray.w,
            gray.h,
            timings.total_ms
        );
        result.timings = timings;
        Ok(result)
    }
}

/// Run the pipeline once with `params`.
pub fn run(gray: ImageU8<'_>, params: &PipelineParams) -> Result<PipelineResult> {
    FeatureExtractor::new(params.clone()).process(gray)
}

/// Run the pipeline with the flat service-level parameter set.
pub fn run_compact(gray: ImageU8<'_>, compact: &CompactParams) -> Result<PipelineResult> {
    run(gray, &PipelineParams::from_compact(compact))
}

fn check_input(gray: &ImageU8<'_>, block_size: usize) -> Result<()> {
    if gray.w == 0 || gray.h == 0 {
        return Err(Error::EmptyInput);
    }
    if gray.is_empty() {
        return Err(Error::DegenerateInput(format!(
            "{}x{} view with stride {} needs more than {} bytes",
            gray.w,
            gray.h,
            gray.stride,
            gray.data.len()
        )));
    }
    if gray.w < block_size || gray.h < block_size {
        return Err(Error::DegenerateInput(format!(
            "{}x{} image is smaller than one {block_size}x{block_size} block",
            gray.w, gray.h
        )));
    }
    Ok(())
}

fn copy_view(gray: &ImageU8<'_>) -> GrayImageU8 {
    let mut data = Vec::with_capacity(gray.w * gray.h);
    for y in 0..gray.h {
        data.extend_from_slice(gray.row(y));
    }
    GrayImageU8::new(gray.w, gray.h, data)
}

/// Deadline check and timing around each stage.
struct StageClock {
    deadline: Option<Instant>,
    timings: TimingBreakdown,
}

impl StageClock {
    fn new(deadline: Option<Instant>) -> Self {
        Self {
            deadline,
            timings: TimingBreakdown::default(),
        }
    }

    fn stage<T>(&mut self, kind: StageKind, f: impl FnOnce() -> Result<T>) -> Result<T> {
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            warn!("deadline passed before stage {kind}; aborting");
            return Err(Error::DeadlineExceeded { stage: kind });
        }
        let start = Instant::now();
        let out = f()?;
        let ms = elapsed_ms(start);
        debug!("stage {kind} took {ms:.2} ms");
        self.timings.push(kind.name(), ms);
        Ok(out)
    }

    fn finish(self) -> TimingBreakdown {
        self.timings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::MosaicLayout;
    use std::time::Duration;

    fn view(w: usize, h: usize, data: &[u8]) -> ImageU8<'_> {
        ImageU8 {
            w,
            h,
            stride: w,
            data,
        }
    }

    #[test]
    fn empty_and_tiny_inputs_are_rejected() {
        let none: [u8; 0] = [];
        assert!(matches!(
            run(view(0, 0, &none), &PipelineParams::default()),
            Err(Error::EmptyInput)
        ));
        let tiny = [128u8; 8 * 8];
        assert!(matches!(
            run(view(8, 8, &tiny), &PipelineParams::default()),
            Err(Error::DegenerateInput(_))
        ));
        let short = [0u8; 10];
        assert!(matches!(
            run(view(32, 32, &short), &PipelineParams::default()),
            Err(Error::DegenerateInput(_))
        ));
    }

    #[test]
    fn invalid_params_fail_before_any_stage() {
        let data = [0u8; 32 * 32];
        let params = PipelineParams {
            block_size: 0,
            ..PipelineParams::default()
        };
        assert!(matches!(
            run(view(32, 32, &data), &params),
            Err(Error::InvalidParams(_))
        ));

        let small_mosaic = PipelineParams {
            mosaic: MosaicLayout { rows: 1, cols: 4 },
            ..PipelineParams::default()
        };
        assert!(matches!(
            run(view(32, 32, &data), &small_mosaic),
            Err(Error::InvalidParams(_))
        ));
    }

    #[test]
    fn expired_deadline_aborts_at_first_stage() {
        let data = [0u8; 32 * 32];
        let extractor = FeatureExtractor::default();
        let past = Instant::now()
            .checked_sub(Duration::from_millis(5))
            .unwrap_or_else(Instant::now);
        let err = extractor.process_with_deadline(view(32, 32, &data), past);
        assert!(matches!(
            err,
            Err(Error::DeadlineExceeded {
                stage: StageKind::Original
            })
        ));
    }

    #[test]
    fn every_stage_is_timed_in_order() {
        let data: Vec<u8> = (0..64 * 64).map(|i| ((i % 64) / 4 % 2 * 200) as u8).collect();
        let result = run(view(64, 64, &data), &PipelineParams::default()).unwrap();
        let labels: Vec<&str> = result.timings.stages.iter().map(|s| s.label.as_str()).collect();
        let expected: Vec<&str> = StageKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(labels, expected);
        assert!(result.timings.total_ms >= 0.0);
        assert_eq!(result.stages.len(), 9);
        assert!(result.mosaic.is_some());
    }

    #[test]
    fn rendering_can_be_disabled() {
        let data = [90u8; 48 * 48];
        let params = PipelineParams {
            render: false,
            ..PipelineParams::default()
        };
        let result = run(view(48, 48, &data), &params).unwrap();
        assert!(result.stages.is_empty());
        assert!(result.mosaic.is_none());
        assert!(result.features.minutiae.is_empty());
    }
}
