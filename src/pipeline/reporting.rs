use super::{PipelineResult, StageKind};
use crate::diagnostics::pipeline::format_optional;
use crate::diagnostics::StageRecord;
use crate::error::Result;
use crate::params::{MosaicLayout, PipelineParams};
use crate::render;
use crate::types::{MinutiaKind, SingularityKind};
use image::RgbImage;

/// Visualisations of every stage, numbered from 1 in execution order.
pub(super) fn stage_records(result: &PipelineResult, p: &PipelineParams) -> Vec<StageRecord> {
    let bs = p.block_size;
    let grid = result.segmentation.block_mask.grid;
    let skeleton_gray = result.skeleton.ridges.to_gray(0, 255);
    let features = &result.features;
    let (mean, variance) = result.normalized.mean_variance();

    vec![
        StageRecord::new(
            1,
            StageKind::Original,
            format!(
                "{} x {} pixels, 8-bit grayscale",
                result.original.width(),
                result.original.height()
            ),
            render::gray_to_rgb(&result.original),
        )
        .with_param("width", result.original.width())
        .with_param("height", result.original.height()),
        StageRecord::new(
            2,
            StageKind::Normalization,
            format!(
                "target mean {} / variance {}, achieved {mean:.1} / {variance:.1}",
                p.normalize.target_mean, p.normalize.target_variance
            ),
            render::f32_to_rgb(&result.normalized),
        )
        .with_param("targetMean", p.normalize.target_mean)
        .with_param("targetVariance", p.normalize.target_variance),
        StageRecord::new(
            3,
            StageKind::Segmentation,
            format!(
                "{bs}x{bs} blocks, threshold {} x std(image), {} of {} blocks foreground",
                p.segment.relative_threshold,
                result.segmentation.block_mask.foreground_count(),
                grid.len()
            ),
            render::f32_to_rgb(&result.segmentation.segmented),
        )
        .with_param("blockSize", bs)
        .with_param("varianceThreshold", p.segment.relative_threshold)
        .with_param("smoothMask", p.segment.smooth_mask),
        StageRecord::new(
            4,
            StageKind::Orientation,
            format!(
                "Sobel structure tensor over {bs}x{bs} blocks, smoothing {}",
                if p.orientation.smooth { "on" } else { "off" }
            ),
            render::orientation_overlay(
                &result.segmentation.segmented,
                &result.orientation,
                &result.segmentation.block_mask,
            ),
        )
        .with_param("blockSize", bs)
        .with_param("smooth", p.orientation.smooth),
        StageRecord::new(
            5,
            StageKind::Frequency,
            format!(
                "{} blocks with an estimate, median wavelength {} px",
                result.frequency.valid_count(),
                format_optional(result.frequency.median_wavelength())
            ),
            render::frequency_map(
                &result.frequency,
                p.frequency.min_wavelength,
                p.frequency.max_wavelength,
            ),
        )
        .with_param("window", p.frequency.window)
        .with_param("peakKernel", p.frequency.peak_kernel)
        .with_param("minWaveLength", p.frequency.min_wavelength)
        .with_param("maxWaveLength", p.frequency.max_wavelength),
        StageRecord::new(
            6,
            StageKind::Gabor,
            format!(
                "sigma = {}/f, {} blocks filtered with {} cached kernels",
                p.gabor.sigma_factor,
                result.enhancement.filtered_blocks,
                result.enhancement.kernel_count
            ),
            render::gray_to_rgb(&result.enhancement.to_gray()),
        )
        .with_param("sigmaFactor", p.gabor.sigma_factor)
        .with_param("angleStepDeg", p.gabor.angle_step_deg)
        .with_param("medianFallback", p.gabor.median_fallback),
        StageRecord::new(
            7,
            StageKind::Skeleton,
            format!(
                "Zhang-Suen, {} passes, {} ridge pixels",
                result.skeleton.iterations,
                result.skeleton.ridges.count_set()
            ),
            render::gray_to_rgb(&skeleton_gray),
        ),
        StageRecord::new(
            8,
            StageKind::Minutiae,
            format!(
                "{} endings (CN=1), {} bifurcations (CN=3)",
                features.count_minutiae(MinutiaKind::Ending),
                features.count_minutiae(MinutiaKind::Bifurcation)
            ),
            render::minutiae_overlay(&skeleton_gray, &features.minutiae),
        )
        .with_param("kernelSize", p.minutiae.kernel.size())
        .with_param("ridgeThreshold", p.minutiae.ridge_threshold),
        StageRecord::new(
            9,
            StageKind::Singularities,
            format!(
                "{} loops, {} deltas, {} whorls",
                features.count_singularities(SingularityKind::Loop),
                features.count_singularities(SingularityKind::Delta),
                features.count_singularities(SingularityKind::Whorl)
            ),
            render::singularity_overlay(&skeleton_gray, &features.singularities, bs),
        )
        .with_param("tolerance", p.singularity.tolerance_deg)
        .with_param("blockSize", bs),
    ]
}

/// Tile the stages of [`StageKind::MOSAIC_TILES`] in that order.
pub(super) fn mosaic_of(records: &[StageRecord], layout: MosaicLayout) -> Result<RgbImage> {
    let tiles: Vec<&RgbImage> = StageKind::MOSAIC_TILES
        .iter()
        .filter_map(|kind| records.iter().find(|r| r.kind == *kind))
        .map(|r| &r.image)
        .collect();
    render::mosaic(&tiles, layout)
}
