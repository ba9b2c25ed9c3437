//! Ridge wavelength estimation by oriented projection.
//!
//! For every foreground block an oriented window is sampled around the block
//! centre: `window` pixels across the ridges by `block_size` pixels along
//! them. Averaging along the ridge direction yields a 1-D signature whose
//! local maxima are the valleys between ridges; the mean peak spacing is the
//! ridge wavelength, clipped into `[min_wavelength, max_wavelength]`.
//!
//! Blocks in the background, or whose signature has fewer than two peaks,
//! carry no estimate (`None`).

use crate::error::{Error, Result};
use crate::grid::{BlockCoord, BlockGrid, BlockMask};
use crate::image::ImageF32;
use crate::orientation::OrientationField;
use crate::params::FrequencyParams;
use crate::pipeline::StageKind;
use log::debug;
use nalgebra::{Point2, Rotation2, Vector2};

/// Per-block ridge wavelength in pixels; `None` marks an unreliable block.
#[derive(Clone, Debug, PartialEq)]
pub struct FrequencyField {
    pub grid: BlockGrid,
    pub wavelengths: Vec<Option<f32>>,
}

impl FrequencyField {
    #[inline]
    pub fn wavelength(&self, block: BlockCoord) -> Option<f32> {
        self.wavelengths[self.grid.index(block)]
    }

    /// Ridge frequency in cycles per pixel.
    #[inline]
    pub fn frequency(&self, block: BlockCoord) -> Option<f32> {
        self.wavelength(block).map(|l| 1.0 / l)
    }

    pub fn valid_count(&self) -> usize {
        self.wavelengths.iter().filter(|w| w.is_some()).count()
    }

    /// Median of the valid wavelengths, `None` when no block has an estimate.
    pub fn median_wavelength(&self) -> Option<f32> {
        let mut valid: Vec<f32> = self.wavelengths.iter().flatten().copied().collect();
        if valid.is_empty() {
            return None;
        }
        valid.sort_by(f32::total_cmp);
        let mid = valid.len() / 2;
        Some(if valid.len() % 2 == 0 {
            0.5 * (valid[mid - 1] + valid[mid])
        } else {
            valid[mid]
        })
    }
}

pub fn estimate_frequency(
    image: &ImageF32,
    mask: &BlockMask,
    orientation: &OrientationField,
    params: &FrequencyParams,
) -> Result<FrequencyField> {
    let grid = mask.grid;
    if orientation.grid != grid {
        return Err(Error::stage(
            StageKind::Frequency,
            "orientation field and mask use different block grids",
        ));
    }
    if (image.w, image.h) != (grid.width, grid.height) {
        return Err(Error::stage(
            StageKind::Frequency,
            format!(
                "image is {}x{} but the mask covers {}x{}",
                image.w, image.h, grid.width, grid.height
            ),
        ));
    }

    let wavelengths = grid.map_blocks(|b| {
        if !mask.is_foreground(b) {
            return None;
        }
        block_wavelength(image, &grid, b, orientation.angle(b), params)
    });
    let field = FrequencyField { grid, wavelengths };
    debug!(
        "frequency: {} of {} foreground blocks have an estimate, median wavelength {:?}",
        field.valid_count(),
        mask.foreground_count(),
        field.median_wavelength()
    );
    Ok(field)
}

fn block_wavelength(
    image: &ImageF32,
    grid: &BlockGrid,
    block: BlockCoord,
    theta: f32,
    params: &FrequencyParams,
) -> Option<f32> {
    let rect = grid.block_rect(block);
    let center = Point2::new(
        (rect.x0 + rect.x1) as f32 * 0.5 - 0.5,
        (rect.y0 + rect.y1) as f32 * 0.5 - 0.5,
    );
    let signature = ridge_signature(image, center, theta, params.window, grid.block_size);
    let peaks = find_peaks(&signature, params.peak_kernel);
    mean_peak_spacing(&peaks)
        .map(|spacing| spacing.clamp(params.min_wavelength, params.max_wavelength))
}

/// Sample an oriented `across × along` window centred at `center` and average
/// it along the ridge direction `theta`.
pub fn ridge_signature(
    image: &ImageF32,
    center: Point2<f32>,
    theta: f32,
    across: usize,
    along: usize,
) -> Vec<f32> {
    let rot = Rotation2::new(theta);
    let tangent = rot * Vector2::x();
    let normal = rot * Vector2::y();
    let half_across = (across as f32 - 1.0) * 0.5;
    let half_along = (along as f32 - 1.0) * 0.5;
    (0..across)
        .map(|i| {
            let u = i as f32 - half_across;
            let sum: f32 = (0..along)
                .map(|j| {
                    let v = j as f32 - half_along;
                    let p = center + normal * u + tangent * v;
                    image.sample_bilinear(p.x, p.y)
                })
                .sum();
            sum / along.max(1) as f32
        })
        .collect()
}

/// Indices that equal the maximum of their `kernel`-wide neighbourhood and
/// exceed the signal mean. Indices whose neighbourhood would leave the
/// signal are skipped; on plateaus only the leftmost sample counts.
pub fn find_peaks(signal: &[f32], kernel: usize) -> Vec<usize> {
    let half = kernel / 2;
    if signal.len() <= 2 * half {
        return Vec::new();
    }
    let mean = signal.iter().sum::<f32>() / signal.len() as f32;
    (half..signal.len() - half)
        .filter(|&i| {
            let v = signal[i];
            let window_max = signal[i - half..=i + half]
                .iter()
                .copied()
                .fold(f32::NEG_INFINITY, f32::max);
            let rises = i == 0 || signal[i - 1] < v;
            v >= window_max && rises && v > mean
        })
        .collect()
}

/// Average distance between consecutive peaks; `None` with fewer than two.
pub fn mean_peak_spacing(peaks: &[usize]) -> Option<f32> {
    match peaks {
        [first, .., last] if peaks.len() >= 2 => {
            Some((last - first) as f32 / (peaks.len() - 1) as f32)
        }
        _ => None,
    }
}
