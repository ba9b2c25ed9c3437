//! Variance-based foreground segmentation.
//!
//! A block is ridge-bearing when its standard deviation exceeds
//! `relative_threshold × global stddev`. The block mask is cleaned with a
//! 3×3 block open/close and then used to produce
//! - the normalised image zeroed outside the foreground (visualisation),
//! - a per-block zero-mean, unit-variance image (foreground only, 0 elsewhere)
//!   consumed by the frequency and Gabor stages,
//! - the pixel-resolution mask.

use crate::grid::{BlockCoord, BlockGrid, BlockMask};
use crate::image::f32::mean_variance;
use crate::image::{BinaryImage, ImageF32};
use crate::morphology::{close3x3, open3x3};
use crate::params::SegmentParams;
use log::debug;

#[derive(Clone, Debug)]
pub struct Segmentation {
    /// Normalised image with background pixels set to 0.
    pub segmented: ImageF32,
    /// Per-block standardised image; only meaningful inside the foreground.
    pub local_normalized: ImageF32,
    pub block_mask: BlockMask,
    /// Block mask replicated to pixel resolution.
    pub mask: BinaryImage,
}

/// Per-block (mean, stddev) of `image`.
pub fn block_statistics(image: &ImageF32, grid: &BlockGrid) -> Vec<(f32, f32)> {
    grid.map_blocks(|b| block_mean_std(image, grid, b))
}

fn block_mean_std(image: &ImageF32, grid: &BlockGrid, block: BlockCoord) -> (f32, f32) {
    let rect = grid.block_rect(block);
    let (mean, var) = mean_variance(rect.pixels().map(|p| image.get(p.x, p.y)));
    (mean as f32, var.sqrt() as f32)
}

pub fn segment(normalized: &ImageF32, block_size: usize, params: &SegmentParams) -> Segmentation {
    let grid = BlockGrid::new(normalized.w, normalized.h, block_size);
    let (_, global_var) = normalized.mean_variance();
    let threshold = params.relative_threshold * global_var.sqrt() as f32;

    let stats = block_statistics(normalized, &grid);
    let raw = BlockMask::new(grid, stats.iter().map(|&(_, std)| std > threshold).collect());
    let block_mask = if params.smooth_mask {
        close3x3(&open3x3(&raw))
    } else {
        raw.clone()
    };
    debug!(
        "segment: {}x{} blocks, threshold={threshold:.3}, foreground {} raw / {} smoothed",
        grid.rows,
        grid.cols,
        raw.foreground_count(),
        block_mask.foreground_count()
    );

    let mask = block_mask.to_pixel_mask();
    let mut segmented = ImageF32::new(normalized.w, normalized.h);
    let mut local_normalized = ImageF32::new(normalized.w, normalized.h);
    for block in grid.blocks() {
        if !block_mask.is_foreground(block) {
            continue;
        }
        let (mean, std) = stats[grid.index(block)];
        for p in grid.block_rect(block).pixels() {
            let v = normalized.get(p.x, p.y);
            segmented.set(p.x, p.y, v);
            // Blocks switched on by closing may be flat.
            let z = if std > f32::EPSILON { (v - mean) / std } else { 0.0 };
            local_normalized.set(p.x, p.y, z);
        }
    }

    Segmentation {
        segmented,
        local_normalized,
        block_mask,
        mask,
    }
}
