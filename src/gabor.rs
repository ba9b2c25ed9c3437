//! Oriented Gabor enhancement.
//!
//! Each foreground block is filtered with an even-symmetric Gabor kernel tuned
//! to the block's ridge orientation θ and frequency f:
//!
//! `g(x, y) = exp(−(x² + y²) / σ²) · (cos(2πf·(−x·sinθ + y·cosθ)) − c₀)`
//!
//! with `σ = sigma_factor / f` and `c₀` chosen so the kernel has no DC
//! response. Kernels are cached by quantised (angle, frequency) key. Ridges
//! are dark in the input, so a negative response marks a ridge pixel.
//! Background blocks, and foreground blocks without any usable frequency,
//! are left at zero response and never become ridge.

use crate::error::{Error, Result};
use crate::frequency::FrequencyField;
use crate::grid::{BlockCoord, BlockGrid, BlockMask};
use crate::image::{BinaryImage, GrayImageU8, ImageF32};
use crate::orientation::OrientationField;
use crate::params::GaborParams;
use crate::pipeline::StageKind;
use log::debug;
use std::collections::HashMap;
use std::f32::consts::PI;

/// Cache key: orientation bin and frequency in hundredths of a cycle per pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KernelKey {
    pub angle_bin: u32,
    pub freq_centi: u32,
}

impl KernelKey {
    pub fn quantize(theta: f32, frequency: f32, angle_step_deg: f32) -> Self {
        let bins = (180.0 / angle_step_deg).round().max(1.0) as u32;
        let bin = (theta.to_degrees() / angle_step_deg).round() as u32 % bins;
        Self {
            angle_bin: bin,
            freq_centi: (frequency * 100.0).round().max(1.0) as u32,
        }
    }
}

/// Square `(2r + 1)²` kernel in row-major order.
#[derive(Clone, Debug)]
pub struct GaborKernel {
    pub radius: usize,
    pub taps: Vec<f32>,
}

impl GaborKernel {
    pub fn new(theta: f32, frequency: f32, sigma_factor: f32) -> Self {
        let sigma = sigma_factor / frequency;
        // exp(−r²/σ²) is a Gaussian with std σ/√2; cover three of those.
        let radius = ((3.0 * sigma / std::f32::consts::SQRT_2).round() as usize).max(1);
        let side = 2 * radius + 1;
        let (s, c) = theta.sin_cos();
        let mut envelope = Vec::with_capacity(side * side);
        let mut carrier = Vec::with_capacity(side * side);
        for dy in 0..side {
            for dx in 0..side {
                let x = dx as f32 - radius as f32;
                let y = dy as f32 - radius as f32;
                envelope.push((-(x * x + y * y) / (sigma * sigma)).exp());
                carrier.push((2.0 * PI * frequency * (-x * s + y * c)).cos());
            }
        }
        let env_sum: f32 = envelope.iter().sum();
        let dc = envelope.iter().zip(&carrier).map(|(e, c)| e * c).sum::<f32>() / env_sum;
        let taps = envelope
            .iter()
            .zip(&carrier)
            .map(|(e, c)| e * (c - dc))
            .collect();
        Self { radius, taps }
    }

    pub fn side(&self) -> usize {
        2 * self.radius + 1
    }

    /// Correlate the kernel with `image` centred at (x, y), clamping at borders.
    pub fn response_at(&self, image: &ImageF32, x: usize, y: usize) -> f32 {
        let r = self.radius;
        let side = self.side();
        let inside = x >= r && y >= r && x + r < image.w && y + r < image.h;
        let mut acc = 0.0;
        if inside {
            for (ky, krow) in self.taps.chunks_exact(side).enumerate() {
                let start = image.idx(x - r, y + ky - r);
                let irow = &image.data[start..start + side];
                acc += krow.iter().zip(irow).map(|(k, v)| k * v).sum::<f32>();
            }
        } else {
            let max_x = image.w as isize - 1;
            let max_y = image.h as isize - 1;
            for (ky, krow) in self.taps.chunks_exact(side).enumerate() {
                let sy = (y as isize + ky as isize - r as isize).clamp(0, max_y) as usize;
                for (kx, k) in krow.iter().enumerate() {
                    let sx = (x as isize + kx as isize - r as isize).clamp(0, max_x) as usize;
                    acc += k * image.get(sx, sy);
                }
            }
        }
        acc
    }
}

/// Kernels for every (angle, frequency) pair the image needs.
#[derive(Debug, Default)]
pub struct GaborBank {
    kernels: HashMap<KernelKey, GaborKernel>,
}

impl GaborBank {
    pub fn get_or_build(&mut self, key: KernelKey, params: &GaborParams) -> &GaborKernel {
        self.kernels.entry(key).or_insert_with(|| {
            let theta = (key.angle_bin as f32 * params.angle_step_deg).to_radians();
            let frequency = key.freq_centi as f32 / 100.0;
            GaborKernel::new(theta, frequency, params.sigma_factor)
        })
    }

    pub fn get(&self, key: &KernelKey) -> Option<&GaborKernel> {
        self.kernels.get(key)
    }

    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }
}

/// Output of the Gabor stage.
#[derive(Clone, Debug)]
pub struct Enhancement {
    /// Raw filter response, 0 outside filtered blocks.
    pub response: ImageF32,
    /// Ridge pixels (response < 0 inside filtered blocks).
    pub ridges: BinaryImage,
    pub filtered_blocks: usize,
    pub kernel_count: usize,
}

impl Enhancement {
    /// Ridge pixels black on white.
    pub fn to_gray(&self) -> GrayImageU8 {
        self.ridges.to_gray(0, 255)
    }
}

pub fn enhance(
    image: &ImageF32,
    mask: &BlockMask,
    orientation: &OrientationField,
    frequency: &FrequencyField,
    params: &GaborParams,
) -> Result<Enhancement> {
    let grid = mask.grid;
    if orientation.grid != grid || frequency.grid != grid {
        return Err(Error::stage(
            StageKind::Gabor,
            "orientation, frequency and mask use different block grids",
        ));
    }
    if (image.w, image.h) != (grid.width, grid.height) {
        return Err(Error::stage(
            StageKind::Gabor,
            format!(
                "image is {}x{} but the mask covers {}x{}",
                image.w, image.h, grid.width, grid.height
            ),
        ));
    }

    let fallback = if params.median_fallback {
        frequency.median_wavelength().map(|l| 1.0 / l)
    } else {
        None
    };
    let keys: Vec<Option<KernelKey>> = grid
        .blocks()
        .map(|b| {
            if !mask.is_foreground(b) {
                return None;
            }
            let f = frequency.frequency(b).or(fallback)?;
            Some(KernelKey::quantize(
                orientation.angle(b),
                f,
                params.angle_step_deg,
            ))
        })
        .collect();

    let mut bank = GaborBank::default();
    for key in keys.iter().flatten() {
        bank.get_or_build(*key, params);
    }

    let responses = grid.map_blocks(|b| {
        let key = keys[grid.index(b)]?;
        let kernel = bank.get(&key)?;
        Some(filter_block(image, &grid, b, kernel))
    });

    let mut response = ImageF32::new(image.w, image.h);
    let mut ridges = BinaryImage::new(image.w, image.h);
    let mut filtered_blocks = 0;
    for (i, block_response) in responses.into_iter().enumerate() {
        let Some(values) = block_response else {
            continue;
        };
        filtered_blocks += 1;
        let rect = grid.block_rect(grid.coord(i));
        for (p, v) in rect.pixels().zip(values) {
            response.set(p.x, p.y, v);
            ridges.set(p.x, p.y, v < 0.0);
        }
    }
    debug!(
        "gabor: filtered {filtered_blocks} blocks with {} cached kernels, {} ridge pixels",
        bank.len(),
        ridges.count_set()
    );

    Ok(Enhancement {
        response,
        ridges,
        filtered_blocks,
        kernel_count: bank.len(),
    })
}

fn filter_block(
    image: &ImageF32,
    grid: &BlockGrid,
    block: BlockCoord,
    kernel: &GaborKernel,
) -> Vec<f32> {
    grid.block_rect(block)
        .pixels()
        .map(|p| kernel.response_at(image, p.x, p.y))
        .collect()
}
