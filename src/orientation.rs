//! Block orientation field from pixel gradients.
//!
//! For each block the gradient structure tensor is accumulated as
//! `Gxx = Σ 2·gx·gy` and `Gyy = Σ (gx² − gy²)`; the dominant gradient direction
//! is `½·atan2(Gxx, Gyy)` and the ridge runs perpendicular to it, so the block
//! angle is that plus π/2, wrapped into [0, π). Angles are measured from the
//! +x axis towards +y (image rows grow downwards).
//!
//! Optional smoothing averages doubled-angle vectors with a 5-tap Gaussian over
//! the block grid.

use crate::angle::{doubled_angle_vector, normalize_half_pi, orientation_from_doubled};
use crate::filters::{convolve_separable, GAUSSIAN_5TAP};
use crate::gradient::{sobel_gradients, Grad};
use crate::grid::{BlockCoord, BlockGrid};
use crate::image::ImageF32;
use crate::params::OrientationParams;
use log::debug;
use nalgebra::Vector2;
use std::f32::consts::FRAC_PI_2;

/// One ridge angle per block, each in [0, π).
#[derive(Clone, Debug, PartialEq)]
pub struct OrientationField {
    pub grid: BlockGrid,
    pub angles: Vec<f32>,
}

impl OrientationField {
    /// Build from a per-block function; results are wrapped into [0, π).
    pub fn from_fn(grid: BlockGrid, f: impl Fn(BlockCoord) -> f32) -> Self {
        let angles = grid.blocks().map(|b| normalize_half_pi(f(b))).collect();
        Self { grid, angles }
    }

    #[inline]
    pub fn angle(&self, block: BlockCoord) -> f32 {
        self.angles[self.grid.index(block)]
    }

    #[inline]
    pub fn angle_deg(&self, block: BlockCoord) -> f32 {
        self.angle(block).to_degrees()
    }

    /// Unit ridge direction of a block in pixel space.
    pub fn direction(&self, block: BlockCoord) -> Vector2<f32> {
        let (s, c) = self.angle(block).sin_cos();
        Vector2::new(c, s)
    }
}

pub fn estimate_orientation(
    image: &ImageF32,
    block_size: usize,
    params: &OrientationParams,
) -> OrientationField {
    let grid = BlockGrid::new(image.w, image.h, block_size);
    let grad = sobel_gradients(image);
    let angles = grid.map_blocks(|b| block_angle(&grad, &grid, b));
    let field = OrientationField { grid, angles };
    debug!(
        "orientation: {}x{} blocks, smooth={}",
        grid.rows, grid.cols, params.smooth
    );
    if params.smooth {
        smooth_orientation(&field)
    } else {
        field
    }
}

fn block_angle(grad: &Grad, grid: &BlockGrid, block: BlockCoord) -> f32 {
    let mut gxy = 0.0f64;
    let mut gxx_yy = 0.0f64;
    for p in grid.block_rect(block).pixels() {
        let gx = f64::from(grad.gx.get(p.x, p.y));
        let gy = f64::from(grad.gy.get(p.x, p.y));
        gxy += 2.0 * gx * gy;
        gxx_yy += gx * gx - gy * gy;
    }
    if gxy == 0.0 && gxx_yy == 0.0 {
        return 0.0;
    }
    normalize_half_pi(0.5 * gxy.atan2(gxx_yy) as f32 + FRAC_PI_2)
}

/// Average doubled-angle vectors over neighbouring blocks and recover angles.
pub fn smooth_orientation(field: &OrientationField) -> OrientationField {
    let grid = field.grid;
    let mut cos2 = ImageF32::new(grid.cols, grid.rows);
    let mut sin2 = ImageF32::new(grid.cols, grid.rows);
    for b in grid.blocks() {
        let v = doubled_angle_vector(field.angle(b));
        cos2.set(b.col, b.row, v.x);
        sin2.set(b.col, b.row, v.y);
    }
    let cos2 = convolve_separable(&cos2, &GAUSSIAN_5TAP);
    let sin2 = convolve_separable(&sin2, &GAUSSIAN_5TAP);
    OrientationField::from_fn(grid, |b| {
        orientation_from_doubled(&Vector2::new(cos2.get(b.col, b.row), sin2.get(b.col, b.row)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angle::angular_difference;
    use std::f32::consts::PI;

    /// Sinusoidal stripes whose ridges run along `theta`.
    fn stripes(w: usize, h: usize, theta: f32, period: f32) -> ImageF32 {
        let (s, c) = theta.sin_cos();
        let mut img = ImageF32::new(w, h);
        for y in 0..h {
            for x in 0..w {
                // Distance across the ridges.
                let d = -(x as f32) * s + y as f32 * c;
                img.set(x, y, 100.0 + 50.0 * (2.0 * PI * d / period).cos());
            }
        }
        img
    }

    #[test]
    fn recovers_stripe_orientation() {
        for deg in [0.0f32, 30.0, 90.0, 135.0] {
            let theta = deg.to_radians();
            let img = stripes(96, 96, theta, 9.0);
            let field = estimate_orientation(&img, 16, &OrientationParams::default());
            let inner = field.angle(BlockCoord::new(2, 2));
            assert!(
                angular_difference(inner, theta) < 3f32.to_radians(),
                "expected {deg}°, got {}°",
                inner.to_degrees()
            );
        }
    }

    #[test]
    fn angles_stay_in_half_open_range() {
        let img = stripes(64, 48, 2.0, 7.0);
        for smooth in [false, true] {
            let field = estimate_orientation(&img, 16, &OrientationParams { smooth });
            assert!(field.angles.iter().all(|&a| (0.0..PI).contains(&a)));
        }
        let flat = estimate_orientation(&ImageF32::new(32, 32), 16, &OrientationParams::default());
        assert!(flat.angles.iter().all(|&a| a == 0.0));
    }

    #[test]
    fn smoothing_respects_the_pi_seam() {
        let grid = BlockGrid::new(48, 48, 16);
        let field = OrientationField::from_fn(grid, |b| {
            if (b.row + b.col) % 2 == 0 {
                2f32.to_radians()
            } else {
                178f32.to_radians()
            }
        });
        let smoothed = smooth_orientation(&field);
        for &a in &smoothed.angles {
            assert!(angular_difference(a, 0.0) < 3f32.to_radians(), "got {}", a.to_degrees());
        }
    }
}
