//! Separable smoothing.
//!
//! The orientation stage smooths its doubled-angle vector field over the block
//! grid with the 5-tap Gaussian below.
use crate::image::{ImageF32, ImageView, ImageViewMut};

/// Normalised 5-tap Gaussian `[1, 4, 6, 4, 1] / 16`.
pub const GAUSSIAN_5TAP: [f32; 5] = [0.0625, 0.25, 0.375, 0.25, 0.0625];

/// Convolve rows then columns with the 1-D `taps`, clamping samples at the
/// border.
pub fn convolve_separable(src: &ImageF32, taps: &[f32]) -> ImageF32 {
    let radius = (taps.len() / 2) as isize;
    let (w, h) = (src.w, src.h);
    if w == 0 || h == 0 || taps.is_empty() {
        return src.clone();
    }

    let mut horiz = ImageF32::new(w, h);
    for y in 0..h {
        let row = src.row(y);
        let out = horiz.row_mut(y);
        for (x, dst) in out.iter_mut().enumerate() {
            let mut acc = 0.0;
            for (k, &t) in taps.iter().enumerate() {
                let sx = (x as isize + k as isize - radius).clamp(0, w as isize - 1) as usize;
                acc += t * row[sx];
            }
            *dst = acc;
        }
    }

    let mut out = ImageF32::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0;
            for (k, &t) in taps.iter().enumerate() {
                let sy = (y as isize + k as isize - radius).clamp(0, h as isize - 1) as usize;
                acc += t * horiz.get(x, sy);
            }
            out.set(x, y, acc);
        }
    }
    out
}
