//! Global mean/variance normalisation.
//!
//! Each pixel `v` maps to `M0 ± sqrt(V0 · (v − μ)² / σ²)`, taking the sign of
//! `v − μ`. The output therefore has exactly mean `M0` and variance `V0`
//! (up to float rounding). A uniform input (σ² = 0) maps to a uniform `M0`.

use crate::image::ImageF32;
use crate::params::NormalizeParams;
use log::debug;

pub fn normalize(src: &ImageF32, params: &NormalizeParams) -> ImageF32 {
    let (mean, var) = src.mean_variance();
    let m0 = params.target_mean;
    if var <= f64::EPSILON {
        debug!("normalize: uniform input (mean={mean:.3}), returning constant {m0}");
        return ImageF32::filled(src.w, src.h, m0);
    }
    let v0 = f64::from(params.target_variance);
    let mut out = ImageF32::new(src.w, src.h);
    for (dst, &v) in out.data.iter_mut().zip(&src.data) {
        let d = f64::from(v) - mean;
        let dev = (v0 * d * d / var).sqrt() as f32;
        *dst = if d > 0.0 { m0 + dev } else { m0 - dev };
    }
    debug!(
        "normalize: mean {mean:.3} -> {m0}, variance {var:.3} -> {}",
        params.target_variance
    );
    out
}
