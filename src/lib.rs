#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod image;
pub mod params;
pub mod pipeline;
pub mod render;
pub mod types;

// Stage implementations, usable on their own.
pub mod frequency;
pub mod gabor;
pub mod minutiae;
pub mod normalize;
pub mod orientation;
pub mod segmentation;
pub mod singularity;
pub mod skeleton;

// Numeric building blocks shared by the stages.
pub mod angle;
pub mod filters;
pub mod gradient;
pub mod grid;
pub mod morphology;

// --- High-level re-exports -------------------------------------------------

pub use crate::error::{Error, Result};
pub use crate::params::{CompactParams, PipelineParams};
pub use crate::pipeline::{run, run_compact, FeatureExtractor, PipelineResult, StageKind};
pub use crate::types::{FeatureSet, Minutia, MinutiaKind, Singularity, SingularityKind};

pub use crate::diagnostics::{FeatureReport, StageRecord, TimingBreakdown};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use fingerprint_features::prelude::*;
///
/// # fn main() -> fingerprint_features::Result<()> {
/// let (w, h) = (256usize, 256usize);
/// let gray = vec![255u8; w * h];
/// let img = ImageU8 { w, h, stride: w, data: &gray };
///
/// let extractor = FeatureExtractor::new(PipelineParams::default());
/// let result = extractor.process(img)?;
/// println!("minutiae={} total_ms={:.3}", result.features.minutiae.len(), result.timings.total_ms);
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::image::ImageU8;
    pub use crate::{FeatureExtractor, FeatureSet, MinutiaKind, PipelineParams, SingularityKind};
}

// --- Stage-level API (for tools & advanced users) --------------------------

pub mod stages {
    // Stage runners.
    pub use crate::frequency::estimate_frequency;
    pub use crate::gabor::enhance;
    pub use crate::minutiae::{detect as detect_minutiae, extract_minutiae, minutia_at};
    pub use crate::normalize::normalize;
    pub use crate::orientation::{estimate_orientation, smooth_orientation};
    pub use crate::segmentation::segment;
    pub use crate::singularity::{classify, extract_singularities, poincare_index};
    pub use crate::skeleton::thin;

    // Stage outputs.
    pub use crate::frequency::FrequencyField;
    pub use crate::gabor::Enhancement;
    pub use crate::grid::{BlockCoord, BlockGrid, BlockMask, PixelCoord};
    pub use crate::orientation::OrientationField;
    pub use crate::segmentation::Segmentation;
    pub use crate::skeleton::Skeleton;
}
