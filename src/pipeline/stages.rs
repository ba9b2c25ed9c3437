use serde::Serialize;
use std::fmt;

/// Pipeline steps, in execution order. `Mosaic` is the composite built after
/// the feature stages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StageKind {
    Original,
    Normalization,
    Segmentation,
    Orientation,
    Frequency,
    Gabor,
    Skeleton,
    Minutiae,
    Singularities,
    Mosaic,
}

impl StageKind {
    pub const ALL: [StageKind; 10] = [
        StageKind::Original,
        StageKind::Normalization,
        StageKind::Segmentation,
        StageKind::Orientation,
        StageKind::Frequency,
        StageKind::Gabor,
        StageKind::Skeleton,
        StageKind::Minutiae,
        StageKind::Singularities,
        StageKind::Mosaic,
    ];

    /// Stage images combined into the mosaic, in tile order.
    pub const MOSAIC_TILES: [StageKind; 8] = [
        StageKind::Original,
        StageKind::Normalization,
        StageKind::Segmentation,
        StageKind::Orientation,
        StageKind::Gabor,
        StageKind::Skeleton,
        StageKind::Minutiae,
        StageKind::Singularities,
    ];

    /// Machine name, also used in file names and timing labels.
    pub fn name(self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Normalization => "normalization",
            Self::Segmentation => "segmentation",
            Self::Orientation => "orientation",
            Self::Frequency => "frequency",
            Self::Gabor => "gabor",
            Self::Skeleton => "skeleton",
            Self::Minutiae => "minutiae",
            Self::Singularities => "singularities",
            Self::Mosaic => "mosaic",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Original => "Original image",
            Self::Normalization => "Normalization",
            Self::Segmentation => "Segmentation",
            Self::Orientation => "Orientation field",
            Self::Frequency => "Ridge frequency",
            Self::Gabor => "Gabor filter",
            Self::Skeleton => "Skeletonization",
            Self::Minutiae => "Minutiae",
            Self::Singularities => "Singularities",
            Self::Mosaic => "Mosaic",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Original => "8-bit grayscale input as received.",
            Self::Normalization => {
                "Pixel intensities rescaled to a target mean and variance so later thresholds are input-independent."
            }
            Self::Segmentation => {
                "Blocks with low intensity variance are classified as background and masked out."
            }
            Self::Orientation => {
                "Per-block ridge direction from the Sobel gradient structure tensor, drawn as green segments."
            }
            Self::Frequency => {
                "Per-block ridge wavelength from oriented projections; unreliable blocks are black."
            }
            Self::Gabor => {
                "Orientation- and frequency-tuned band-pass filtering; negative response marks ridge pixels."
            }
            Self::Skeleton => "Ridges thinned to one pixel width with Guo-Hall parallel thinning.",
            Self::Minutiae => {
                "Crossing-number scan of the skeleton: red discs are ridge endings, green discs bifurcations."
            }
            Self::Singularities => {
                "Poincaré index over the orientation field: orange boxes are loops, red deltas, magenta whorls."
            }
            Self::Mosaic => "All stage visualisations tiled into one image.",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
