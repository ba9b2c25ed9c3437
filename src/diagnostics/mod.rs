//! Diagnostics data model returned next to the extracted features.
//!
//! [`StageRecord`] carries the visualisation of one stage, [`TimingBreakdown`]
//! the wall-clock cost of each stage, and [`FeatureReport`] bundles both with
//! the feature lists into the JSON document written by the CLI.

pub mod pipeline;
pub mod stage;
pub mod timing;

pub use pipeline::{FeatureCounts, FeatureReport, InputDescriptor, StageStats, StageSummary};
pub use stage::StageRecord;
pub use timing::{StageTiming, TimingBreakdown};
