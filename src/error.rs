//! Error taxonomy shared by every stage and by the I/O helpers.
//!
//! Only whole-pipeline-fatal conditions are represented here. Per-block
//! conditions (an unreliable ridge frequency, a block on the mask boundary)
//! are resolved inside the owning stage.

use crate::pipeline::StageKind;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Input bytes are not a decodable image.
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// No input was supplied (zero bytes or a zero-sized raster).
    #[error("no input image supplied")]
    EmptyInput,

    /// The input exists but cannot be processed, e.g. smaller than one block.
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    /// A stage could not produce a defined output for its input.
    #[error("stage `{stage}` failed: {reason}")]
    Stage { stage: StageKind, reason: String },

    /// The per-request deadline elapsed before `stage` could start.
    #[error("deadline exceeded before stage `{stage}`")]
    DeadlineExceeded { stage: StageKind },

    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn stage(stage: StageKind, reason: impl Into<String>) -> Self {
        Self::Stage {
            stage,
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
