use crate::grid::BlockCoord;
use serde::Serialize;

/// Local ridge discontinuity found by the crossing-number scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MinutiaKind {
    /// Crossing number 1: the ridge terminates.
    Ending,
    /// Crossing number 3: the ridge splits in two.
    Bifurcation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Minutia {
    pub kind: MinutiaKind,
    pub x: usize,
    pub y: usize,
}

/// Topological class of an orientation-field singularity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SingularityKind {
    /// Poincaré index ≈ +180°, a core.
    Loop,
    /// Poincaré index ≈ −180°.
    Delta,
    /// Poincaré index ≈ +360°.
    Whorl,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Singularity {
    pub kind: SingularityKind,
    /// Block the index was evaluated at.
    pub block: BlockCoord,
    /// Centre pixel of that block.
    pub x: usize,
    pub y: usize,
    /// Accumulated orientation change around the block ring, degrees.
    pub poincare_index_deg: f32,
}

/// Structured features produced by one pipeline run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct FeatureSet {
    pub minutiae: Vec<Minutia>,
    pub singularities: Vec<Singularity>,
}

impl FeatureSet {
    pub fn count_minutiae(&self, kind: MinutiaKind) -> usize {
        self.minutiae.iter().filter(|m| m.kind == kind).count()
    }

    pub fn count_singularities(&self, kind: SingularityKind) -> usize {
        self.singularities.iter().filter(|s| s.kind == kind).count()
    }
}
