//! Poincaré-index singularity detection on the block orientation field.
//!
//! The eight blocks around a candidate are visited clockwise on screen
//! (rows grow downwards), starting top-left and returning to it. Each step
//! adds `next − prev` in degrees, folded into (−90°, 90°]. The total is
//! classified against bands of half-width `tolerance_deg`:
//!
//! | index  | class |
//! |--------|-------|
//! | +180°  | loop  |
//! | −180°  | delta |
//! | +360°  | whorl |
//!
//! Only blocks whose 5×5 block neighbourhood is entirely foreground are
//! evaluated.

use crate::angle::fold_orientation_delta_deg;
use crate::error::{Error, Result};
use crate::grid::{BlockCoord, BlockMask};
use crate::orientation::OrientationField;
use crate::params::SingularityParams;
use crate::pipeline::StageKind;
use crate::types::{Singularity, SingularityKind};
use log::debug;

/// (d_row, d_col) of the ring, clockwise from the top-left block.
const RING: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
];

/// Blocks of foreground required on every side of a candidate.
const NEIGHBOURHOOD_RADIUS: usize = 2;

/// Accumulated orientation change around `block`, in degrees. `None` when
/// part of the ring falls outside the grid.
pub fn poincare_index(field: &OrientationField, block: BlockCoord) -> Option<f32> {
    let mut angles = [0.0f32; 9];
    for (slot, &(dr, dc)) in angles.iter_mut().zip(RING.iter()) {
        *slot = field.angle_deg(block.offset(dr, dc, &field.grid)?);
    }
    angles[8] = angles[0];
    Some(
        angles
            .windows(2)
            .map(|w| fold_orientation_delta_deg(w[1] - w[0]))
            .sum(),
    )
}

pub fn classify(index_deg: f32, tolerance_deg: f32) -> Option<SingularityKind> {
    let near = |target: f32| (index_deg - target).abs() <= tolerance_deg;
    if near(180.0) {
        Some(SingularityKind::Loop)
    } else if near(-180.0) {
        Some(SingularityKind::Delta)
    } else if near(360.0) {
        Some(SingularityKind::Whorl)
    } else {
        None
    }
}

pub fn extract_singularities(
    field: &OrientationField,
    mask: &BlockMask,
    params: &SingularityParams,
) -> Result<Vec<Singularity>> {
    let grid = field.grid;
    if mask.grid != grid {
        return Err(Error::stage(
            StageKind::Singularities,
            "orientation field and mask use different block grids",
        ));
    }

    let found: Vec<Singularity> = grid
        .map_blocks(|block| {
            if !mask.neighborhood_is_foreground(block, NEIGHBOURHOOD_RADIUS) {
                return None;
            }
            let index = poincare_index(field, block)?;
            let kind = classify(index, params.tolerance_deg)?;
            let center = grid.block_center(block);
            Some(Singularity {
                kind,
                block,
                x: center.x,
                y: center.y,
                poincare_index_deg: index,
            })
        })
        .into_iter()
        .flatten()
        .collect();
    debug!(
        "singularities: {} found (tolerance {}°)",
        found.len(),
        params.tolerance_deg
    );
    Ok(found)
}
