//! Minimal binary morphology on block masks.
//!
//! The structuring element is the 3×3 block square. Blocks outside the grid
//! are ignored, so the grid border neither erodes nor grows the mask.

use crate::grid::{BlockCoord, BlockMask};

pub fn erode3x3(src: &BlockMask) -> BlockMask {
    apply3x3(src, |it| it.flatten().all(|v| v))
}

pub fn dilate3x3(src: &BlockMask) -> BlockMask {
    apply3x3(src, |it| it.flatten().any(|v| v))
}

/// Erosion then dilation: removes foreground specks smaller than 3×3 blocks.
pub fn open3x3(src: &BlockMask) -> BlockMask {
    dilate3x3(&erode3x3(src))
}

/// Dilation then erosion: fills background holes smaller than 3×3 blocks.
pub fn close3x3(src: &BlockMask) -> BlockMask {
    erode3x3(&dilate3x3(src))
}

fn apply3x3<F>(src: &BlockMask, reduce: F) -> BlockMask
where
    F: Fn(&mut dyn Iterator<Item = Option<bool>>) -> bool,
{
    let grid = src.grid;
    let values = grid
        .blocks()
        .map(|b: BlockCoord| {
            let mut neighborhood = (-1isize..=1).flat_map(|dr| {
                (-1isize..=1).map(move |dc| {
                    b.offset(dr, dc, &grid).map(|n| src.is_foreground(n))
                })
            });
            reduce(&mut neighborhood)
        })
        .collect();
    BlockMask::new(grid, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::BlockGrid;

    fn mask_5x5(set: impl Fn(usize, usize) -> bool) -> BlockMask {
        let grid = BlockGrid::new(5, 5, 1);
        let values = grid.blocks().map(|b| set(b.row, b.col)).collect();
        BlockMask::new(grid, values)
    }

    #[test]
    fn open_removes_single_block_speck() {
        let mask = mask_5x5(|r, c| r == 2 && c == 2);
        assert_eq!(open3x3(&mask).foreground_count(), 0);
    }

    #[test]
    fn close_fills_single_block_hole() {
        let mask = mask_5x5(|r, c| !(r == 2 && c == 2));
        let closed = close3x3(&mask);
        assert!(closed.is_foreground(BlockCoord::new(2, 2)));
    }

    #[test]
    fn open_keeps_full_mask() {
        let mask = mask_5x5(|_, _| true);
        assert_eq!(open3x3(&mask).foreground_count(), 25);
    }

    #[test]
    fn grid_border_does_not_erode() {
        let grid = BlockGrid::new(2, 2, 1);
        let mask = BlockMask::filled(grid, true);
        assert_eq!(erode3x3(&mask).foreground_count(), 4);
    }
}
