//! Block grid overlay and the two coordinate spaces it separates.
//!
//! Pixel space is addressed by [`PixelCoord`] `(x, y)`; block space by
//! [`BlockCoord`] `(row, col)`. The two are never interchangeable: the only
//! conversions live on [`BlockGrid`], which owns the block size and the image
//! dimensions they derive from.
//!
//! Partial blocks on the right and bottom borders are kept and truncated to
//! the image, so a `w × h` image always has `ceil(h / W) × ceil(w / W)` blocks.

use crate::image::BinaryImage;
use serde::Serialize;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Pixel position, `x` to the right and `y` downwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct PixelCoord {
    pub x: usize,
    pub y: usize,
}

impl PixelCoord {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Block position in the grid, `row` downwards and `col` to the right.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct BlockCoord {
    pub row: usize,
    pub col: usize,
}

impl BlockCoord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Neighbour at a signed block offset, `None` when it would leave the grid.
    pub fn offset(self, d_row: isize, d_col: isize, grid: &BlockGrid) -> Option<BlockCoord> {
        let row = self.row as isize + d_row;
        let col = self.col as isize + d_col;
        if row < 0 || col < 0 || row >= grid.rows as isize || col >= grid.cols as isize {
            return None;
        }
        Some(BlockCoord::new(row as usize, col as usize))
    }
}

/// Half-open pixel rectangle `[x0, x1) × [y0, y1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

impl PixelRect {
    pub fn width(&self) -> usize {
        self.x1 - self.x0
    }

    pub fn height(&self) -> usize {
        self.y1 - self.y0
    }

    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    pub fn pixels(self) -> impl Iterator<Item = PixelCoord> {
        let (x0, x1) = (self.x0, self.x1);
        (self.y0..self.y1).flat_map(move |y| (x0..x1).map(move |x| PixelCoord::new(x, y)))
    }
}

/// Partition of a `width × height` raster into square blocks of `block_size`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockGrid {
    pub block_size: usize,
    pub width: usize,
    pub height: usize,
    pub rows: usize,
    pub cols: usize,
}

impl BlockGrid {
    /// Grid for an image; `block_size` must be non-zero.
    pub fn new(width: usize, height: usize, block_size: usize) -> Self {
        debug_assert!(block_size > 0);
        Self {
            block_size,
            width,
            height,
            rows: height.div_ceil(block_size),
            cols: width.div_ceil(block_size),
        }
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row-major index of a block.
    #[inline]
    pub fn index(&self, block: BlockCoord) -> usize {
        block.row * self.cols + block.col
    }

    /// Inverse of [`BlockGrid::index`].
    #[inline]
    pub fn coord(&self, index: usize) -> BlockCoord {
        BlockCoord::new(index / self.cols, index % self.cols)
    }

    /// All blocks in row-major order.
    pub fn blocks(&self) -> impl Iterator<Item = BlockCoord> {
        let grid = *self;
        (0..grid.len()).map(move |i| grid.coord(i))
    }

    /// Evaluate `f` for every block, in row-major order. Blocks are independent
    /// so this fans out over the rayon pool when the `parallel` feature is on.
    pub fn map_blocks<T, F>(&self, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(BlockCoord) -> T + Sync + Send,
    {
        #[cfg(feature = "parallel")]
        {
            (0..self.len())
                .into_par_iter()
                .map(|i| f(self.coord(i)))
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            (0..self.len()).map(|i| f(self.coord(i))).collect()
        }
    }

    /// Pixel extent of a block, truncated at the image border.
    pub fn block_rect(&self, block: BlockCoord) -> PixelRect {
        let x0 = block.col * self.block_size;
        let y0 = block.row * self.block_size;
        PixelRect {
            x0,
            y0,
            x1: (x0 + self.block_size).min(self.width),
            y1: (y0 + self.block_size).min(self.height),
        }
    }

    /// True when the block is not truncated by the image border.
    pub fn is_full_block(&self, block: BlockCoord) -> bool {
        self.block_rect(block).area() == self.block_size * self.block_size
    }

    /// Block containing a pixel.
    #[inline]
    pub fn block_of(&self, p: PixelCoord) -> BlockCoord {
        BlockCoord::new(p.y / self.block_size, p.x / self.block_size)
    }

    /// Nominal centre pixel of a block (`col * W + W / 2`, `row * W + W / 2`),
    /// clamped into the image for truncated blocks.
    pub fn block_center(&self, block: BlockCoord) -> PixelCoord {
        let half = self.block_size / 2;
        PixelCoord::new(
            (block.col * self.block_size + half).min(self.width.saturating_sub(1)),
            (block.row * self.block_size + half).min(self.height.saturating_sub(1)),
        )
    }
}

/// Per-block foreground flag (`true` = ridge-bearing region).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockMask {
    pub grid: BlockGrid,
    pub values: Vec<bool>,
}

impl BlockMask {
    pub fn new(grid: BlockGrid, values: Vec<bool>) -> Self {
        debug_assert_eq!(values.len(), grid.len());
        Self { grid, values }
    }

    pub fn filled(grid: BlockGrid, value: bool) -> Self {
        Self::new(grid, vec![value; grid.len()])
    }

    #[inline]
    pub fn is_foreground(&self, block: BlockCoord) -> bool {
        self.values[self.grid.index(block)]
    }

    pub fn foreground_count(&self) -> usize {
        self.values.iter().filter(|&&v| v).count()
    }

    /// True when every block within `radius` blocks of `center` exists, is
    /// not truncated by the image border, and is foreground.
    pub fn neighborhood_is_foreground(&self, center: BlockCoord, radius: usize) -> bool {
        let r = radius as isize;
        (-r..=r).all(|dr| {
            (-r..=r).all(|dc| {
                center
                    .offset(dr, dc, &self.grid)
                    .is_some_and(|b| self.grid.is_full_block(b) && self.is_foreground(b))
            })
        })
    }

    /// Upsample to pixel resolution by replicating each block flag.
    pub fn to_pixel_mask(&self) -> BinaryImage {
        BinaryImage::from_fn(self.grid.width, self.grid.height, |x, y| {
            self.is_foreground(self.grid.block_of(PixelCoord::new(x, y)))
        })
    }
}
