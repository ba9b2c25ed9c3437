//! Stage visualisations.
//!
//! Rendering is kept apart from the stages: every function here takes
//! finished stage output and returns a fresh RGB raster. Nothing in the
//! feature path reads these images back.

use crate::error::{Error, Result};
use crate::frequency::FrequencyField;
use crate::grid::BlockMask;
use crate::image::{GrayImageU8, ImageF32};
use crate::orientation::OrientationField;
use crate::params::MosaicLayout;
use crate::pipeline::StageKind;
use crate::types::{Minutia, MinutiaKind, Singularity, SingularityKind};
use image::{DynamicImage, GenericImage, GrayImage, Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut,
};
use imageproc::rect::Rect;

pub const ORIENTATION_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const LEGEND_BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
pub const LEGEND_BORDER: Rgb<u8> = Rgb([0, 0, 0]);

const MINUTIA_RADIUS: i32 = 3;
const LEGEND_SIZE: (u32, u32) = (110, 50);
const LEGEND_MARGIN: i32 = 10;

pub fn minutia_color(kind: MinutiaKind) -> Rgb<u8> {
    match kind {
        MinutiaKind::Ending => Rgb([255, 0, 0]),
        MinutiaKind::Bifurcation => Rgb([0, 255, 0]),
    }
}

pub fn singularity_color(kind: SingularityKind) -> Rgb<u8> {
    match kind {
        SingularityKind::Loop => Rgb([255, 165, 0]),
        SingularityKind::Delta => Rgb([255, 0, 0]),
        SingularityKind::Whorl => Rgb([255, 0, 255]),
    }
}

pub fn gray_to_rgb(gray: &GrayImageU8) -> RgbImage {
    match GrayImage::from_raw(gray.width() as u32, gray.height() as u32, gray.data().to_vec()) {
        Some(img) => DynamicImage::ImageLuma8(img).to_rgb8(),
        None => RgbImage::new(gray.width() as u32, gray.height() as u32),
    }
}

/// Float raster clamped to [0, 255] and expanded to RGB.
pub fn f32_to_rgb(image: &ImageF32) -> RgbImage {
    gray_to_rgb(&GrayImageU8::new(image.w, image.h, image.to_u8_clamped()))
}

/// Green segment of length W through each foreground block centre, drawn
/// along the ridge direction over the segmented image.
pub fn orientation_overlay(
    segmented: &ImageF32,
    field: &OrientationField,
    mask: &BlockMask,
) -> RgbImage {
    let mut canvas = f32_to_rgb(segmented);
    let grid = field.grid;
    let half = grid.block_size as f32 * 0.5;
    for block in grid.blocks() {
        if !mask.is_foreground(block) {
            continue;
        }
        let c = grid.block_center(block);
        let d = field.direction(block) * half;
        let (cx, cy) = (c.x as f32, c.y as f32);
        draw_line_segment_mut(
            &mut canvas,
            (cx - d.x, cy - d.y),
            (cx + d.x, cy + d.y),
            ORIENTATION_COLOR,
        );
    }
    canvas
}

/// Wavelength per block, stretched from `[min, max]` to grey levels.
/// Blocks without an estimate are black.
pub fn frequency_map(field: &FrequencyField, min_wavelength: f32, max_wavelength: f32) -> RgbImage {
    let grid = field.grid;
    let span = (max_wavelength - min_wavelength).max(f32::EPSILON);
    let mut gray = GrayImageU8::filled(grid.width, grid.height, 0);
    for block in grid.blocks() {
        let Some(lambda) = field.wavelength(block) else {
            continue;
        };
        let level = (((lambda - min_wavelength) / span).clamp(0.0, 1.0) * 255.0).round() as u8;
        for p in grid.block_rect(block).pixels() {
            gray.set(p.x, p.y, level);
        }
    }
    gray_to_rgb(&gray)
}

/// Filled discs on the skeleton, one colour per kind, plus a legend box in
/// the lower-left corner.
pub fn minutiae_overlay(skeleton: &GrayImageU8, minutiae: &[Minutia]) -> RgbImage {
    let mut canvas = gray_to_rgb(skeleton);
    for m in minutiae {
        draw_filled_circle_mut(
            &mut canvas,
            (m.x as i32, m.y as i32),
            MINUTIA_RADIUS,
            minutia_color(m.kind),
        );
    }
    draw_minutiae_legend(&mut canvas);
    canvas
}

fn draw_minutiae_legend(canvas: &mut RgbImage) {
    let (w, h) = LEGEND_SIZE;
    let bottom = canvas.height() as i32 - LEGEND_MARGIN;
    let top = bottom - h as i32;
    if top < 0 || canvas.width() < w + LEGEND_MARGIN as u32 {
        return;
    }
    let frame = Rect::at(LEGEND_MARGIN, top).of_size(w, h);
    draw_filled_rect_mut(canvas, frame, LEGEND_BACKGROUND);
    draw_hollow_rect_mut(canvas, frame, LEGEND_BORDER);
    let swatch_x = LEGEND_MARGIN + 15;
    for (kind, y) in [
        (MinutiaKind::Ending, bottom - 35),
        (MinutiaKind::Bifurcation, bottom - 15),
    ] {
        draw_filled_circle_mut(canvas, (swatch_x, y), 4, minutia_color(kind));
    }
}

/// Two-pixel square outline of side W + 2 around each singular block.
pub fn singularity_overlay(
    skeleton: &GrayImageU8,
    singularities: &[Singularity],
    block_size: usize,
) -> RgbImage {
    let mut canvas = gray_to_rgb(skeleton);
    let side = block_size as u32 + 2;
    for s in singularities {
        let color = singularity_color(s.kind);
        let x0 = s.x as i32 - side as i32 / 2;
        let y0 = s.y as i32 - side as i32 / 2;
        draw_hollow_rect_mut(&mut canvas, Rect::at(x0, y0).of_size(side, side), color);
        draw_hollow_rect_mut(
            &mut canvas,
            Rect::at(x0 + 1, y0 + 1).of_size(side - 2, side - 2),
            color,
        );
    }
    canvas
}

/// Tile equally sized images row-major into a `rows × cols` grid. Unused
/// cells stay black.
pub fn mosaic(tiles: &[&RgbImage], layout: MosaicLayout) -> Result<RgbImage> {
    let Some(first) = tiles.first() else {
        return Err(Error::stage(StageKind::Mosaic, "no stage images to combine"));
    };
    let cells = layout.cells();
    if tiles.len() > cells {
        return Err(Error::stage(
            StageKind::Mosaic,
            format!(
                "{} images do not fit a {}x{} mosaic",
                tiles.len(),
                layout.rows,
                layout.cols
            ),
        ));
    }
    let (tw, th) = first.dimensions();
    if let Some(odd) = tiles.iter().find(|t| t.dimensions() != (tw, th)) {
        return Err(Error::stage(
            StageKind::Mosaic,
            format!(
                "stage image is {}x{}, expected {tw}x{th}",
                odd.width(),
                odd.height()
            ),
        ));
    }

    let mut canvas = RgbImage::new(tw * layout.cols as u32, th * layout.rows as u32);
    for (i, tile) in tiles.iter().enumerate() {
        let row = (i / layout.cols) as u32;
        let col = (i % layout.cols) as u32;
        canvas
            .copy_from(*tile, col * tw, row * th)
            .map_err(|e| Error::stage(StageKind::Mosaic, e.to_string()))?;
    }
    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{BlockCoord, BlockGrid};

    fn solid(w: u32, h: u32, v: u8) -> RgbImage {
        RgbImage::from_pixel(w, h, Rgb([v, v, v]))
    }

    #[test]
    fn mosaic_places_tiles_row_major() {
        let tiles: Vec<RgbImage> = (0..8).map(|i| solid(5, 3, i * 10)).collect();
        let refs: Vec<&RgbImage> = tiles.iter().collect();
        let out = mosaic(&refs, MosaicLayout::default()).unwrap();
        assert_eq!(out.dimensions(), (20, 6));
        for (i, tile) in tiles.iter().enumerate() {
            let (ox, oy) = ((i % 4) as u32 * 5, (i / 4) as u32 * 3);
            for (x, y, px) in tile.enumerate_pixels() {
                assert_eq!(out.get_pixel(ox + x, oy + y), px);
            }
        }
    }

    #[test]
    fn mosaic_rejects_mismatched_sizes_and_overflow() {
        let a = solid(5, 3, 0);
        let b = solid(4, 3, 0);
        assert!(matches!(
            mosaic(&[&a, &b], MosaicLayout::default()),
            Err(Error::Stage { stage: StageKind::Mosaic, .. })
        ));
        let many: Vec<&RgbImage> = std::iter::repeat(&a).take(9).collect();
        assert!(mosaic(&many, MosaicLayout::default()).is_err());
        assert!(mosaic(&[], MosaicLayout::default()).is_err());
    }

    #[test]
    fn minutiae_are_drawn_in_their_colour() {
        let skeleton = GrayImageU8::filled(200, 120, 255);
        let minutiae = [
            Minutia { kind: MinutiaKind::Ending, x: 150, y: 20 },
            Minutia { kind: MinutiaKind::Bifurcation, x: 170, y: 40 },
        ];
        let out = minutiae_overlay(&skeleton, &minutiae);
        assert_eq!(*out.get_pixel(150, 20), minutia_color(MinutiaKind::Ending));
        assert_eq!(*out.get_pixel(171, 41), minutia_color(MinutiaKind::Bifurcation));
        // Legend background and swatch.
        assert_eq!(*out.get_pixel(60, 100), LEGEND_BACKGROUND);
        assert_eq!(*out.get_pixel(25, 75), minutia_color(MinutiaKind::Ending));
    }

    #[test]
    fn singularity_box_surrounds_block() {
        let skeleton = GrayImageU8::filled(64, 64, 255);
        let s = Singularity {
            kind: SingularityKind::Loop,
            block: BlockCoord::new(1, 1),
            x: 24,
            y: 24,
            poincare_index_deg: 180.0,
        };
        let out = singularity_overlay(&skeleton, &[s], 16);
        // Side 18: outline from 15 to 32.
        assert_eq!(*out.get_pixel(15, 24), singularity_color(SingularityKind::Loop));
        assert_eq!(*out.get_pixel(16, 24), singularity_color(SingularityKind::Loop));
        assert_eq!(*out.get_pixel(24, 24), Rgb([255, 255, 255]));
    }

    #[test]
    fn orientation_segments_only_on_foreground() {
        let grid = BlockGrid::new(32, 16, 16);
        let field = OrientationField::from_fn(grid, |_| 0.0);
        let mask = BlockMask::new(grid, vec![true, false]);
        let out = orientation_overlay(&ImageF32::new(32, 16), &field, &mask);
        assert_eq!(*out.get_pixel(8, 8), ORIENTATION_COLOR);
        assert_eq!(*out.get_pixel(24, 8), Rgb([0, 0, 0]));
    }

    #[test]
    fn frequency_map_marks_invalid_blocks_black() {
        let grid = BlockGrid::new(32, 16, 16);
        let field = FrequencyField {
            grid,
            wavelengths: vec![Some(15.0), None],
        };
        let out = frequency_map(&field, 5.0, 15.0);
        assert_eq!(*out.get_pixel(3, 3), Rgb([255, 255, 255]));
        assert_eq!(*out.get_pixel(20, 3), Rgb([0, 0, 0]));
    }
}
