//! Crossing-number minutiae detection on a thinned ridge map.
//!
//! The ring around a ridge pixel is read in a fixed clockwise order starting
//! at the top-left corner: the 8 neighbours of a 3×3 window, or the 16 border
//! pixels of a 5×5 window. CN is half the number of value changes between
//! consecutive ring entries (the ring is closed). CN = 1 is a ridge ending,
//! CN = 3 a bifurcation.

use crate::grid::PixelCoord;
use crate::image::{BinaryImage, GrayImageU8};
use crate::params::{MinutiaeParams, ScanKernel};
use crate::types::{Minutia, MinutiaKind};
use log::debug;

const RING_3X3: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
];

const RING_5X5: [(isize, isize); 16] = [
    (-2, -2),
    (-1, -2),
    (0, -2),
    (1, -2),
    (2, -2),
    (2, -1),
    (2, 0),
    (2, 1),
    (2, 2),
    (1, 2),
    (0, 2),
    (-1, 2),
    (-2, 2),
    (-2, 1),
    (-2, 0),
    (-2, -1),
];

fn ring(kernel: ScanKernel) -> &'static [(isize, isize)] {
    match kernel {
        ScanKernel::ThreeByThree => &RING_3X3,
        ScanKernel::FiveByFive => &RING_5X5,
    }
}

/// Half the number of 0↔1 changes around the closed ring centred at `p`.
/// Ring samples outside the image read as 0.
pub fn crossing_number(skeleton: &BinaryImage, p: PixelCoord, kernel: ScanKernel) -> usize {
    let offsets = ring(kernel);
    let values: Vec<u8> = offsets
        .iter()
        .map(|&(dx, dy)| skeleton.get_or_zero(p.x as isize + dx, p.y as isize + dy))
        .collect();
    let transitions = (0..values.len())
        .filter(|&i| values[i] != values[(i + 1) % values.len()])
        .count();
    transitions / 2
}

/// Classify a single pixel. Background pixels are never minutiae.
pub fn minutia_at(skeleton: &BinaryImage, p: PixelCoord, kernel: ScanKernel) -> Option<MinutiaKind> {
    if !skeleton.is_set(p.x, p.y) {
        return None;
    }
    match crossing_number(skeleton, p, kernel) {
        1 => Some(MinutiaKind::Ending),
        3 => Some(MinutiaKind::Bifurcation),
        _ => None,
    }
}

/// Ridge pixels of a rendered skeleton: intensity below `threshold`.
pub fn binarize_skeleton(gray: &GrayImageU8, threshold: u8) -> BinaryImage {
    BinaryImage::from_dark_pixels(&gray.as_view(), threshold)
}

/// Scan every ridge pixel whose ring lies fully inside the image, in raster
/// order.
pub fn extract_minutiae(skeleton: &BinaryImage, kernel: ScanKernel) -> Vec<Minutia> {
    let r = kernel.radius();
    let mut found = Vec::new();
    if skeleton.w <= 2 * r || skeleton.h <= 2 * r {
        return found;
    }
    for y in r..skeleton.h - r {
        for x in r..skeleton.w - r {
            let p = PixelCoord::new(x, y);
            if let Some(kind) = minutia_at(skeleton, p, kernel) {
                found.push(Minutia { kind, x, y });
            }
        }
    }
    found
}

/// Render the skeleton as dark ridges, re-binarise it and scan it.
pub fn detect(skeleton: &BinaryImage, params: &MinutiaeParams) -> Vec<Minutia> {
    let ridges = binarize_skeleton(&skeleton.to_gray(0, 255), params.ridge_threshold);
    let minutiae = extract_minutiae(&ridges, params.kernel);
    debug!(
        "minutiae: {} endings, {} bifurcations ({:?} ring)",
        minutiae.iter().filter(|m| m.kind == MinutiaKind::Ending).count(),
        minutiae.iter().filter(|m| m.kind == MinutiaKind::Bifurcation).count(),
        params.kernel
    );
    minutiae
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 3×3 patch from a row-major pattern; '#' is ridge.
    fn patch(rows: [&str; 3]) -> BinaryImage {
        BinaryImage::from_fn(3, 3, |x, y| rows[y].as_bytes()[x] == b'#')
    }

    const CENTRE: PixelCoord = PixelCoord::new(1, 1);

    #[test]
    fn single_neighbour_is_an_ending() {
        let img = patch(["...", ".##", "..."]);
        assert_eq!(crossing_number(&img, CENTRE, ScanKernel::ThreeByThree), 1);
        assert_eq!(
            minutia_at(&img, CENTRE, ScanKernel::ThreeByThree),
            Some(MinutiaKind::Ending)
        );
    }

    #[test]
    fn three_separated_branches_are_a_bifurcation() {
        let img = patch(["#.#", ".#.", ".#."]);
        assert_eq!(crossing_number(&img, CENTRE, ScanKernel::ThreeByThree), 3);
        assert_eq!(
            minutia_at(&img, CENTRE, ScanKernel::ThreeByThree),
            Some(MinutiaKind::Bifurcation)
        );
    }

    #[test]
    fn isolated_and_continuing_pixels_are_not_minutiae() {
        let isolated = patch(["...", ".#.", "..."]);
        assert_eq!(crossing_number(&isolated, CENTRE, ScanKernel::ThreeByThree), 0);
        assert_eq!(minutia_at(&isolated, CENTRE, ScanKernel::ThreeByThree), None);

        let line = patch(["...", "###", "..."]);
        assert_eq!(crossing_number(&line, CENTRE, ScanKernel::ThreeByThree), 2);
        assert_eq!(minutia_at(&line, CENTRE, ScanKernel::ThreeByThree), None);

        let background = patch(["#.#", "...", "#.#"]);
        assert_eq!(minutia_at(&background, CENTRE, ScanKernel::ThreeByThree), None);
    }

    #[test]
    fn line_has_two_endings_away_from_the_border() {
        let img = BinaryImage::from_fn(20, 9, |x, y| y == 4 && (3..15).contains(&x));
        let found = extract_minutiae(&img, ScanKernel::ThreeByThree);
        assert_eq!(
            found,
            vec![
                Minutia { kind: MinutiaKind::Ending, x: 3, y: 4 },
                Minutia { kind: MinutiaKind::Ending, x: 14, y: 4 },
            ]
        );
    }

    #[test]
    fn border_margin_follows_kernel_radius() {
        // Ending at x = 1 sits inside the 3×3 margin but not the 5×5 one.
        let img = BinaryImage::from_fn(20, 9, |x, y| y == 4 && (1..10).contains(&x));
        let small = extract_minutiae(&img, ScanKernel::ThreeByThree);
        assert!(small.iter().any(|m| m.x == 1));
        let large = extract_minutiae(&img, ScanKernel::FiveByFive);
        assert!(large.iter().all(|m| m.x >= 2 && m.x < 18));
    }

    #[test]
    fn five_by_five_ring_sees_y_junction() {
        let img = BinaryImage::from_fn(11, 11, |x, y| {
            (y == 5 && x <= 5) || (x >= 5 && (x == y || x + y == 10))
        });
        assert_eq!(
            minutia_at(&img, PixelCoord::new(5, 5), ScanKernel::FiveByFive),
            Some(MinutiaKind::Bifurcation)
        );
    }

    #[test]
    fn detect_thresholds_rendered_skeleton() {
        let img = BinaryImage::from_fn(20, 9, |x, y| y == 4 && (3..15).contains(&x));
        let found = detect(&img, &MinutiaeParams::default());
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|m| m.kind == MinutiaKind::Ending));
        let blank = BinaryImage::new(20, 9);
        assert!(detect(&blank, &MinutiaeParams::default()).is_empty());
    }
}
