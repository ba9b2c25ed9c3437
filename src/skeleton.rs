//! Guo–Hall parallel thinning.
//!
//! Neighbours are labelled clockwise from north:
//!
//! ```text
//! P9 P2 P3
//! P8 P1 P4
//! P7 P6 P5
//! ```
//!
//! A set pixel P1 is deleted when
//! - C(P1) = 1, where C counts the 8-connected ridge pieces touching P1:
//!   `¬P2∧(P3∨P4) + ¬P4∧(P5∨P6) + ¬P6∧(P7∨P8) + ¬P8∧(P9∨P2)`,
//! - 2 ≤ N(P1) ≤ 3 with `N = min(N1, N2)`, `N1 = (P9∨P2) + (P3∨P4) + (P5∨P6) + (P7∨P8)`
//!   and `N2 = (P2∨P3) + (P4∨P5) + (P6∨P7) + (P8∨P9)`,
//! - odd sub-iteration: `(P6 ∨ P7 ∨ ¬P9) ∧ P8 = 0`,
//! - even sub-iteration: `(P2 ∨ P3 ∨ ¬P5) ∧ P4 = 0`.
//!
//! All deletions of a sub-iteration are applied together. Iteration stops
//! after a full pass (both sub-iterations) deletes nothing. Unlike
//! Zhang–Suen, two-pixel-wide diagonal ridges survive as a single line.

use crate::image::BinaryImage;
use log::debug;

/// Result of thinning.
#[derive(Clone, Debug)]
pub struct Skeleton {
    pub ridges: BinaryImage,
    /// Full passes executed, including the final pass that removed nothing.
    pub iterations: usize,
}

const NEIGHBOURS: [(isize, isize); 8] = [
    (0, -1),  // P2
    (1, -1),  // P3
    (1, 0),   // P4
    (1, 1),   // P5
    (0, 1),   // P6
    (-1, 1),  // P7
    (-1, 0),  // P8
    (-1, -1), // P9
];

pub fn thin(ridges: &BinaryImage) -> Skeleton {
    let mut img = ridges.clone();
    let mut iterations = 0;
    let mut to_delete = Vec::new();
    loop {
        iterations += 1;
        let mut removed = 0;
        for odd in [true, false] {
            to_delete.clear();
            for y in 0..img.h {
                for x in 0..img.w {
                    if img.is_set(x, y) && deletable(&img, x, y, odd) {
                        to_delete.push((x, y));
                    }
                }
            }
            for &(x, y) in &to_delete {
                img.set(x, y, false);
            }
            removed += to_delete.len();
        }
        if removed == 0 {
            break;
        }
    }
    debug!(
        "skeleton: {} -> {} ridge pixels in {iterations} passes",
        ridges.count_set(),
        img.count_set()
    );
    Skeleton {
        ridges: img,
        iterations,
    }
}

fn deletable(img: &BinaryImage, x: usize, y: usize, odd: bool) -> bool {
    let [p2, p3, p4, p5, p6, p7, p8, p9] =
        NEIGHBOURS.map(|(dx, dy)| img.get_or_zero(x as isize + dx, y as isize + dy) == 1);

    let pieces = [(p2, p3 || p4), (p4, p5 || p6), (p6, p7 || p8), (p8, p9 || p2)]
        .iter()
        .filter(|&&(gap, next)| !gap && next)
        .count();
    if pieces != 1 {
        return false;
    }
    let n1 = [p9 || p2, p3 || p4, p5 || p6, p7 || p8].iter().filter(|&&v| v).count();
    let n2 = [p2 || p3, p4 || p5, p6 || p7, p8 || p9].iter().filter(|&&v| v).count();
    if !(2..=3).contains(&n1.min(n2)) {
        return false;
    }
    if odd {
        !((p6 || p7 || !p9) && p8)
    } else {
        !((p2 || p3 || !p5) && p4)
    }
}
