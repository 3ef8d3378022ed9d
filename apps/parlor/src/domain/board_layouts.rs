//! Precomputed Eight Jacks board layouts.
//!
//! A layout maps each square (x-major index `x * height + y`) to the
//! position in a sorted, jackless double deck whose card goes there; `None`
//! marks a wild corner. Layouts are computed once per process and only read
//! afterwards.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

pub const MIN_SIDE: usize = 8;
pub const MAX_SIDE: usize = 10;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardLayout {
    /// Deck order, left to right, top to bottom.
    Sorted,
    /// Deck order spiralling clockwise from the top-left corner.
    Spiral,
    /// Four mirrored blades; 10x10 with wild corners only.
    Pinwheel,
    /// Shuffled deck order.
    Random,
}

/// Deck index per square, `None` for wild corners.
pub type Placement = Vec<Option<usize>>;

pub struct BoardLayouts {
    spiral: HashMap<(bool, usize, usize), Placement>,
    pinwheel: Placement,
}

static LAYOUTS: Lazy<BoardLayouts> = Lazy::new(BoardLayouts::compute);

impl BoardLayouts {
    /// The process-wide table. First access computes it.
    pub fn global() -> &'static BoardLayouts {
        &LAYOUTS
    }

    fn compute() -> Self {
        let mut spiral = HashMap::new();
        for wild_corners in [false, true] {
            for width in MIN_SIDE..=MAX_SIDE {
                for height in MIN_SIDE..=MAX_SIDE {
                    spiral.insert(
                        (wild_corners, width, height),
                        spiral_placement(wild_corners, width, height),
                    );
                }
            }
        }
        Self {
            spiral,
            pinwheel: pinwheel_placement(),
        }
    }

    /// Placement for a layout, or `None` when the layout simply follows deck
    /// order (sorted, random) or is unavailable at this size.
    pub fn placement(
        &self,
        layout: BoardLayout,
        wild_corners: bool,
        width: usize,
        height: usize,
    ) -> Option<&Placement> {
        match layout {
            BoardLayout::Sorted | BoardLayout::Random => None,
            BoardLayout::Spiral => self.spiral.get(&(wild_corners, width, height)),
            BoardLayout::Pinwheel => {
                (wild_corners && width == MAX_SIDE && height == MAX_SIDE).then_some(&self.pinwheel)
            }
        }
    }
}

pub fn is_corner(x: usize, y: usize, width: usize, height: usize) -> bool {
    (x == 0 || x == width - 1) && (y == 0 || y == height - 1)
}

/// Coordinates visited clockwise from (0, 0): along the top edge, down the
/// right, back along the bottom, up the left, then one ring inwards.
fn spiral_order(width: usize, height: usize) -> Vec<(usize, usize)> {
    let mut order = Vec::with_capacity(width * height);
    let (mut left, mut top) = (0isize, 0isize);
    let (mut right, mut bottom) = (width as isize - 1, height as isize - 1);
    while left <= right && top <= bottom {
        for x in left..=right {
            order.push((x, top));
        }
        for y in top + 1..=bottom {
            order.push((right, y));
        }
        if top < bottom {
            for x in (left..right).rev() {
                order.push((x, bottom));
            }
        }
        if left < right {
            for y in (top + 1..bottom).rev() {
                order.push((left, y));
            }
        }
        left += 1;
        top += 1;
        right -= 1;
        bottom -= 1;
    }
    order
        .into_iter()
        .map(|(x, y)| (x as usize, y as usize))
        .collect()
}

fn spiral_placement(wild_corners: bool, width: usize, height: usize) -> Placement {
    let mut placement = vec![None; width * height];
    let mut next = 0;
    for (x, y) in spiral_order(width, height) {
        if wild_corners && is_corner(x, y, width, height) {
            continue;
        }
        placement[x * height + y] = Some(next);
        next += 1;
    }
    placement
}

/// Left half of the pinwheel, in deck order. The right half is the same
/// pattern rotated half a turn.
#[rustfmt::skip]
const PINWHEEL_HALF: [(usize, usize); 48] = [
    (0, 1), (0, 2), (0, 3), (0, 4), (1, 4), (1, 3), (1, 2), (1, 1),
    (2, 2), (2, 3), (2, 4), (3, 4), (0, 8), (0, 7), (0, 6), (0, 5),
    (1, 5), (1, 6), (1, 7), (1, 8), (2, 7), (2, 6), (2, 5), (3, 5),
    (1, 9), (2, 9), (3, 9), (4, 9), (4, 8), (3, 8), (2, 8), (3, 7),
    (4, 7), (4, 6), (3, 6), (4, 5), (1, 0), (2, 0), (3, 0), (4, 0),
    (4, 1), (3, 1), (2, 1), (3, 2), (4, 2), (4, 3), (3, 3), (4, 4),
];

fn pinwheel_placement() -> Placement {
    let side = MAX_SIDE;
    let mut placement = vec![None; side * side];
    for (index, &(x, y)) in PINWHEEL_HALF.iter().enumerate() {
        placement[x * side + y] = Some(index);
        let (mx, my) = (side - 1 - x, side - 1 - y);
        placement[mx * side + my] = Some(index + PINWHEEL_HALF.len());
    }
    placement
}
