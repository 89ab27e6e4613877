//! Neighborhood classification for blocks.
//!
//! Every occupied cell is classified by its 8-neighborhood into one
//! connectivity class, which the overlay resolver turns into concrete art
//! (see [`crate::overlay_plan`]). Classification also derives the
//! corner cut flags and, for slope-eligible corner cells, the collision
//! slope orientation.

use crate::grid::{OccupancyGrid, SlopeKind};
use crate::overlay::{OverlayKind, OverlayKinds};

/// Corner cut flags, one bit per corner, counter-clockwise from the top
/// left. A corner is cut when neither orthogonal side adjacent to it has a
/// neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CutFlags(pub u8);

impl CutFlags {
    /// Top-left corner bit.
    pub const TOP_LEFT: u8 = 1 << 0;
    /// Bottom-left corner bit.
    pub const BOTTOM_LEFT: u8 = 1 << 1;
    /// Bottom-right corner bit.
    pub const BOTTOM_RIGHT: u8 = 1 << 2;
    /// Top-right corner bit.
    pub const TOP_RIGHT: u8 = 1 << 3;

    /// All four corners cut.
    pub fn all() -> CutFlags {
        CutFlags(
            CutFlags::TOP_LEFT
                | CutFlags::BOTTOM_LEFT
                | CutFlags::BOTTOM_RIGHT
                | CutFlags::TOP_RIGHT,
        )
    }

    /// Whether the given corner bit is set.
    pub fn has(self, corner: u8) -> bool {
        self.0 & corner != 0
    }

    /// True when no corner is cut.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Connectivity class of an occupied cell given its 8-neighborhood.
///
/// Naming follows the exposure, not the neighbors: caps are named by their
/// open side (a cell whose only neighbor is on the left shows its cap to
/// the right), corners by the exposed corner, edges by the uncovered side,
/// and inset classes by the corner whose diagonal is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connectivity {
    /// Interior cell or a tile with no usable overlay art.
    Default,
    /// No neighbors at all.
    None,

    /// Single neighbor below.
    AboveCap,
    /// Single neighbor on the right.
    LeftCap,
    /// Single neighbor above.
    BelowCap,
    /// Single neighbor on the left.
    RightCap,

    /// Neighbors on both horizontal sides only.
    Row,
    /// Neighbors above and below only.
    Column,

    /// Neighbors below and right.
    TopLeftCorner,
    /// Neighbors below and right with the diagonal between them empty.
    TopLeftCornerInset,
    /// Neighbors below and left.
    TopRightCorner,
    /// Neighbors below and left with the diagonal between them empty.
    TopRightCornerInset,
    /// Neighbors above and right.
    BottomLeftCorner,
    /// Neighbors above and right with the diagonal between them empty.
    BottomLeftCornerInset,
    /// Neighbors above and left.
    BottomRightCorner,
    /// Neighbors above and left with the diagonal between them empty.
    BottomRightCornerInset,

    /// All neighbors but above.
    AboveEdge,
    /// All neighbors but above, below-left diagonal empty.
    AboveEdgeLeftInset,
    /// All neighbors but above, below-right diagonal empty.
    AboveEdgeRightInset,
    /// All neighbors but above, both lower diagonals empty.
    AboveEdgeTIntersection,
    /// All neighbors but left.
    LeftEdge,
    /// All neighbors but left, above-right diagonal empty.
    LeftEdgeAboveInset,
    /// All neighbors but left, below-right diagonal empty.
    LeftEdgeBelowInset,
    /// All neighbors but left, both right diagonals empty.
    LeftEdgeTIntersection,
    /// All neighbors but below.
    BelowEdge,
    /// All neighbors but below, above-left diagonal empty.
    BelowEdgeLeftInset,
    /// All neighbors but below, above-right diagonal empty.
    BelowEdgeRightInset,
    /// All neighbors but below, both upper diagonals empty.
    BelowEdgeTIntersection,
    /// All neighbors but right.
    RightEdge,
    /// All neighbors but right, above-left diagonal empty.
    RightEdgeAboveInset,
    /// All neighbors but right, below-left diagonal empty.
    RightEdgeBelowInset,
    /// All neighbors but right, both left diagonals empty.
    RightEdgeTIntersection,

    /// Four neighbors, only the above-left diagonal empty.
    AboveLeftInset,
    /// Four neighbors, only the above-right diagonal empty.
    AboveRightInset,
    /// Four neighbors, only the below-left diagonal empty.
    BelowLeftInset,
    /// Four neighbors, only the below-right diagonal empty.
    BelowRightInset,

    /// Four neighbors, both left diagonals empty.
    LeftInsets,
    /// Four neighbors, both upper diagonals empty.
    AboveInsets,
    /// Four neighbors, both right diagonals empty.
    RightInsets,
    /// Four neighbors, both lower diagonals empty.
    BelowInsets,

    /// Four neighbors, above-left and below-right diagonals empty.
    NegativeSlopeInsets,
    /// Four neighbors, above-right and below-left diagonals empty.
    PositiveSlopeInsets,

    /// Four neighbors, every diagonal but above-left empty.
    AllInsetButAboveLeft,
    /// Four neighbors, every diagonal but above-right empty.
    AllInsetButAboveRight,
    /// Four neighbors, every diagonal but below-left empty.
    AllInsetButBelowLeft,
    /// Four neighbors, every diagonal but below-right empty.
    AllInsetButBelowRight,

    /// Four neighbors and no diagonals: a plus-shaped crossing.
    FourWayIntersection,
}

impl Connectivity {
    /// Whether this is one of the corner classes. Slope cutting applies
    /// only to these.
    pub fn is_corner(self) -> bool {
        matches!(
            self,
            Connectivity::TopLeftCorner
                | Connectivity::TopLeftCornerInset
                | Connectivity::TopRightCorner
                | Connectivity::TopRightCornerInset
                | Connectivity::BottomLeftCorner
                | Connectivity::BottomLeftCornerInset
                | Connectivity::BottomRightCorner
                | Connectivity::BottomRightCornerInset
        )
    }
}

/// Per-tile inputs classification depends on.
#[derive(Debug, Clone, Copy, Default)]
pub struct TileTraits {
    /// Which overlay kinds the tile's art provides.
    pub kinds: OverlayKinds,
    /// Whether corner cells become sloped collision surfaces.
    pub slopes: bool,
    /// Whether the layout boundary counts as occupied terrain.
    pub connects_with_edge: bool,
}

/// Result of classifying one occupied cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classified {
    /// The class the overlay resolver consumes.
    pub class: Connectivity,
    /// Corners to round off during compositing.
    pub cuts: CutFlags,
    /// Collision slope, recorded only for corner cells of slope-eligible
    /// tiles.
    pub slope: Option<SlopeKind>,
}

/// Classifies the occupied cell at (x, y).
///
/// Rules are evaluated in a fixed precedence and the first satisfied rule
/// wins: isolation, then caps, then corners, then rows/columns and edges,
/// then the diagonal-driven inset classes for interior crossings. Each rule
/// is gated on the overlay kind it needs, so a tile with partial art
/// degrades toward `Default` rather than erroring. Cells outside the grid
/// count as occupied when the tile connects with the edge.
pub fn classify(x: usize, y: usize, grid: &OccupancyGrid, traits: TileTraits) -> Classified {
    let at = |dx: i64, dy: i64| grid.probe(x as i64 + dx, y as i64 + dy, traits.connects_with_edge);

    let left = at(-1, 0);
    let right = at(1, 0);
    let below = at(0, -1);
    let above = at(0, 1);

    let mut cuts = CutFlags::default();
    if !(above || left) {
        cuts.0 |= CutFlags::TOP_LEFT;
    }
    if !(left || below) {
        cuts.0 |= CutFlags::BOTTOM_LEFT;
    }
    if !(below || right) {
        cuts.0 |= CutFlags::BOTTOM_RIGHT;
    }
    if !(right || above) {
        cuts.0 |= CutFlags::TOP_RIGHT;
    }

    let done = |class: Connectivity| Classified { class, cuts, slope: None };

    let kinds = traits.kinds;
    if kinds.is_empty() {
        return done(Connectivity::Default);
    }

    if kinds.has(OverlayKind::Single) && !(left || right || below || above) {
        return done(Connectivity::None);
    }

    if kinds.has(OverlayKind::Cap) {
        if left && !(right || below || above) {
            return done(Connectivity::RightCap);
        }
        if right && !(below || above || left) {
            return done(Connectivity::LeftCap);
        }
        if below && !(above || left || right) {
            return done(Connectivity::AboveCap);
        }
        if above && !(left || right || below) {
            return done(Connectivity::BelowCap);
        }
    }

    let above_left = at(-1, 1);
    let above_right = at(1, 1);
    let below_left = at(-1, -1);
    let below_right = at(1, -1);
    let inset = kinds.has(OverlayKind::Inset);

    // Two adjacent neighbors leave an exposed corner. The upgrade to the
    // inset variant looks at the diagonal between the two neighbors; the
    // slope is recorded either way.
    if kinds.has(OverlayKind::Corner) {
        if below && right && !(above || left) {
            let class = if !below_right && inset {
                Connectivity::TopLeftCornerInset
            } else {
                Connectivity::TopLeftCorner
            };
            return Classified {
                class,
                cuts,
                slope: traits.slopes.then_some(SlopeKind::PositiveBottom),
            };
        }
        if below && left && !(above || right) {
            let class = if !below_left && inset {
                Connectivity::TopRightCornerInset
            } else {
                Connectivity::TopRightCorner
            };
            return Classified {
                class,
                cuts,
                slope: traits.slopes.then_some(SlopeKind::NegativeBottom),
            };
        }
        if above && right && !(below || left) {
            let class = if !above_right && inset {
                Connectivity::BottomLeftCornerInset
            } else {
                Connectivity::BottomLeftCorner
            };
            return Classified {
                class,
                cuts,
                slope: traits.slopes.then_some(SlopeKind::NegativeTop),
            };
        }
        if above && left && !(below || right) {
            let class = if !above_left && inset {
                Connectivity::BottomRightCornerInset
            } else {
                Connectivity::BottomRightCorner
            };
            return Classified {
                class,
                cuts,
                slope: traits.slopes.then_some(SlopeKind::PositiveTop),
            };
        }
    }

    if kinds.has(OverlayKind::Edge) {
        if left && right && !(below || above) {
            return done(Connectivity::Row);
        }
        if above && below && !(left || right) {
            return done(Connectivity::Column);
        }

        // Three neighbors: the edge rides the uncovered side and picks up
        // an inset for each empty diagonal off the covered side.
        if !left && right && above && below {
            let class = if inset {
                match (!above_right, !below_right) {
                    (true, true) => Connectivity::LeftEdgeTIntersection,
                    (true, false) => Connectivity::LeftEdgeAboveInset,
                    (false, true) => Connectivity::LeftEdgeBelowInset,
                    (false, false) => Connectivity::LeftEdge,
                }
            } else {
                Connectivity::LeftEdge
            };
            return done(class);
        }
        if !right && above && below && left {
            let class = if inset {
                match (!above_left, !below_left) {
                    (true, true) => Connectivity::RightEdgeTIntersection,
                    (true, false) => Connectivity::RightEdgeAboveInset,
                    (false, true) => Connectivity::RightEdgeBelowInset,
                    (false, false) => Connectivity::RightEdge,
                }
            } else {
                Connectivity::RightEdge
            };
            return done(class);
        }
        if !above && below && left && right {
            let class = if inset {
                match (!below_left, !below_right) {
                    (true, true) => Connectivity::AboveEdgeTIntersection,
                    (true, false) => Connectivity::AboveEdgeLeftInset,
                    (false, true) => Connectivity::AboveEdgeRightInset,
                    (false, false) => Connectivity::AboveEdge,
                }
            } else {
                Connectivity::AboveEdge
            };
            return done(class);
        }
        if !below && left && right && above {
            let class = if inset {
                match (!above_left, !above_right) {
                    (true, true) => Connectivity::BelowEdgeTIntersection,
                    (true, false) => Connectivity::BelowEdgeLeftInset,
                    (false, true) => Connectivity::BelowEdgeRightInset,
                    (false, false) => Connectivity::BelowEdge,
                }
            } else {
                Connectivity::BelowEdge
            };
            return done(class);
        }
    }

    // Fully surrounded orthogonally: the diagonals alone decide. All four
    // diagonals present is an interior cell and needs no overlays.
    if inset && left && right && above && below {
        let class = match (above_left, above_right, below_left, below_right) {
            (false, false, false, false) => Some(Connectivity::FourWayIntersection),

            (true, false, false, false) => Some(Connectivity::AllInsetButAboveLeft),
            (false, true, false, false) => Some(Connectivity::AllInsetButAboveRight),
            (false, false, true, false) => Some(Connectivity::AllInsetButBelowLeft),
            (false, false, false, true) => Some(Connectivity::AllInsetButBelowRight),

            (false, false, true, true) => Some(Connectivity::AboveInsets),
            (true, false, true, false) => Some(Connectivity::RightInsets),
            (true, true, false, false) => Some(Connectivity::BelowInsets),
            (false, true, false, true) => Some(Connectivity::LeftInsets),

            (false, true, true, false) => Some(Connectivity::NegativeSlopeInsets),
            (true, false, false, true) => Some(Connectivity::PositiveSlopeInsets),

            (false, true, true, true) => Some(Connectivity::AboveLeftInset),
            (true, false, true, true) => Some(Connectivity::AboveRightInset),
            (true, true, false, true) => Some(Connectivity::BelowLeftInset),
            (true, true, true, false) => Some(Connectivity::BelowRightInset),

            (true, true, true, true) => None,
        };
        if let Some(class) = class {
            return done(class);
        }
    }

    done(Connectivity::Default)
}
