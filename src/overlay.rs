//! Overlay resolution: connectivity class to ordered overlay applications.
//!
//! Every class maps to a fixed table of (overlay kind, rotation) steps.
//! Rotations are counter-clockwise quarter turns away from the authored
//! orientation of each kind, and rotation `r` carries top-left-authored art
//! to the corner at index `r` counting counter-clockwise (0 top-left,
//! 1 bottom-left, 2 bottom-right, 3 top-right).

use crate::connectivity::Connectivity;

/// Most overlays one compositing pass can apply.
pub const MAX_OVERLAYS: usize = 4;

/// The kinds of overlay art a tile may provide.
///
/// Authored orientations: `Edge` and `Cap` art sit on the top of the cell,
/// `Corner` and `Inset` art in the top-left, and `Slope` art is a positive
/// slope with the triangle's straight sides on the bottom and right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    /// Corner art for cells with exactly two adjacent neighbors.
    Corner,
    /// Edge art for exposed sides.
    Edge,
    /// Cap art for cells with a single neighbor.
    Cap,
    /// Art for fully isolated cells.
    Single,
    /// Concave corner art for empty diagonals between neighbors.
    Inset,
    /// Slope art; stands in for `Corner` on slope-eligible tiles.
    Slope,
}

impl OverlayKind {
    /// All kinds, in the order overlay files are probed.
    pub const ALL: [OverlayKind; 6] = [
        OverlayKind::Corner,
        OverlayKind::Edge,
        OverlayKind::Cap,
        OverlayKind::Single,
        OverlayKind::Inset,
        OverlayKind::Slope,
    ];

    /// Suffix this kind uses in overlay file names.
    pub fn file_suffix(self) -> &'static str {
        match self {
            OverlayKind::Corner => "corner",
            OverlayKind::Edge => "edge",
            OverlayKind::Cap => "cap",
            OverlayKind::Single => "single",
            OverlayKind::Inset => "inset",
            OverlayKind::Slope => "slope",
        }
    }

    fn bit(self) -> u8 {
        match self {
            OverlayKind::Corner => 1 << 0,
            OverlayKind::Edge => 1 << 1,
            OverlayKind::Cap => 1 << 2,
            OverlayKind::Single => 1 << 3,
            OverlayKind::Inset => 1 << 4,
            OverlayKind::Slope => 1 << 5,
        }
    }
}

/// Set of overlay kinds a tile's art provides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlayKinds(u8);

impl OverlayKinds {
    /// Adds a kind to the set.
    pub fn insert(&mut self, kind: OverlayKind) {
        self.0 |= kind.bit();
    }

    /// Whether the kind is present.
    pub fn has(self, kind: OverlayKind) -> bool {
        self.0 & kind.bit() != 0
    }

    /// True when no kind at all is available.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// One overlay application: which art, rotated by how many quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayStep {
    /// Which overlay art to sample.
    pub kind: OverlayKind,
    /// Counter-clockwise quarter turns to rotate it by.
    pub turns: u8,
}

// Step constants named by where the art ends up.
const SINGLE: OverlayStep = OverlayStep { kind: OverlayKind::Single, turns: 0 };
const CAP_ABOVE: OverlayStep = OverlayStep { kind: OverlayKind::Cap, turns: 0 };
const CAP_LEFT: OverlayStep = OverlayStep { kind: OverlayKind::Cap, turns: 1 };
const CAP_BELOW: OverlayStep = OverlayStep { kind: OverlayKind::Cap, turns: 2 };
const CAP_RIGHT: OverlayStep = OverlayStep { kind: OverlayKind::Cap, turns: 3 };
const CORNER_TOP_LEFT: OverlayStep = OverlayStep { kind: OverlayKind::Corner, turns: 0 };
const CORNER_BOTTOM_LEFT: OverlayStep = OverlayStep { kind: OverlayKind::Corner, turns: 1 };
const CORNER_BOTTOM_RIGHT: OverlayStep = OverlayStep { kind: OverlayKind::Corner, turns: 2 };
const CORNER_TOP_RIGHT: OverlayStep = OverlayStep { kind: OverlayKind::Corner, turns: 3 };
const EDGE_ABOVE: OverlayStep = OverlayStep { kind: OverlayKind::Edge, turns: 0 };
const EDGE_LEFT: OverlayStep = OverlayStep { kind: OverlayKind::Edge, turns: 1 };
const EDGE_BELOW: OverlayStep = OverlayStep { kind: OverlayKind::Edge, turns: 2 };
const EDGE_RIGHT: OverlayStep = OverlayStep { kind: OverlayKind::Edge, turns: 3 };
const INSET_TOP_LEFT: OverlayStep = OverlayStep { kind: OverlayKind::Inset, turns: 0 };
const INSET_BOTTOM_LEFT: OverlayStep = OverlayStep { kind: OverlayKind::Inset, turns: 1 };
const INSET_BOTTOM_RIGHT: OverlayStep = OverlayStep { kind: OverlayKind::Inset, turns: 2 };
const INSET_TOP_RIGHT: OverlayStep = OverlayStep { kind: OverlayKind::Inset, turns: 3 };

/// The fixed overlay steps for a connectivity class, in application order.
///
/// Corner classes pair the corner art with the inset opposite it; edge
/// classes add one inset per empty diagonal off the covered side, both for
/// T-intersections. Inset-only classes emit one inset per open corner, at
/// that corner's rotation.
pub fn overlay_plan(class: Connectivity) -> &'static [OverlayStep] {
    match class {
        Connectivity::Default => &[],
        Connectivity::None => &[SINGLE],

        Connectivity::AboveCap => &[CAP_ABOVE],
        Connectivity::LeftCap => &[CAP_LEFT],
        Connectivity::BelowCap => &[CAP_BELOW],
        Connectivity::RightCap => &[CAP_RIGHT],

        Connectivity::TopLeftCorner => &[CORNER_TOP_LEFT],
        Connectivity::TopLeftCornerInset => &[CORNER_TOP_LEFT, INSET_BOTTOM_RIGHT],
        Connectivity::BottomLeftCorner => &[CORNER_BOTTOM_LEFT],
        Connectivity::BottomLeftCornerInset => &[CORNER_BOTTOM_LEFT, INSET_TOP_RIGHT],
        Connectivity::BottomRightCorner => &[CORNER_BOTTOM_RIGHT],
        Connectivity::BottomRightCornerInset => &[CORNER_BOTTOM_RIGHT, INSET_TOP_LEFT],
        Connectivity::TopRightCorner => &[CORNER_TOP_RIGHT],
        Connectivity::TopRightCornerInset => &[CORNER_TOP_RIGHT, INSET_BOTTOM_LEFT],

        Connectivity::Row => &[EDGE_ABOVE, EDGE_BELOW],
        Connectivity::Column => &[EDGE_LEFT, EDGE_RIGHT],

        Connectivity::AboveEdge => &[EDGE_ABOVE],
        Connectivity::AboveEdgeLeftInset => &[EDGE_ABOVE, INSET_BOTTOM_LEFT],
        Connectivity::AboveEdgeRightInset => &[EDGE_ABOVE, INSET_BOTTOM_RIGHT],
        Connectivity::AboveEdgeTIntersection => {
            &[EDGE_ABOVE, INSET_BOTTOM_LEFT, INSET_BOTTOM_RIGHT]
        }
        Connectivity::LeftEdge => &[EDGE_LEFT],
        Connectivity::LeftEdgeAboveInset => &[EDGE_LEFT, INSET_TOP_RIGHT],
        Connectivity::LeftEdgeBelowInset => &[EDGE_LEFT, INSET_BOTTOM_RIGHT],
        Connectivity::LeftEdgeTIntersection => {
            &[EDGE_LEFT, INSET_TOP_RIGHT, INSET_BOTTOM_RIGHT]
        }
        Connectivity::BelowEdge => &[EDGE_BELOW],
        Connectivity::BelowEdgeLeftInset => &[EDGE_BELOW, INSET_TOP_LEFT],
        Connectivity::BelowEdgeRightInset => &[EDGE_BELOW, INSET_TOP_RIGHT],
        Connectivity::BelowEdgeTIntersection => {
            &[EDGE_BELOW, INSET_TOP_LEFT, INSET_TOP_RIGHT]
        }
        Connectivity::RightEdge => &[EDGE_RIGHT],
        Connectivity::RightEdgeAboveInset => &[EDGE_RIGHT, INSET_TOP_LEFT],
        Connectivity::RightEdgeBelowInset => &[EDGE_RIGHT, INSET_BOTTOM_LEFT],
        Connectivity::RightEdgeTIntersection => {
            &[EDGE_RIGHT, INSET_TOP_LEFT, INSET_BOTTOM_LEFT]
        }

        Connectivity::AboveLeftInset => &[INSET_TOP_LEFT],
        Connectivity::AboveRightInset => &[INSET_TOP_RIGHT],
        Connectivity::BelowLeftInset => &[INSET_BOTTOM_LEFT],
        Connectivity::BelowRightInset => &[INSET_BOTTOM_RIGHT],

        Connectivity::LeftInsets => &[INSET_TOP_LEFT, INSET_BOTTOM_LEFT],
        Connectivity::AboveInsets => &[INSET_TOP_LEFT, INSET_TOP_RIGHT],
        Connectivity::RightInsets => &[INSET_BOTTOM_RIGHT, INSET_TOP_RIGHT],
        Connectivity::BelowInsets => &[INSET_BOTTOM_LEFT, INSET_BOTTOM_RIGHT],

        Connectivity::NegativeSlopeInsets => &[INSET_TOP_LEFT, INSET_BOTTOM_RIGHT],
        Connectivity::PositiveSlopeInsets => &[INSET_BOTTOM_LEFT, INSET_TOP_RIGHT],

        Connectivity::AllInsetButAboveLeft => {
            &[INSET_BOTTOM_LEFT, INSET_BOTTOM_RIGHT, INSET_TOP_RIGHT]
        }
        Connectivity::AllInsetButAboveRight => {
            &[INSET_TOP_LEFT, INSET_BOTTOM_LEFT, INSET_BOTTOM_RIGHT]
        }
        Connectivity::AllInsetButBelowLeft => {
            &[INSET_TOP_LEFT, INSET_BOTTOM_RIGHT, INSET_TOP_RIGHT]
        }
        Connectivity::AllInsetButBelowRight => {
            &[INSET_TOP_LEFT, INSET_BOTTOM_LEFT, INSET_TOP_RIGHT]
        }

        Connectivity::FourWayIntersection => {
            &[INSET_TOP_LEFT, INSET_BOTTOM_LEFT, INSET_BOTTOM_RIGHT, INSET_TOP_RIGHT]
        }
    }
}
