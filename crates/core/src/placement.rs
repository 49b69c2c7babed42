//! Placed items and candidate configurations.

use geo::{Coord, LineString, Polygon};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of row and column offset steps tried per anchor.
pub const OFFSET_STEPS: u8 = 10;

/// Total number of candidate configurations evaluated by one search.
pub const CANDIDATE_COUNT: usize = Anchor::ALL.len() * (OFFSET_STEPS as usize).pow(2);

/// Whether an item is a full or a half item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ItemKind {
    Full,
    Half,
}

impl ItemKind {
    /// Short label used in synthetic ids.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Half => "half",
        }
    }
}

/// One placed item.
///
/// Corners are ordered bottom-left, top-left, top-right, bottom-right in the
/// item's own frame. Tracker items are rotated a quarter turn, so their list
/// starts at the world bottom-right corner.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlacedItem {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: ItemKind,
    pub corners: [Coord<f64>; 4],
    pub center: Coord<f64>,
}

impl PlacedItem {
    /// Creates an item from its corners, computing the center.
    pub fn new(kind: ItemKind, corners: [Coord<f64>; 4]) -> Self {
        let sum = corners
            .iter()
            .fold(Coord { x: 0.0, y: 0.0 }, |acc, c| acc + *c);
        Self {
            kind,
            corners,
            center: sum / 4.0,
        }
    }

    /// Returns true for half items.
    pub fn is_half(&self) -> bool {
        self.kind == ItemKind::Half
    }

    /// Returns the item as a closed polygon.
    pub fn to_polygon(&self) -> Polygon<f64> {
        Polygon::new(LineString::from(self.corners.to_vec()), vec![])
    }
}

/// Corner of the site bounding box a candidate grows from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Anchor {
    BottomLeft,
    BottomRight,
    TopLeft,
    TopRight,
}

impl Anchor {
    /// Anchors in search order.
    pub const ALL: [Anchor; 4] = [
        Anchor::BottomLeft,
        Anchor::BottomRight,
        Anchor::TopLeft,
        Anchor::TopRight,
    ];

    /// Rows are stacked upward from the bottom edge.
    pub fn from_bottom(&self) -> bool {
        matches!(self, Self::BottomLeft | Self::BottomRight)
    }

    /// Columns are filled rightward from the left edge.
    pub fn from_left(&self) -> bool {
        matches!(self, Self::BottomLeft | Self::TopLeft)
    }
}

/// One trial placement: an anchor and row/column offsets in tenths of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CandidateConfig {
    pub anchor: Anchor,
    pub row_offset_step: u8,
    pub col_offset_step: u8,
}

impl CandidateConfig {
    /// Row offset as a fraction of one row step.
    pub fn row_fraction(&self) -> f64 {
        f64::from(self.row_offset_step) / f64::from(OFFSET_STEPS)
    }

    /// Column offset as a fraction of one column step.
    pub fn col_fraction(&self) -> f64 {
        f64::from(self.col_offset_step) / f64::from(OFFSET_STEPS)
    }

    /// Enumerates every candidate in search order: anchor, then row offset,
    /// then column offset.
    pub fn enumerate() -> impl Iterator<Item = CandidateConfig> {
        Anchor::ALL.into_iter().flat_map(|anchor| {
            (0..OFFSET_STEPS).flat_map(move |row_offset_step| {
                (0..OFFSET_STEPS).map(move |col_offset_step| CandidateConfig {
                    anchor,
                    row_offset_step,
                    col_offset_step,
                })
            })
        })
    }
}

/// The winning candidate and its score.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct BestConfig {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub candidate: CandidateConfig,
    pub item_count: usize,
    pub full_count: usize,
    pub half_count: usize,
}
