//! Detours between staggered rows.

use super::rows::PreparedPanel;
use geo::Coord;

/// Vertical direction of a projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
}

/// Where the target edge sits relative to the current panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The target covers the current panel's edge.
    Before,
    /// The target's edge starts inside the current panel's span.
    After,
}

/// Two-point detour connecting mismatched rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detour {
    /// Point on the current panel's edge the walk leaves from.
    pub projection: Coord<f64>,
    /// Point on the target panel the walk arrives at.
    pub landing: Coord<f64>,
}

/// Computes the detour from `current` to `target` in an adjacent row.
///
/// The projection is clamped to the current panel's horizontal span and the
/// landing to the target's.
///
/// | direction | side   | projection                | landing                    |
/// |-----------|--------|---------------------------|----------------------------|
/// | up        | after  | target left, current top  | target left, target bottom |
/// | up        | before | current left, current top | current left, target bottom|
/// | down      | before | current right, current bottom | current right, target top |
/// | down      | after  | target right, current bottom  | target right, target top  |
pub fn calcul_projection(
    direction: Direction,
    side: Side,
    current: &PreparedPanel,
    target: &PreparedPanel,
) -> Detour {
    let (x, from_y, to_y) = match (direction, side) {
        (Direction::Up, Side::After) => (target.left(), current.top(), target.bottom()),
        (Direction::Up, Side::Before) => (current.left(), current.top(), target.bottom()),
        (Direction::Down, Side::Before) => (current.right(), current.bottom(), target.top()),
        (Direction::Down, Side::After) => (target.right(), current.bottom(), target.top()),
    };
    Detour {
        projection: Coord {
            x: x.max(current.left()).min(current.right()),
            y: from_y,
        },
        landing: Coord {
            x: x.max(target.left()).min(target.right()),
            y: to_y,
        },
    }
}
