//! Clockwise boundary walk over a panel grid.
//!
//! The walk starts at the top-left corner of the left-most panel in the top
//! row and follows the outline clockwise: right along top edges, down right
//! sides, left along bottom edges and up left sides. Each probe records an
//! [`Origin`]; [`next_op`] maps that outcome to the next [`Op`] pushed on the
//! work-list. Gaps up to the configured spacing (plus a small slack) count as
//! adjacency, so the traced outline encloses the inter-panel spacing.

use super::assemble::{PointKey, SegmentSet};
use super::projection::{calcul_projection, Direction, Side};
use super::rows::{Corner, PanelGrid};
use geo::Coord;
use solar_layout_core::{ProgressCallback, ProgressInfo};
use std::collections::HashSet;

/// Slack added to the spacing when testing adjacency, in meters.
pub const ADJACENCY_BUFFER: f64 = 0.1;

/// Edge alignment tolerance, in meters.
const EPS: f64 = 0.1;

/// Walker iterations between two progress reports.
pub const PROGRESS_INTERVAL: u32 = 1000;

/// Outcome of the last probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    Start,
    RightOk,
    RightKo,
    LeftOk,
    LeftKo,
    AboveOk,
    AboveKo,
    BelowOk,
    BelowKo,
    /// A staggered row above needs a detour.
    GapAbove(Side),
    /// A staggered row below needs a detour.
    GapBelow(Side),
    ProjectedUp(Side),
    ProjectedDown(Side),
}

/// One unit of work on the walker's stack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    /// Walk right along the top edge.
    ProbeRight { panel: usize, from: Coord<f64> },
    /// Walk down the right side.
    ProbeBelow { panel: usize, from: Coord<f64> },
    /// Walk left along the bottom edge.
    ProbeLeft { panel: usize, from: Coord<f64> },
    /// Walk up the left side.
    ProbeAbove { panel: usize, from: Coord<f64> },
    ProjectionUp {
        panel: usize,
        target: usize,
        side: Side,
        from: Coord<f64>,
    },
    ProjectionDown {
        panel: usize,
        target: usize,
        side: Side,
        from: Coord<f64>,
    },
    /// Dispatch after reaching a panel from below.
    Sens1 { panel: usize, from: Coord<f64> },
    /// Dispatch after reaching a panel from above.
    Sens2 { panel: usize, from: Coord<f64> },
}

impl Op {
    fn key(&self) -> (u8, usize, PointKey) {
        match *self {
            Op::ProbeRight { panel, from } => (0, panel, PointKey::new(from)),
            Op::ProbeBelow { panel, from } => (1, panel, PointKey::new(from)),
            Op::ProbeLeft { panel, from } => (2, panel, PointKey::new(from)),
            Op::ProbeAbove { panel, from } => (3, panel, PointKey::new(from)),
            Op::ProjectionUp { panel, from, .. } => (4, panel, PointKey::new(from)),
            Op::ProjectionDown { panel, from, .. } => (5, panel, PointKey::new(from)),
            Op::Sens1 { panel, from } => (6, panel, PointKey::new(from)),
            Op::Sens2 { panel, from } => (7, panel, PointKey::new(from)),
        }
    }
}

/// Result of one probe: the outcome and where the walk continues.
#[derive(Debug, Clone, Copy)]
struct Handoff {
    origin: Origin,
    panel: usize,
    target: usize,
    at: Coord<f64>,
}

/// Transition table from a probe outcome to the next operation.
fn next_op(h: Handoff) -> Op {
    let (panel, from) = (h.panel, h.at);
    match h.origin {
        Origin::Start | Origin::RightOk | Origin::AboveKo => Op::ProbeRight { panel, from },
        Origin::RightKo => Op::ProbeBelow { panel, from },
        Origin::BelowOk | Origin::ProjectedDown(_) => Op::Sens2 { panel, from },
        Origin::BelowKo | Origin::LeftOk => Op::ProbeLeft { panel, from },
        Origin::LeftKo => Op::ProbeAbove { panel, from },
        Origin::AboveOk | Origin::ProjectedUp(_) => Op::Sens1 { panel, from },
        Origin::GapAbove(side) => Op::ProjectionUp {
            panel,
            target: h.target,
            side,
            from,
        },
        Origin::GapBelow(side) => Op::ProjectionDown {
            panel,
            target: h.target,
            side,
            from,
        },
    }
}

/// Adjacency tolerances along each axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub x: f64,
    pub y: f64,
}

impl Tolerance {
    /// Tolerances from the spacing used to place the panels.
    pub fn from_spacing(h_spacing: f64, v_spacing: f64, tracker: bool) -> Self {
        let (x, y) = if tracker {
            (v_spacing, h_spacing)
        } else {
            (h_spacing, v_spacing)
        };
        Self {
            x: x + ADJACENCY_BUFFER,
            y: y + ADJACENCY_BUFFER,
        }
    }
}

/// State of one boundary walk.
pub struct BoundaryWalker<'a> {
    grid: &'a PanelGrid,
    tolerance: Tolerance,
    linked_right: Vec<Option<usize>>,
    linked_left: Vec<Option<usize>>,
    call_stack: Vec<Op>,
    segments: SegmentSet,
    visited: HashSet<(u8, usize, PointKey)>,
    origin: Origin,
    iterations: u32,
    max_iterations: u32,
    start: Option<(usize, Coord<f64>)>,
    closed: bool,
}

/// Summary of a finished walk.
#[derive(Debug)]
pub struct WalkOutcome {
    pub segments: SegmentSet,
    pub start: Option<Coord<f64>>,
    pub iterations: u32,
    /// The walk returned to its start.
    pub closed: bool,
}

impl<'a> BoundaryWalker<'a> {
    pub fn new(grid: &'a PanelGrid, tolerance: Tolerance, max_iterations: u32) -> Self {
        let n = grid.len();
        let mut linked_right = vec![None; n];
        let mut linked_left = vec![None; n];
        for idx in 0..n {
            if let Some(next) = grid.right_of(idx) {
                let gap = grid.panel(next).left() - grid.panel(idx).right();
                if (-EPS..=tolerance.x).contains(&gap) {
                    linked_right[idx] = Some(next);
                    linked_left[next] = Some(idx);
                }
            }
        }

        Self {
            grid,
            tolerance,
            linked_right,
            linked_left,
            call_stack: Vec::new(),
            segments: SegmentSet::new(),
            visited: HashSet::new(),
            origin: Origin::Start,
            iterations: 0,
            max_iterations,
            start: None,
            closed: false,
        }
    }

    /// Runs the walk to completion.
    pub fn run(mut self, callback: Option<&ProgressCallback>) -> WalkOutcome {
        if let Some(first) = self.grid.top_left() {
            let from = self.grid.panel(first).corner(Corner::TopLeft);
            self.start = Some((first, from));
            self.call_stack.push(Op::ProbeRight { panel: first, from });
        }

        while let Some(op) = self.call_stack.pop() {
            if self.iterations >= self.max_iterations {
                log::warn!(
                    "boundary walk stopped after {} iterations",
                    self.iterations
                );
                break;
            }
            self.iterations += 1;

            if let Some(callback) = callback {
                if self.iterations % PROGRESS_INTERVAL == 0 {
                    callback(
                        ProgressInfo::new()
                            .with_phase("Boundary Walk")
                            .with_iteration(self.iterations, self.max_iterations)
                            .with_items(self.segments.len())
                            .with_message(format!(
                                "{} iterations, {} segments",
                                self.iterations,
                                self.segments.len()
                            )),
                    );
                }
            }

            if !self.visited.insert(op.key()) {
                log::debug!("boundary walk revisited {:?}", op);
                break;
            }

            let Some(next) = self.execute(op) else {
                continue;
            };
            if self.is_start(&next) {
                self.closed = true;
                break;
            }
            self.call_stack.push(next);
        }

        WalkOutcome {
            segments: self.segments,
            start: self.start.map(|(_, at)| at),
            iterations: self.iterations,
            closed: self.closed,
        }
    }

    fn is_start(&self, op: &Op) -> bool {
        match (op, self.start) {
            (Op::ProbeRight { panel, from }, Some((start, at))) => {
                *panel == start && PointKey::new(*from) == PointKey::new(at)
            }
            _ => false,
        }
    }

    fn execute(&mut self, op: Op) -> Option<Op> {
        let handoff = match op {
            Op::ProbeRight { panel, from } => self.probe_right(panel, from),
            Op::ProbeBelow { panel, from } => self.probe_below(panel, from),
            Op::ProbeLeft { panel, from } => self.probe_left(panel, from),
            Op::ProbeAbove { panel, from } => self.probe_above(panel, from),
            Op::ProjectionUp {
                panel,
                target,
                side,
                from,
            } => self.project(Direction::Up, panel, target, side, from),
            Op::ProjectionDown {
                panel,
                target,
                side,
                from,
            } => self.project(Direction::Down, panel, target, side, from),
            Op::Sens1 { panel, from } => {
                return Some(match self.origin {
                    Origin::ProjectedUp(Side::Before) => Op::ProbeLeft { panel, from },
                    _ => Op::ProbeAbove { panel, from },
                });
            }
            Op::Sens2 { panel, from } => {
                return Some(match self.origin {
                    Origin::ProjectedDown(Side::Before) => Op::ProbeRight { panel, from },
                    _ => Op::ProbeBelow { panel, from },
                });
            }
        };
        self.origin = handoff.origin;
        Some(next_op(handoff))
    }

    fn handoff(&self, origin: Origin, panel: usize, at: Coord<f64>) -> Handoff {
        Handoff {
            origin,
            panel,
            target: panel,
            at,
        }
    }

    fn emit(&mut self, a: Coord<f64>, b: Coord<f64>, origin: Origin) {
        self.segments.push(a, b, origin);
    }

    /// Vertical gap from the top of `lower` to the bottom of `upper` is
    /// within tolerance.
    fn stacked(&self, upper: usize, lower: usize) -> bool {
        let gap = self.grid.panel(upper).bottom() - self.grid.panel(lower).top();
        (-EPS..=self.tolerance.y).contains(&gap)
    }

    /// Left and right extent of the linked run containing `idx`.
    fn run_extent(&self, idx: usize) -> (f64, f64) {
        let mut first = idx;
        while let Some(prev) = self.linked_left[first] {
            first = prev;
        }
        let mut last = idx;
        while let Some(next) = self.linked_right[last] {
            last = next;
        }
        (self.grid.panel(first).left(), self.grid.panel(last).right())
    }

    fn probe_right(&mut self, i: usize, from: Coord<f64>) -> Handoff {
        let grid = self.grid;
        let p = grid.panel(i);
        let x = from.x;
        let reach = match self.linked_right[i] {
            Some(n) => self.grid.panel(n).left(),
            None => p.right(),
        };

        // A run in the row above starting over this top edge.
        let stagger = self
            .grid
            .row_above(i)
            .iter()
            .copied()
            .filter(|&q| self.linked_left[q].is_none() && self.stacked(q, i))
            .filter(|&q| {
                let left = self.grid.panel(q).left();
                left >= x - EPS && left < reach - EPS
            })
            .min_by(|&a, &b| {
                self.grid
                    .panel(a)
                    .left()
                    .total_cmp(&self.grid.panel(b).left())
            });
        if let Some(q) = stagger {
            return Handoff {
                origin: Origin::GapAbove(Side::After),
                panel: i,
                target: q,
                at: from,
            };
        }

        let corner = p.corner(Corner::TopRight);
        if x < p.right() {
            self.emit(from, corner, Origin::RightKo);
        }
        match self.linked_right[i] {
            Some(n) => {
                let landing = self.grid.panel(n).corner(Corner::TopLeft);
                self.emit(corner, landing, Origin::RightOk);
                self.handoff(Origin::RightOk, n, landing)
            }
            None => self.handoff(Origin::RightKo, i, corner),
        }
    }

    fn probe_below(&mut self, i: usize, from: Coord<f64>) -> Handoff {
        let grid = self.grid;
        let p = grid.panel(i);
        let x = p.right();
        let corner = p.corner(Corner::BottomRight);

        let below: Vec<usize> = self
            .grid
            .row_below(i)
            .iter()
            .copied()
            .filter(|&s| self.stacked(i, s))
            .collect();

        let aligned = below.iter().copied().find(|&s| {
            let panel = self.grid.panel(s);
            self.linked_right[s].is_none()
                && (panel.right() - x).abs() <= EPS
                && panel.left() < x - EPS
        });
        if let Some(s) = aligned {
            let landing = self.grid.panel(s).corner(Corner::TopRight);
            self.emit(from, corner, Origin::BelowOk);
            self.emit(corner, landing, Origin::BelowOk);
            return self.handoff(Origin::BelowOk, s, landing);
        }

        // A run below extending past this right side.
        let covering = below
            .iter()
            .copied()
            .filter(|&s| {
                let (start, end) = self.run_extent(s);
                start < x + EPS && end > x + EPS && self.grid.panel(s).right() >= x - EPS
            })
            .min_by(|&a, &b| {
                self.grid
                    .panel(a)
                    .right()
                    .total_cmp(&self.grid.panel(b).right())
            });
        if let Some(s) = covering {
            return Handoff {
                origin: Origin::GapBelow(Side::Before),
                panel: i,
                target: s,
                at: from,
            };
        }

        self.emit(from, corner, Origin::BelowKo);
        self.handoff(Origin::BelowKo, i, corner)
    }

    fn probe_left(&mut self, i: usize, from: Coord<f64>) -> Handoff {
        let grid = self.grid;
        let p = grid.panel(i);
        let x = from.x;
        let reach = match self.linked_left[i] {
            Some(l) => self.grid.panel(l).right(),
            None => p.left(),
        };

        // A run in the row below ending under this bottom edge.
        let stagger = self
            .grid
            .row_below(i)
            .iter()
            .copied()
            .filter(|&u| self.linked_right[u].is_none() && self.stacked(i, u))
            .filter(|&u| {
                let right = self.grid.panel(u).right();
                right > reach + EPS && right <= x + EPS
            })
            .max_by(|&a, &b| {
                self.grid
                    .panel(a)
                    .right()
                    .total_cmp(&self.grid.panel(b).right())
            });
        if let Some(u) = stagger {
            return Handoff {
                origin: Origin::GapBelow(Side::After),
                panel: i,
                target: u,
                at: from,
            };
        }

        let corner = p.corner(Corner::BottomLeft);
        if x > p.left() {
            self.emit(from, corner, Origin::LeftKo);
        }
        match self.linked_left[i] {
            Some(l) => {
                let landing = self.grid.panel(l).corner(Corner::BottomRight);
                self.emit(corner, landing, Origin::LeftOk);
                self.handoff(Origin::LeftOk, l, landing)
            }
            None => self.handoff(Origin::LeftKo, i, corner),
        }
    }

    fn probe_above(&mut self, i: usize, from: Coord<f64>) -> Handoff {
        let grid = self.grid;
        let p = grid.panel(i);
        let x = p.left();
        let corner = p.corner(Corner::TopLeft);

        let above: Vec<usize> = self
            .grid
            .row_above(i)
            .iter()
            .copied()
            .filter(|&r| self.stacked(r, i))
            .collect();

        let aligned = above.iter().copied().find(|&r| {
            let panel = self.grid.panel(r);
            self.linked_left[r].is_none()
                && (panel.left() - x).abs() <= EPS
                && panel.right() > x + EPS
        });
        if let Some(r) = aligned {
            let landing = self.grid.panel(r).corner(Corner::BottomLeft);
            self.emit(from, corner, Origin::AboveOk);
            self.emit(corner, landing, Origin::AboveOk);
            return self.handoff(Origin::AboveOk, r, landing);
        }

        // A run above extending past this left side.
        let covering = above
            .iter()
            .copied()
            .filter(|&r| {
                let (start, end) = self.run_extent(r);
                start < x - EPS && end > x - EPS && self.grid.panel(r).left() <= x + EPS
            })
            .max_by(|&a, &b| {
                self.grid
                    .panel(a)
                    .left()
                    .total_cmp(&self.grid.panel(b).left())
            });
        if let Some(r) = covering {
            return Handoff {
                origin: Origin::GapAbove(Side::Before),
                panel: i,
                target: r,
                at: from,
            };
        }

        self.emit(from, corner, Origin::AboveKo);
        self.handoff(Origin::AboveKo, i, corner)
    }

    fn project(
        &mut self,
        direction: Direction,
        panel: usize,
        target: usize,
        side: Side,
        from: Coord<f64>,
    ) -> Handoff {
        let detour = calcul_projection(
            direction,
            side,
            self.grid.panel(panel),
            self.grid.panel(target),
        );
        let origin = match direction {
            Direction::Up => Origin::ProjectedUp(side),
            Direction::Down => Origin::ProjectedDown(side),
        };
        self.emit(from, detour.projection, origin);
        self.emit(detour.projection, detour.landing, origin);
        self.handoff(origin, target, detour.landing)
    }
}
