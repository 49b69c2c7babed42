//! Coverage boundary tracing.
//!
//! Reconstructs the outer outline of a set of placed items by walking from
//! item to item along validated adjacencies, then chaining the emitted
//! segments into one closed ring.
//!
//! ```rust
//! use solar_layout_core::{Orientation, PlacementConfig};
//! use solar_layout_d2::optimizer::optimize;
//! use solar_layout_d2::tracer::CoverageTracer;
//! use geo::polygon;
//!
//! let site = polygon![
//!     (x: 0.0, y: 0.0),
//!     (x: 0.0005, y: 0.0),
//!     (x: 0.0005, y: 0.0002),
//!     (x: 0.0, y: 0.0002),
//! ];
//! let config = PlacementConfig::new(2.0, 4.0).with_spacing(0.5, 3.0);
//! let layout = optimize(&site, &config).unwrap();
//!
//! if let Some(report) = CoverageTracer::for_config(&config).trace(&layout.items) {
//!     assert!(report.ring.is_closed());
//! }
//! ```

mod assemble;
mod projection;
mod rows;
mod walk;

pub use assemble::{assemble_segments_smartly, PointKey, Segment, SegmentSet};
pub use projection::{calcul_projection, Detour, Direction, Side};
pub use rows::{Corner, PanelGrid, PreparedPanel};
pub use walk::{BoundaryWalker, Op, Origin, Tolerance, WalkOutcome};

use geo::{Area, BoundingRect, Coord, LineString, MultiPoint, Polygon};
use solar_layout_core::{
    LocalFrame, Orientation, PlacedItem, PlacementConfig, ProgressCallback, ProgressInfo,
};

/// Hard cap on walker iterations.
pub const MAX_ITERATIONS: u32 = 10_000;

/// A closed boundary ring.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryRing {
    points: Vec<Coord<f64>>,
}

impl BoundaryRing {
    /// Wraps an already closed point list.
    pub fn new(points: Vec<Coord<f64>>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Coord<f64>] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Coord<f64>> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First and last points are identical.
    pub fn is_closed(&self) -> bool {
        self.points.len() > 1 && self.points.first() == self.points.last()
    }

    /// Number of distinct vertices.
    pub fn distinct_count(&self) -> usize {
        let keys: std::collections::HashSet<PointKey> =
            self.points.iter().map(|c| PointKey::new(*c)).collect();
        keys.len()
    }

    pub fn to_polygon(&self) -> Polygon<f64> {
        Polygon::new(LineString::from(self.points.clone()), vec![])
    }
}

/// Result of one trace.
#[derive(Debug, Clone)]
pub struct TraceReport {
    /// Boundary in geographic coordinates.
    pub ring: BoundaryRing,
    /// Area enclosed by the ring, in square meters.
    pub area_m2: f64,
    pub segment_count: usize,
    pub iterations: u32,
    /// The walk returned to its start instead of stopping early.
    pub completed: bool,
}

/// Boundary tracer for items placed with a given spacing.
#[derive(Debug, Clone)]
pub struct CoverageTracer {
    h_spacing: f64,
    v_spacing: f64,
    orientation: Orientation,
    max_iterations: u32,
}

impl CoverageTracer {
    pub fn new(h_spacing: f64, v_spacing: f64, orientation: Orientation) -> Self {
        Self {
            h_spacing,
            v_spacing,
            orientation,
            max_iterations: MAX_ITERATIONS,
        }
    }

    /// Tracer matching the spacing and orientation of a placement.
    pub fn for_config(config: &PlacementConfig) -> Self {
        Self::new(config.h_spacing, config.v_spacing, config.orientation)
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Traces the outline of `items`.
    pub fn trace(&self, items: &[PlacedItem]) -> Option<TraceReport> {
        self.run(items, None)
    }

    /// Traces the outline, reporting progress every 1000 walker iterations.
    pub fn trace_with_progress(
        &self,
        items: &[PlacedItem],
        callback: ProgressCallback,
    ) -> Option<TraceReport> {
        self.run(items, Some(&callback))
    }

    fn run(&self, items: &[PlacedItem], callback: Option<&ProgressCallback>) -> Option<TraceReport> {
        let frame = frame_for_items(items)?;
        let panels = items
            .iter()
            .enumerate()
            .map(|(i, item)| PreparedPanel::new(i, item, &frame, self.orientation))
            .collect();
        let grid = PanelGrid::build(panels);

        let tolerance = Tolerance::from_spacing(
            self.h_spacing,
            self.v_spacing,
            self.orientation.is_tracker(),
        );
        let outcome = BoundaryWalker::new(&grid, tolerance, self.max_iterations).run(callback);

        let segment_count = outcome.segments.len();
        let local = assemble_segments_smartly(outcome.segments.as_slice(), outcome.start);

        if let Some(callback) = callback {
            callback(
                ProgressInfo::new()
                    .with_phase("Complete")
                    .with_iteration(outcome.iterations, self.max_iterations)
                    .with_items(segment_count)
                    .with_message(format!("{} segments", segment_count))
                    .finished(),
            );
        }

        let Some(local) = local else {
            log::debug!(
                "trace failed: {} segments from {} items",
                segment_count,
                items.len()
            );
            return None;
        };

        let area_m2 = Polygon::new(LineString::from(local.clone()), vec![]).unsigned_area();
        log::debug!(
            "trace: {} items, {} rows, {} segments, {} points, {:.1} m2 in {} iterations",
            items.len(),
            grid.rows().len(),
            segment_count,
            local.len(),
            area_m2,
            outcome.iterations
        );

        Some(TraceReport {
            ring: BoundaryRing::new(local.into_iter().map(|c| frame.to_geographic(c)).collect()),
            area_m2,
            segment_count,
            iterations: outcome.iterations,
            completed: outcome.closed,
        })
    }
}

/// Traces the outline of `items` placed with the given spacing.
pub fn trace(
    items: &[PlacedItem],
    h_spacing: f64,
    v_spacing: f64,
    orientation: Orientation,
) -> Option<BoundaryRing> {
    CoverageTracer::new(h_spacing, v_spacing, orientation)
        .trace(items)
        .map(|report| report.ring)
}

/// Local frame centered on the corners of `items`.
pub(crate) fn frame_for_items(items: &[PlacedItem]) -> Option<LocalFrame> {
    let corners: MultiPoint<f64> = items
        .iter()
        .flat_map(|item| item.corners)
        .map(geo::Point::from)
        .collect();
    corners.bounding_rect().map(LocalFrame::centered_on)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::{coord, Validation};
    use solar_layout_core::ItemKind;

    /// Items in a local frame at the origin, converted to degrees.
    fn items(rects: &[(f64, f64, f64, f64)]) -> Vec<PlacedItem> {
        let frame = LocalFrame::new(coord! { x: 0.0, y: 0.0 });
        rects
            .iter()
            .map(|&(x, y, w, h)| {
                PlacedItem::new(
                    ItemKind::Full,
                    [
                        coord! { x: x, y: y },
                        coord! { x: x, y: y + h },
                        coord! { x: x + w, y: y + h },
                        coord! { x: x + w, y: y },
                    ]
                    .map(|c| frame.to_geographic(c)),
                )
            })
            .collect()
    }

    #[test]
    fn test_trace_single_row() {
        let row: Vec<_> = (0..4).map(|i| (i as f64 * 11.0, 0.0, 10.0, 5.0)).collect();
        let report = CoverageTracer::new(1.0, 1.0, Orientation::Standard)
            .trace(&items(&row))
            .unwrap();
        assert!(report.completed);
        assert!(report.ring.is_closed());
        assert_relative_eq!(report.area_m2, 43.0 * 5.0, epsilon = 1e-3);
    }

    #[test]
    fn test_trace_grid_encloses_gaps() {
        let mut rects = Vec::new();
        for r in 0..3 {
            for c in 0..3 {
                rects.push((c as f64 * 11.0, r as f64 * 6.0, 10.0, 5.0));
            }
        }
        let report = CoverageTracer::new(1.0, 1.0, Orientation::Standard)
            .trace(&items(&rects))
            .unwrap();
        assert!(report.completed);
        assert_relative_eq!(report.area_m2, 32.0 * 17.0, epsilon = 1e-3);
        assert!(report.area_m2 >= 9.0 * 50.0);
    }

    #[test]
    fn test_trace_l_shape() {
        // One panel on top of the left end of a row of three.
        let report = CoverageTracer::new(1.0, 1.0, Orientation::Standard)
            .trace(&items(&[
                (0.0, 6.0, 10.0, 5.0),
                (0.0, 0.0, 10.0, 5.0),
                (11.0, 0.0, 10.0, 5.0),
                (22.0, 0.0, 10.0, 5.0),
            ]))
            .unwrap();
        assert!(report.completed);
        assert_relative_eq!(report.area_m2, 32.0 * 5.0 + 10.0 * 6.0, epsilon = 1e-3);
    }

    #[test]
    fn test_trace_staggered_rows() {
        let report = CoverageTracer::new(1.0, 1.0, Orientation::Standard)
            .trace(&items(&[
                (0.0, 6.0, 10.0, 5.0),
                (11.0, 6.0, 10.0, 5.0),
                (5.0, 0.0, 10.0, 5.0),
                (16.0, 0.0, 10.0, 5.0),
            ]))
            .unwrap();
        assert!(report.completed);
        // Top run 21 x 5, bottom run 21 x 5, and the 16 m overlap of the gap.
        assert_relative_eq!(report.area_m2, 21.0 * 5.0 * 2.0 + 16.0, epsilon = 1e-3);
    }

    #[test]
    fn test_trace_near_aligned_rows() {
        // Top panel overhangs the linked bottom run by 0.05 m on the right.
        let report = CoverageTracer::new(1.0, 1.0, Orientation::Standard)
            .trace(&items(&[
                (0.05, 6.0, 10.0, 5.0),
                (0.0, 0.0, 10.0, 5.0),
                (11.0, 0.0, 10.0, 5.0),
            ]))
            .unwrap();
        assert!(report.completed);
        let polygon = report.ring.to_polygon();
        assert!(polygon.is_valid(), "{:?}", polygon.validation_errors());
        // Bottom run 21 x 5, top panel 10 x 5, and the 10 m wide gap band.
        assert_relative_eq!(report.area_m2, 105.0 + 50.0 + 10.0, epsilon = 1e-3);
    }

    #[test]
    fn test_trace_empty() {
        assert!(trace(&[], 1.0, 1.0, Orientation::Standard).is_none());
    }

    #[test]
    fn test_distinct_count() {
        let ring = BoundaryRing::new(vec![
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 1.0, y: 0.0 },
            coord! { x: 1.0, y: 1.0 },
            coord! { x: 0.0, y: 0.0 },
        ]);
        assert!(ring.is_closed());
        assert_eq!(ring.distinct_count(), 3);
        assert_eq!(ring.len(), 4);
    }

    #[test]
    fn test_progress_reports_completion() {
        use std::sync::{Arc, Mutex};
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        CoverageTracer::new(1.0, 1.0, Orientation::Standard).trace_with_progress(
            &items(&[(0.0, 0.0, 10.0, 5.0)]),
            Box::new(move |info| sink.lock().unwrap().push(info)),
        );
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(!seen[0].running);
    }
}
