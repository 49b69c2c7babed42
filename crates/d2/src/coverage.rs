//! Coverage outline and rate.
//!
//! Uses the traced boundary when it is usable, otherwise a concave hull and
//! finally a convex hull over every item corner.

use crate::backend::{GeoBackend, GeometryBackend};
use crate::tracer::{frame_for_items, CoverageTracer, TraceReport};
use geo::{Area, MultiPoint, Point, Validation};
use solar_layout_core::{
    CoverageMethod, CoverageReport, Error, PlacedItem, PlacementConfig, ProgressCallback, Result,
};

/// Traced rings with fewer points are treated as failures.
pub const MIN_RING_POINTS: usize = 4;

/// A traced ring enclosing less than this share of the item area is rejected.
/// Self-intersecting rings are rejected as well.
const MIN_ENCLOSED_SHARE: f64 = 0.99;

/// Computes the coverage outline of `items` with the default backend.
pub fn compute_coverage(items: &[PlacedItem], config: &PlacementConfig) -> Result<CoverageReport> {
    compute_coverage_with(items, config, &GeoBackend::new())
}

/// Computes the coverage outline, forwarding tracer progress.
pub fn compute_coverage_with_progress(
    items: &[PlacedItem],
    config: &PlacementConfig,
    callback: ProgressCallback,
) -> Result<CoverageReport> {
    coverage(items, config, &GeoBackend::new(), Some(callback))
}

/// Computes the coverage outline of `items`.
pub fn compute_coverage_with<B: GeometryBackend + ?Sized>(
    items: &[PlacedItem],
    config: &PlacementConfig,
    backend: &B,
) -> Result<CoverageReport> {
    coverage(items, config, backend, None)
}

fn coverage<B: GeometryBackend + ?Sized>(
    items: &[PlacedItem],
    config: &PlacementConfig,
    backend: &B,
    callback: Option<ProgressCallback>,
) -> Result<CoverageReport> {
    let frame =
        frame_for_items(items).ok_or_else(|| Error::Trace("no items to trace".into()))?;
    let items_area_m2: f64 = items
        .iter()
        .map(|item| backend.area(&frame.project(&item.to_polygon())))
        .sum();

    let tracer = CoverageTracer::for_config(config);
    let traced = match callback {
        Some(callback) => tracer.trace_with_progress(items, callback),
        None => tracer.trace(items),
    }
    .filter(|report| usable(report, items_area_m2));

    let (method, boundary, boundary_area_m2, segment_count) = match traced {
        Some(report) => (
            CoverageMethod::Tracing,
            report.ring.to_polygon(),
            report.area_m2,
            report.segment_count,
        ),
        None => {
            let corners: MultiPoint<f64> = items
                .iter()
                .flat_map(|item| item.corners)
                .map(|c| Point::from(frame.to_local(c)))
                .collect();

            let (method, hull) = match backend.concave_hull(&corners) {
                Ok(hull) if hull.unsigned_area() > 0.0 => (CoverageMethod::ConcaveHull, hull),
                _ => (CoverageMethod::ConvexHull, backend.convex_hull(&corners)?),
            };
            log::warn!(
                "boundary tracing failed for {} items, using {}",
                items.len(),
                method.label()
            );
            let area = backend.area(&hull);
            (method, frame.unproject(&hull), area, 0)
        }
    };

    let coverage_rate = if boundary_area_m2 > 0.0 {
        items_area_m2 / boundary_area_m2
    } else {
        0.0
    };

    Ok(CoverageReport {
        method,
        boundary,
        boundary_area_m2,
        items_area_m2,
        coverage_rate,
        segment_count,
    })
}

fn usable(report: &TraceReport, items_area_m2: f64) -> bool {
    if report.ring.len() < MIN_RING_POINTS {
        return false;
    }
    if report.area_m2 < MIN_ENCLOSED_SHARE * items_area_m2 {
        log::debug!(
            "traced ring encloses {:.1} m2 of {:.1} m2 of items",
            report.area_m2,
            items_area_m2
        );
        return false;
    }
    let polygon = report.ring.to_polygon();
    if !polygon.is_valid() {
        log::debug!(
            "traced ring is not a simple polygon: {:?}",
            polygon.validation_errors()
        );
        return false;
    }
    true
}
