//! Planar geometry backend.
//!
//! Every geometric predicate the optimizer and the coverage layer need goes
//! through [`GeometryBackend`]. The default [`GeoBackend`] delegates to the
//! `geo` crate. Backend failures, including panics raised inside the geometry
//! library, are turned into [`Error::Geometry`] so callers can treat them as a
//! rejected candidate instead of aborting the run.

use geo::{
    Area, BooleanOps, Buffer, ConcaveHull, Contains, ConvexHull, MultiPoint, MultiPolygon, Polygon,
};
use solar_layout_core::{Error, Result};
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Share of an item's area that must overlap the site for the item to count
/// as fully contained.
pub const CONTAINMENT_RATIO: f64 = 0.99;

/// Concavity passed to the concave hull. Lower values follow the points
/// more closely.
pub const HULL_CONCAVITY: f64 = 2.0;

/// Planar geometry operations used by the layout subsystem.
pub trait GeometryBackend: Send + Sync {
    /// Offsets a polygon by `distance` (negative shrinks).
    fn buffer(&self, polygon: &Polygon<f64>, distance: f64) -> Result<MultiPolygon<f64>>;

    /// Returns true if `container` contains `item`.
    fn contains(&self, container: &Polygon<f64>, item: &Polygon<f64>) -> Result<bool>;

    /// Area of the intersection of two polygons.
    fn intersection_area(&self, a: &Polygon<f64>, b: &Polygon<f64>) -> Result<f64>;

    /// Unsigned area of a polygon.
    fn area(&self, polygon: &Polygon<f64>) -> f64;

    fn concave_hull(&self, points: &MultiPoint<f64>) -> Result<Polygon<f64>>;

    fn convex_hull(&self, points: &MultiPoint<f64>) -> Result<Polygon<f64>>;

    /// Containment test used for every candidate item.
    ///
    /// The item must be reported as contained and share more than
    /// [`CONTAINMENT_RATIO`] of its area with the site. Any backend error
    /// rejects the item.
    fn fully_contains(&self, site: &Polygon<f64>, item: &Polygon<f64>) -> bool {
        let item_area = self.area(item);
        if item_area <= 0.0 {
            return false;
        }

        match self.contains(site, item) {
            Ok(true) => {}
            Ok(false) => return false,
            Err(err) => {
                log::trace!("containment check rejected item: {}", err);
                return false;
            }
        }

        match self.intersection_area(site, item) {
            Ok(shared) => shared > CONTAINMENT_RATIO * item_area,
            Err(err) => {
                log::trace!("intersection check rejected item: {}", err);
                false
            }
        }
    }
}

/// [`GeometryBackend`] built on the `geo` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoBackend;

impl GeoBackend {
    pub fn new() -> Self {
        Self
    }
}

/// Runs a geometry operation, converting a panic into an error.
fn guarded<T>(operation: &str, f: impl FnOnce() -> T) -> Result<T> {
    catch_unwind(AssertUnwindSafe(f))
        .map_err(|_| Error::Geometry(format!("{} panicked", operation)))
}

impl GeometryBackend for GeoBackend {
    fn buffer(&self, polygon: &Polygon<f64>, distance: f64) -> Result<MultiPolygon<f64>> {
        guarded("buffer", || polygon.buffer(distance))
    }

    fn contains(&self, container: &Polygon<f64>, item: &Polygon<f64>) -> Result<bool> {
        guarded("contains", || container.contains(item))
    }

    fn intersection_area(&self, a: &Polygon<f64>, b: &Polygon<f64>) -> Result<f64> {
        guarded("intersection", || a.intersection(b).unsigned_area())
    }

    fn area(&self, polygon: &Polygon<f64>) -> f64 {
        polygon.unsigned_area()
    }

    fn concave_hull(&self, points: &MultiPoint<f64>) -> Result<Polygon<f64>> {
        if points.0.len() < 3 {
            return Err(Error::Geometry("concave hull needs 3 points".into()));
        }
        guarded("concave hull", || points.concave_hull(HULL_CONCAVITY))
    }

    fn convex_hull(&self, points: &MultiPoint<f64>) -> Result<Polygon<f64>> {
        if points.0.len() < 3 {
            return Err(Error::Geometry("convex hull needs 3 points".into()));
        }
        guarded("convex hull", || points.convex_hull())
    }
}
