//! Site boundary preparation.
//!
//! Turns the caller's geographic polygon into the shrunk metric polygon the
//! grid search fills.

use crate::backend::GeometryBackend;
use geo::{Area, BoundingRect, Intersects, MultiPolygon, Polygon, Rect};
use solar_layout_core::{Error, LocalFrame, Result};

/// Returns the polygon with the largest area, if any.
///
/// Callers with multi-polygon sites reduce them to their largest part before
/// optimizing; the buffer step uses the same rule when shrinking splits a site.
pub fn largest_polygon(multi: MultiPolygon<f64>) -> Option<Polygon<f64>> {
    multi
        .into_iter()
        .filter(|p| p.unsigned_area() > 0.0)
        .max_by(|a, b| a.unsigned_area().total_cmp(&b.unsigned_area()))
}

/// A site polygon ready for placement.
#[derive(Debug, Clone)]
pub struct SiteBoundary {
    /// Local metric frame shared by every candidate of one run.
    frame: LocalFrame,

    /// Site after the inward margin, in local meters.
    shrunk: Polygon<f64>,

    /// Bounding box of the shrunk site, in local meters.
    bounds: Rect<f64>,

    margin: f64,
}

impl SiteBoundary {
    /// Projects the site into meters and shrinks it by `margin`.
    ///
    /// Fails with [`Error::EmptyBuffer`] when nothing polygonal survives the
    /// shrink.
    pub fn prepare<B: GeometryBackend + ?Sized>(
        polygon: &Polygon<f64>,
        margin: f64,
        backend: &B,
    ) -> Result<Self> {
        validate_polygon(polygon)?;

        let geographic_bounds = polygon
            .bounding_rect()
            .ok_or_else(|| Error::InvalidPolygon("polygon has no extent".into()))?;
        let frame = LocalFrame::centered_on(geographic_bounds);
        let local = frame.project(polygon);

        let shrunk = if margin > 0.0 {
            let buffered = backend.buffer(&local, -margin)?;
            largest_polygon(buffered).ok_or(Error::EmptyBuffer)?
        } else {
            local
        };

        let bounds = shrunk.bounding_rect().ok_or(Error::EmptyBuffer)?;
        if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            return Err(Error::EmptyBuffer);
        }

        log::debug!(
            "site prepared: {:.1} x {:.1} m after {:.2} m margin",
            bounds.width(),
            bounds.height(),
            margin
        );

        Ok(Self {
            frame,
            shrunk,
            bounds,
            margin,
        })
    }

    pub fn frame(&self) -> &LocalFrame {
        &self.frame
    }

    /// Shrunk site in local meters.
    pub fn shrunk(&self) -> &Polygon<f64> {
        &self.shrunk
    }

    /// Bounding box of the shrunk site in local meters.
    pub fn bounds(&self) -> Rect<f64> {
        self.bounds
    }

    pub fn margin(&self) -> f64 {
        self.margin
    }

    /// Area of the shrunk site in square meters.
    pub fn area(&self) -> f64 {
        self.shrunk.unsigned_area()
    }

    /// Cheap pre-check: every corner of the rectangle lies in or on the site.
    ///
    /// A rectangle failing this cannot be contained, so the expensive backend
    /// test is skipped.
    pub fn corners_inside(&self, rect: &Rect<f64>) -> bool {
        let (min, max) = (rect.min(), rect.max());
        [
            min,
            geo::coord! { x: min.x, y: max.y },
            max,
            geo::coord! { x: max.x, y: min.y },
        ]
        .iter()
        .all(|c| self.shrunk.intersects(c))
    }
}

fn validate_polygon(polygon: &Polygon<f64>) -> Result<()> {
    let ring = polygon.exterior();
    // Closed rings repeat their first vertex.
    if ring.0.len() < 4 {
        return Err(Error::InvalidPolygon(
            "polygon must have at least 3 vertices".into(),
        ));
    }
    if ring.0.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Err(Error::InvalidPolygon(
            "polygon has non-finite coordinates".into(),
        ));
    }
    if polygon.unsigned_area() <= 0.0 {
        return Err(Error::InvalidPolygon("polygon has zero area".into()));
    }
    Ok(())
}
