//! Local degree/meter conversion.
//!
//! Site polygons arrive in geographic coordinates (x = longitude, y = latitude,
//! degrees). All placement and tracing work happens in a local metric frame
//! centered on the site, using an equirectangular approximation that is
//! accurate enough at parcel scale.

use geo::{Coord, MapCoords, Rect};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Meters per degree of latitude.
pub const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// Local tangent-plane approximation around a geographic origin.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LocalFrame {
    origin: Coord<f64>,
    meters_per_degree_lon: f64,
}

impl LocalFrame {
    /// Creates a frame whose local `(0, 0)` is the given geographic point.
    pub fn new(origin: Coord<f64>) -> Self {
        // Keep the longitude scale away from zero near the poles.
        let scale = origin.y.to_radians().cos().abs().max(1e-6);
        Self {
            origin,
            meters_per_degree_lon: METERS_PER_DEGREE_LAT * scale,
        }
    }

    /// Creates a frame centered on a geographic bounding box.
    pub fn centered_on(bounds: Rect<f64>) -> Self {
        Self::new(bounds.center())
    }

    /// Returns the geographic origin.
    pub fn origin(&self) -> Coord<f64> {
        self.origin
    }

    /// Meters per degree of longitude at the origin latitude.
    pub fn meters_per_degree_lon(&self) -> f64 {
        self.meters_per_degree_lon
    }

    /// Converts a geographic coordinate to local meters.
    pub fn to_local(&self, c: Coord<f64>) -> Coord<f64> {
        Coord {
            x: (c.x - self.origin.x) * self.meters_per_degree_lon,
            y: (c.y - self.origin.y) * METERS_PER_DEGREE_LAT,
        }
    }

    /// Converts local meters back to a geographic coordinate.
    pub fn to_geographic(&self, c: Coord<f64>) -> Coord<f64> {
        Coord {
            x: self.origin.x + c.x / self.meters_per_degree_lon,
            y: self.origin.y + c.y / METERS_PER_DEGREE_LAT,
        }
    }

    /// Projects a whole geometry into local meters.
    pub fn project<G>(&self, geometry: &G) -> G
    where
        G: MapCoords<f64, f64, Output = G>,
    {
        geometry.map_coords(|c| self.to_local(c))
    }

    /// Projects a whole geometry from local meters back to degrees.
    pub fn unproject<G>(&self, geometry: &G) -> G
    where
        G: MapCoords<f64, f64, Output = G>,
    {
        geometry.map_coords(|c| self.to_geographic(c))
    }
}
