//! Optimizer and coverage results.

use crate::placement::{BestConfig, PlacedItem};
use geo::Polygon;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of one layout optimization.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct OptimizeResult {
    /// Items of the best candidate, in geographic coordinates.
    pub items: Vec<PlacedItem>,

    /// Winning candidate, `None` when nothing could be placed.
    pub best_config: Option<BestConfig>,

    /// Number of candidates evaluated.
    pub total_tested: usize,

    /// Area covered by the items, in square meters.
    pub items_area_m2: f64,

    /// Computation time in milliseconds.
    pub computation_time_ms: u64,
}

impl OptimizeResult {
    /// Creates a new empty result.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            best_config: None,
            total_tested: 0,
            items_area_m2: 0.0,
            computation_time_ms: 0,
        }
    }

    /// Returns true if at least one item was placed.
    pub fn is_successful(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn full_count(&self) -> usize {
        self.items.iter().filter(|item| !item.is_half()).count()
    }

    pub fn half_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_half()).count()
    }
}

impl Default for OptimizeResult {
    fn default() -> Self {
        Self::new()
    }
}

/// How a coverage boundary was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CoverageMethod {
    /// Exact boundary from the adjacency walk.
    Tracing,
    /// Concave hull approximation over all item corners.
    ConcaveHull,
    /// Convex hull approximation over all item corners.
    ConvexHull,
}

impl CoverageMethod {
    /// Returns the wire label of the method.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Tracing => "tracing",
            Self::ConcaveHull => "concave_hull",
            Self::ConvexHull => "convex_hull",
        }
    }

    /// Returns true for hull approximations.
    pub fn is_approximation(&self) -> bool {
        !matches!(self, Self::Tracing)
    }
}

/// Covered-area outline and the derived coverage rate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CoverageReport {
    pub method: CoverageMethod,

    /// Boundary in geographic coordinates.
    pub boundary: Polygon<f64>,

    /// Area enclosed by the boundary, in square meters.
    pub boundary_area_m2: f64,

    /// Sum of the item areas, in square meters.
    pub items_area_m2: f64,

    /// Items area divided by boundary area (0 when the boundary is empty).
    pub coverage_rate: f64,

    /// Segments produced by the tracer (0 for hull approximations).
    pub segment_count: usize,
}

impl CoverageReport {
    /// Returns the coverage rate as a percentage string.
    pub fn coverage_percent(&self) -> String {
        format!("{:.1}%", self.coverage_rate * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::ItemKind;
    use geo::coord;

    fn item(kind: ItemKind) -> PlacedItem {
        PlacedItem::new(
            kind,
            [
                coord! { x: 0.0, y: 0.0 },
                coord! { x: 0.0, y: 1.0 },
                coord! { x: 1.0, y: 1.0 },
                coord! { x: 1.0, y: 0.0 },
            ],
        )
    }

    #[test]
    fn test_result_new() {
        let result = OptimizeResult::new();
        assert!(!result.is_successful());
        assert_eq!(result.total_tested, 0);
        assert!(result.best_config.is_none());
    }

    #[test]
    fn test_counts() {
        let mut result = OptimizeResult::new();
        result.items = vec![item(ItemKind::Full), item(ItemKind::Half), item(ItemKind::Full)];
        assert!(result.is_successful());
        assert_eq!(result.full_count(), 2);
        assert_eq!(result.half_count(), 1);
    }

    #[test]
    fn test_method_labels() {
        assert_eq!(CoverageMethod::Tracing.label(), "tracing");
        assert!(!CoverageMethod::Tracing.is_approximation());
        assert!(CoverageMethod::ConcaveHull.is_approximation());
        assert_eq!(CoverageMethod::ConvexHull.label(), "convex_hull");
    }
}
