//! # Solar Layout 2D
//!
//! Panel layout optimization and coverage boundary tracing over geographic
//! polygons.
//!
//! ## Features
//!
//! - Grid search over 400 anchor/offset candidates, keeping the layout with
//!   the most items
//! - Standard and tracker orientations, optional half items
//! - Plantation mode with square crown footprints
//! - Exact outline reconstruction by walking item adjacencies
//! - Concave/convex hull fallback for coverage reporting
//! - Background contexts with a JSON progress/result protocol
//!
//! ## Quick Start
//!
//! ```rust
//! use geo::polygon;
//! use solar_layout_d2::{compute_coverage, LayoutOptimizer, PlacementConfig};
//!
//! // Roughly 110 m x 45 m near the equator.
//! let site = polygon![
//!     (x: 0.0, y: 0.0),
//!     (x: 0.001, y: 0.0),
//!     (x: 0.001, y: 0.0004),
//!     (x: 0.0, y: 0.0004),
//! ];
//!
//! let config = PlacementConfig::new(2.3, 4.5)
//!     .with_spacing(0.5, 3.0)
//!     .with_margin(2.0)
//!     .with_half_items(true);
//!
//! let result = LayoutOptimizer::new(config.clone()).optimize(&site).unwrap();
//! println!(
//!     "{} items ({} half) after {} candidates",
//!     result.items.len(),
//!     result.half_count(),
//!     result.total_tested
//! );
//!
//! if result.is_successful() {
//!     let coverage = compute_coverage(&result.items, &config).unwrap();
//!     println!("coverage {} via {}", coverage.coverage_percent(), coverage.method.label());
//! }
//! ```
//!
//! ## Background Contexts
//!
//! ```rust
//! use geo::polygon;
//! use solar_layout_d2::worker::{spawn_optimizer, wait_for_result};
//! use solar_layout_d2::PlacementConfig;
//!
//! let site = polygon![(x: 0.0, y: 0.0), (x: 0.0005, y: 0.0), (x: 0.0005, y: 0.0002), (x: 0.0, y: 0.0002)];
//! let rx = spawn_optimizer(site, PlacementConfig::default()).unwrap();
//! let payload = wait_for_result(&rx).unwrap();
//! assert!(payload.error.is_none());
//! ```

pub mod backend;
pub mod boundary;
pub mod coverage;
pub mod fill;
pub mod optimizer;
pub mod tracer;
pub mod worker;

// Re-exports
pub use backend::{GeoBackend, GeometryBackend, CONTAINMENT_RATIO};
pub use boundary::{largest_polygon, SiteBoundary};
pub use coverage::{compute_coverage, compute_coverage_with, compute_coverage_with_progress};
pub use fill::{GridFiller, LocalItem, RowPolicy};
pub use optimizer::{optimize, LayoutOptimizer};
pub use tracer::{assemble_segments_smartly, trace, BoundaryRing, CoverageTracer, TraceReport};
pub use worker::{
    spawn_optimizer, spawn_tracer, wait_for_result, OptimizerPayload, TracerPayload,
    WorkerMessage,
};
pub use solar_layout_core::{
    Anchor, BestConfig, CandidateConfig, CoverageMethod, CoverageReport, Error, ItemKind,
    LayoutMode, LocalFrame, OptimizeResult, Orientation, PlacedItem, PlacementConfig,
    ProgressCallback, ProgressInfo, Result,
};
