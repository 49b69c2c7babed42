//! # Solar Layout Core
//!
//! Core types shared by the panel layout optimizer and the coverage tracer.
//!
//! ## Core Components
//!
//! - **Configuration**: [`PlacementConfig`], [`Orientation`], [`LayoutMode`]
//! - **Placement types**: [`PlacedItem`], [`ItemKind`], [`Anchor`], [`CandidateConfig`]
//! - **Local frame**: [`LocalFrame`] degree/meter conversion
//! - **Progress**: [`ProgressInfo`], [`ProgressCallback`]
//! - **Results**: [`OptimizeResult`], [`CoverageReport`], [`CoverageMethod`]
//!
//! ## Configuration
//!
//! ```rust
//! use solar_layout_core::{Orientation, PlacementConfig};
//!
//! let config = PlacementConfig::new(2.3, 4.5)
//!     .with_spacing(0.5, 3.0)
//!     .with_margin(5.0)
//!     .with_orientation(Orientation::Tracker)
//!     .with_half_items(true);
//!
//! assert!(config.validate().is_ok());
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod config;
pub mod error;
pub mod geometry;
pub mod placement;
pub mod progress;
pub mod result;

// Re-exports
pub use config::{EffectiveGrid, LayoutMode, Orientation, PlacementConfig};
pub use error::{Error, Result};
pub use geometry::{LocalFrame, METERS_PER_DEGREE_LAT};
pub use placement::{
    Anchor, BestConfig, CandidateConfig, ItemKind, PlacedItem, CANDIDATE_COUNT, OFFSET_STEPS,
};
pub use progress::{ProgressCallback, ProgressInfo};
pub use result::{CoverageMethod, CoverageReport, OptimizeResult};
