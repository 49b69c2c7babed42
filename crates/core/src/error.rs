//! Error types shared by the layout optimizer and the coverage tracer.

use thiserror::Error;

/// Errors produced by the layout subsystem.
///
/// Only input degeneracy and invalid configuration surface as errors. A search
/// that places nothing is an empty result, and a failed trace is `None`.
#[derive(Debug, Error)]
pub enum Error {
    /// Shrinking the site by the edge margin left no polygonal area.
    #[error("Buffer vide")]
    EmptyBuffer,

    #[error("invalid polygon: {0}")]
    InvalidPolygon(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A geometry backend call failed outside of a containment test.
    #[error("geometry operation failed: {0}")]
    Geometry(String),

    #[error("boundary tracing failed: {0}")]
    Trace(String),

    /// A background context failed to start, serialize, or deliver its result.
    #[error("worker failure: {0}")]
    Worker(String),
}

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;
