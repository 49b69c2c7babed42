//! Background execution contexts and their message protocol.
//!
//! Each invocation runs on its own thread and reports back over a channel:
//! zero or more [`WorkerMessage::Progress`] messages followed by exactly one
//! [`WorkerMessage::Result`]. Dropping the receiver abandons the run; the
//! thread finishes its bounded loop and exits.

use crate::coverage::compute_coverage_with_progress;
use crate::optimizer::LayoutOptimizer;
use crossbeam_channel::{unbounded, Receiver, Sender};
use geo::{Coord, Polygon, Winding};
use serde::{Deserialize, Serialize};
use solar_layout_core::{
    BestConfig, CoverageMethod, CoverageReport, Error, OptimizeResult, PlacedItem,
    PlacementConfig, ProgressCallback, ProgressInfo, Result,
};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread;

/// Message sent from a background context to its caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerMessage<T> {
    Progress { percent: f64, message: String },
    Result { payload: T },
}

impl<T: Serialize> WorkerMessage<T> {
    /// Serializes the message to its JSON wire form.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::Worker(e.to_string()))
    }
}

impl<T> WorkerMessage<T> {
    fn progress(info: ProgressInfo) -> Self {
        Self::Progress {
            percent: info.percent(),
            message: info.message,
        }
    }
}

/// Optimizer result payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizerPayload {
    pub items: Vec<PlacedItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_config: Option<BestConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tested: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OptimizerPayload {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            best_config: None,
            total_tested: None,
            error: Some(error.into()),
        }
    }
}

impl From<Result<OptimizeResult>> for OptimizerPayload {
    fn from(result: Result<OptimizeResult>) -> Self {
        match result {
            Ok(result) => Self {
                items: result.items,
                best_config: result.best_config,
                total_tested: Some(result.total_tested),
                error: None,
            },
            Err(err) => Self::failure(err.to_string()),
        }
    }
}

/// Tracer result payload. Points are `[lon, lat]` pairs in counter-clockwise
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TracerPayload {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub boundary_points: Vec<[f64; 2]>,
    /// GeoJSON-style polygon coordinates: one counter-clockwise exterior ring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary_polygon: Option<Vec<Vec<[f64; 2]>>>,
    /// Area enclosed by the boundary, in square meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hull_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<CoverageMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TracerPayload {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            boundary_points: Vec::new(),
            boundary_polygon: None,
            hull_area: None,
            segment_count: None,
            method: None,
            error: Some(error.into()),
        }
    }
}

fn pair(c: &Coord<f64>) -> [f64; 2] {
    [c.x, c.y]
}

impl From<Result<CoverageReport>> for TracerPayload {
    fn from(result: Result<CoverageReport>) -> Self {
        match result {
            Ok(report) => {
                let mut exterior = report.boundary.exterior().clone();
                exterior.make_ccw_winding();
                let points: Vec<[f64; 2]> = exterior.coords().map(pair).collect();
                Self {
                    success: true,
                    boundary_polygon: Some(vec![points.clone()]),
                    boundary_points: points,
                    hull_area: Some(report.boundary_area_m2),
                    segment_count: Some(report.segment_count),
                    method: Some(report.method),
                    error: None,
                }
            }
            Err(err) => Self::failure(err.to_string()),
        }
    }
}

/// Runs `job` on a named thread, forwarding progress and exactly one result.
fn spawn_context<T, F>(name: &str, job: F, on_panic: fn() -> T) -> Result<Receiver<WorkerMessage<T>>>
where
    T: Send + 'static,
    F: FnOnce(ProgressCallback) -> T + Send + 'static,
{
    let (tx, rx) = unbounded();
    let context = name.to_string();

    thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            let progress_tx: Sender<WorkerMessage<T>> = tx.clone();
            let callback: ProgressCallback = Box::new(move |info| {
                // Ignored once the caller has dropped the receiver.
                let _ = progress_tx.send(WorkerMessage::progress(info));
            });

            let payload = match catch_unwind(AssertUnwindSafe(|| job(callback))) {
                Ok(payload) => payload,
                Err(_) => {
                    log::warn!("{} panicked", context);
                    on_panic()
                }
            };

            if tx.send(WorkerMessage::Result { payload }).is_err() {
                log::debug!("{}: receiver dropped before the result", context);
            }
        })
        .map_err(|e| Error::Worker(e.to_string()))?;

    Ok(rx)
}

/// Runs one optimization in a background context.
pub fn spawn_optimizer(
    polygon: Polygon<f64>,
    config: PlacementConfig,
) -> Result<Receiver<WorkerMessage<OptimizerPayload>>> {
    spawn_context(
        "layout-optimizer",
        move |callback| {
            LayoutOptimizer::new(config)
                .optimize_with_progress(&polygon, callback)
                .into()
        },
        || OptimizerPayload::failure("optimizer panicked"),
    )
}

/// Traces the coverage outline of `items` in a background context.
///
/// Falls back to hull approximations when tracing fails; the payload's
/// `method` tells them apart.
pub fn spawn_tracer(
    items: Vec<PlacedItem>,
    config: PlacementConfig,
) -> Result<Receiver<WorkerMessage<TracerPayload>>> {
    spawn_context(
        "coverage-tracer",
        move |callback| compute_coverage_with_progress(&items, &config, callback).into(),
        || TracerPayload::failure("tracer panicked"),
    )
}

/// Blocks until the RESULT message arrives, dropping progress messages.
pub fn wait_for_result<T>(rx: &Receiver<WorkerMessage<T>>) -> Result<T> {
    loop {
        match rx.recv() {
            Ok(WorkerMessage::Result { payload }) => return Ok(payload),
            Ok(WorkerMessage::Progress { .. }) => continue,
            Err(_) => return Err(Error::Worker("context ended without a result".into())),
        }
    }
}
