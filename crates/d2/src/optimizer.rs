//! Grid-search layout optimizer.

use crate::backend::{GeoBackend, GeometryBackend};
use crate::boundary::SiteBoundary;
use crate::fill::{GridFiller, LocalItem};
use geo::Polygon;
use solar_layout_core::{
    BestConfig, CandidateConfig, ItemKind, OptimizeResult, PlacementConfig, ProgressCallback,
    ProgressInfo, Result, CANDIDATE_COUNT,
};
use std::time::Instant;

/// Candidates evaluated between two progress reports.
pub const PROGRESS_INTERVAL: usize = 10;

/// Searches the fixed candidate grid for the layout placing the most items.
pub struct LayoutOptimizer<B: GeometryBackend = GeoBackend> {
    config: PlacementConfig,
    backend: B,
}

impl LayoutOptimizer<GeoBackend> {
    /// Creates an optimizer using the default geometry backend.
    pub fn new(config: PlacementConfig) -> Self {
        Self::with_backend(config, GeoBackend::new())
    }
}

impl<B: GeometryBackend> LayoutOptimizer<B> {
    /// Creates an optimizer with a custom geometry backend.
    pub fn with_backend(config: PlacementConfig, backend: B) -> Self {
        Self { config, backend }
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    /// Runs the search.
    pub fn optimize(&self, polygon: &Polygon<f64>) -> Result<OptimizeResult> {
        self.run(polygon, None)
    }

    /// Runs the search, reporting progress every [`PROGRESS_INTERVAL`]
    /// candidates.
    pub fn optimize_with_progress(
        &self,
        polygon: &Polygon<f64>,
        callback: ProgressCallback,
    ) -> Result<OptimizeResult> {
        self.run(polygon, Some(&callback))
    }

    fn run(
        &self,
        polygon: &Polygon<f64>,
        callback: Option<&ProgressCallback>,
    ) -> Result<OptimizeResult> {
        let start = Instant::now();
        self.config.validate()?;

        let site = SiteBoundary::prepare(polygon, self.config.edge_margin, &self.backend)?;
        log::debug!(
            "layout search: {:.1} m2 usable after a {} m margin",
            site.area(),
            site.margin()
        );
        let filler = GridFiller::new(&site, &self.backend, &self.config);

        let mut best: Option<(CandidateConfig, Vec<LocalItem>)> = None;
        let mut tested = 0usize;

        for candidate in CandidateConfig::enumerate() {
            let items = filler.fill(&candidate);
            tested += 1;

            let best_count = best.as_ref().map_or(0, |(_, b)| b.len());
            if items.len() > best_count {
                best = Some((candidate, items));
            }

            if let Some(callback) = callback {
                if tested % PROGRESS_INTERVAL == 0 {
                    let best_count = best.as_ref().map_or(0, |(_, b)| b.len());
                    callback(
                        ProgressInfo::new()
                            .with_phase("Grid Search")
                            .with_iteration(tested as u32, CANDIDATE_COUNT as u32)
                            .with_items(best_count)
                            .with_message(format!(
                                "{}/{} configurations tested, best so far {} items",
                                tested, CANDIDATE_COUNT, best_count
                            )),
                    );
                }
            }
        }

        let mut result = OptimizeResult::new();
        result.total_tested = tested;

        if let Some((candidate, items)) = best {
            let half_count = items.iter().filter(|i| i.kind == ItemKind::Half).count();
            result.items_area_m2 = items.iter().map(LocalItem::area).sum();
            result.best_config = Some(BestConfig {
                candidate,
                item_count: items.len(),
                full_count: items.len() - half_count,
                half_count,
            });
            result.items = items
                .iter()
                .map(|item| item.to_placed(site.frame(), self.config.orientation))
                .collect();
        }
        result.computation_time_ms = start.elapsed().as_millis() as u64;

        match &result.best_config {
            Some(best) => log::debug!(
                "layout search: {} items ({} half) with {:?} row {} col {} in {} ms",
                best.item_count,
                best.half_count,
                best.candidate.anchor,
                best.candidate.row_offset_step,
                best.candidate.col_offset_step,
                result.computation_time_ms
            ),
            None => log::debug!(
                "layout search: no candidate placed an item ({} tested)",
                tested
            ),
        }

        if let Some(callback) = callback {
            callback(
                ProgressInfo::new()
                    .with_phase("Complete")
                    .with_iteration(tested as u32, CANDIDATE_COUNT as u32)
                    .with_items(result.items.len())
                    .with_message(format!("{} items placed", result.items.len()))
                    .finished(),
            );
        }

        Ok(result)
    }
}

/// Runs the search with the default backend.
pub fn optimize(polygon: &Polygon<f64>, config: &PlacementConfig) -> Result<OptimizeResult> {
    LayoutOptimizer::new(config.clone()).optimize(polygon)
}
