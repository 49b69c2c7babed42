//! Integration tests for solar-layout-d2.

use approx::assert_relative_eq;
use geo::{coord, polygon, Area, BooleanOps, BoundingRect, Coord, Polygon, Validation};
use solar_layout_d2::{
    assemble_segments_smartly, compute_coverage, optimize, spawn_optimizer, spawn_tracer,
    wait_for_result, Anchor, CoverageMethod, CoverageTracer, Error, LocalFrame, Orientation,
    PlacementConfig, WorkerMessage,
};
use solar_layout_core::METERS_PER_DEGREE_LAT;

/// Axis-aligned rectangle of `w` x `h` meters on the equator, in degrees.
fn site(w: f64, h: f64) -> Polygon<f64> {
    let dw = w / METERS_PER_DEGREE_LAT;
    let dh = h / METERS_PER_DEGREE_LAT;
    polygon![(x: 0.0, y: 0.0), (x: dw, y: 0.0), (x: dw, y: dh), (x: 0.0, y: dh)]
}

/// Polygon from vertices given in meters on the equator.
fn site_from_meters(vertices: &[(f64, f64)]) -> Polygon<f64> {
    let coords: Vec<Coord<f64>> = vertices
        .iter()
        .map(|&(x, y)| coord! { x: x / METERS_PER_DEGREE_LAT, y: y / METERS_PER_DEGREE_LAT })
        .collect();
    Polygon::new(coords.into(), vec![])
}

fn strip_config() -> PlacementConfig {
    PlacementConfig::new(10.0, 5.0).with_spacing(1.0, 1.0)
}

mod optimizer_tests {
    use super::*;

    #[test]
    fn test_single_row_strip() {
        let result = optimize(&site(110.0, 6.0), &strip_config()).unwrap();

        assert_eq!(result.items.len(), 10);
        assert_eq!(result.full_count(), 10);
        assert_eq!(result.half_count(), 0);
        assert_eq!(result.total_tested, 400);
    }

    #[test]
    fn test_tracker_with_swapped_dimensions() {
        let standard = optimize(&site(110.0, 6.0), &strip_config()).unwrap();
        let tracker_config = PlacementConfig::new(5.0, 10.0)
            .with_spacing(1.0, 1.0)
            .with_orientation(Orientation::Tracker);
        let tracker = optimize(&site(110.0, 6.0), &tracker_config).unwrap();

        assert_eq!(tracker.items.len(), standard.items.len());
        // Tracker corners start at the world bottom-right.
        let item = &tracker.items[0];
        assert!(item.corners[0].x > item.corners[1].x);
        assert_relative_eq!(item.corners[0].y, item.corners[1].y, epsilon = 1e-12);
    }

    #[test]
    fn test_half_items_fill_the_tail() {
        let config = strip_config().with_half_items(true);
        let result = optimize(&site(38.5, 6.0), &config).unwrap();

        assert_eq!(result.items.len(), 4);
        assert_eq!(result.half_count(), 1);
        let best = result.best_config.unwrap();
        assert_eq!(best.half_count, 1);
        assert_eq!(best.full_count, 3);
    }

    #[test]
    fn test_deterministic() {
        let polygon = site_from_meters(&[(0.0, 0.0), (30.0, 3.0), (35.0, 20.0), (10.0, 25.0)]);
        let config = PlacementConfig::new(2.0, 4.0).with_spacing(0.5, 3.0);

        let first = optimize(&polygon, &config).unwrap();
        let second = optimize(&polygon, &config).unwrap();
        assert_eq!(first.items.len(), second.items.len());
        assert_eq!(first.best_config, second.best_config);
        assert_eq!(first.items, second.items);
    }

    #[test]
    fn test_items_contained_and_bounded() {
        let polygon = site_from_meters(&[
            (0.0, 0.0),
            (30.0, 0.0),
            (30.0, 12.0),
            (15.0, 24.0),
            (0.0, 12.0),
        ]);
        let config = PlacementConfig::new(2.0, 4.0).with_spacing(0.5, 2.0);
        let result = optimize(&polygon, &config).unwrap();
        assert!(result.is_successful());

        let frame = LocalFrame::centered_on(polygon.bounding_rect().unwrap());
        let local_site = frame.project(&polygon);
        let bbox = local_site.bounding_rect().unwrap();
        let max_items = (bbox.width() * bbox.height() / config.item_area()).floor() as usize;
        assert!(result.items.len() <= max_items);

        for item in &result.items {
            let local_item = frame.project(&item.to_polygon());
            let item_area = local_item.unsigned_area();
            let shared = local_site.intersection(&local_item).unsigned_area();
            assert!(
                shared >= 0.99 * item_area,
                "item shares only {:.3} of {:.3} m2",
                shared,
                item_area
            );
        }
    }

    #[test]
    fn test_margin_shrinks_layout() {
        let without = optimize(&site(60.0, 30.0), &strip_config()).unwrap();
        let with = optimize(&site(60.0, 30.0), &strip_config().with_margin(5.0)).unwrap();
        assert!(with.items.len() < without.items.len());
    }

    #[test]
    fn test_margin_beyond_half_width() {
        let err = optimize(&site(100.0, 50.0), &strip_config().with_margin(26.0)).unwrap_err();
        assert!(matches!(err, Error::EmptyBuffer));
        assert_eq!(err.to_string(), "Buffer vide");
    }

    #[test]
    fn test_plantation_squares() {
        let config = PlacementConfig::plantation(4.0).with_spacing(1.0, 1.0);
        let result = optimize(&site(20.0, 20.0), &config).unwrap();
        assert_eq!(result.items.len(), 16);
        assert_eq!(result.half_count(), 0);
        assert_relative_eq!(result.items_area_m2, 16.0 * 16.0, epsilon = 1e-6);
    }

    #[test]
    fn test_first_found_candidate_wins() {
        let result = optimize(&site(110.0, 6.0), &strip_config()).unwrap();
        let best = result.best_config.unwrap();
        assert_eq!(best.candidate.anchor, Anchor::BottomLeft);
        assert_eq!(best.candidate.row_offset_step, 0);
        assert_eq!(best.candidate.col_offset_step, 0);
        assert_eq!(best.item_count, 10);
    }
}

mod tracer_tests {
    use super::*;

    #[test]
    fn test_strip_boundary() {
        let config = strip_config();
        let layout = optimize(&site(110.0, 6.0), &config).unwrap();
        let report = CoverageTracer::for_config(&config)
            .trace(&layout.items)
            .unwrap();

        assert!(report.completed);
        assert!(report.ring.is_closed());
        // Ten 10 m items with 1 m gaps span 109 m.
        assert_relative_eq!(report.area_m2, 109.0 * 5.0, max_relative = 0.01);
        assert!(report.area_m2 >= layout.items_area_m2 - 1e-6);
    }

    #[test]
    fn test_tracker_grid_boundary() {
        let config = PlacementConfig::new(2.0, 8.0)
            .with_spacing(1.0, 2.0)
            .with_orientation(Orientation::Tracker);
        let layout = optimize(&site(30.0, 30.0), &config).unwrap();
        assert_eq!(layout.items.len(), 30);

        let report = CoverageTracer::for_config(&config)
            .trace(&layout.items)
            .unwrap();
        assert!(report.completed);
        // 3 columns of 8 m with 2 m gaps, 10 rows of 2 m with 1 m gaps.
        assert_relative_eq!(report.area_m2, 28.0 * 29.0, max_relative = 1e-6);
    }

    #[test]
    fn test_retrace_is_stable() {
        let config = PlacementConfig::new(2.0, 4.0).with_spacing(0.5, 3.0);
        let layout = optimize(&site(20.0, 15.0), &config).unwrap();
        let tracer = CoverageTracer::for_config(&config);

        let first = tracer.trace(&layout.items).unwrap();
        let second = tracer.trace(&layout.items).unwrap();
        assert_relative_eq!(first.area_m2, second.area_m2, epsilon = 1e-9);
        assert!(first.area_m2 >= layout.items_area_m2 - 1e-6);
    }

    #[test]
    fn test_assembly_always_closes() {
        use solar_layout_d2::tracer::{Origin, SegmentSet};

        let p = |x: f64, y: f64| coord! { x: x, y: y };
        let sets: Vec<Vec<(Coord<f64>, Coord<f64>)>> = vec![
            vec![(p(0.0, 0.0), p(1.0, 0.0))],
            vec![(p(0.0, 0.0), p(4.0, 0.0)), (p(4.0, 0.0), p(4.0, 3.0))],
            vec![
                (p(0.0, 0.0), p(4.0, 0.0)),
                (p(9.0, 9.0), p(9.0, 12.0)),
                (p(4.0, 0.0), p(2.0, 5.0)),
            ],
        ];
        for set in sets {
            let mut segments = SegmentSet::new();
            for (a, b) in set {
                segments.push(a, b, Origin::RightKo);
            }
            if let Some(ring) = assemble_segments_smartly(segments.as_slice(), None) {
                assert_eq!(ring.first(), ring.last());
            }
        }
    }
}

mod coverage_tests {
    use super::*;

    #[test]
    fn test_strip_coverage_rate() {
        let config = strip_config();
        let layout = optimize(&site(110.0, 6.0), &config).unwrap();
        let coverage = compute_coverage(&layout.items, &config).unwrap();

        assert_eq!(coverage.method, CoverageMethod::Tracing);
        assert_relative_eq!(coverage.items_area_m2, 500.0, max_relative = 1e-6);
        assert_relative_eq!(coverage.coverage_rate, 500.0 / 545.0, max_relative = 0.01);
        assert!(coverage.boundary.exterior().is_closed());
    }

    /// Optimizes `polygon`, then checks the traced outline is a simple ring
    /// enclosing every item.
    fn assert_traced_outline(polygon: &Polygon<f64>) {
        let config = PlacementConfig::new(2.0, 4.0).with_spacing(0.5, 2.0);
        let layout = optimize(polygon, &config).unwrap();
        assert!(layout.is_successful());

        let coverage = compute_coverage(&layout.items, &config).unwrap();
        assert_eq!(coverage.method, CoverageMethod::Tracing);
        assert!(
            coverage.boundary.is_valid(),
            "{:?}",
            coverage.boundary.validation_errors()
        );
        assert!(coverage.boundary_area_m2 >= coverage.items_area_m2);

        let frame = LocalFrame::centered_on(coverage.boundary.bounding_rect().unwrap());
        let ring = frame.project(&coverage.boundary);
        let outside: f64 = layout
            .items
            .iter()
            .map(|item| frame.project(&item.to_polygon()).difference(&ring).unsigned_area())
            .sum();
        assert!(outside < 1e-3, "{:.4} m2 of items outside the outline", outside);
    }

    #[test]
    fn test_l_shaped_site_coverage() {
        assert_traced_outline(&site_from_meters(&[
            (0.0, 0.0),
            (25.0, 0.0),
            (25.0, 10.0),
            (10.0, 10.0),
            (10.0, 22.0),
            (0.0, 22.0),
        ]));
    }

    #[test]
    fn test_triangular_site_coverage() {
        assert_traced_outline(&site_from_meters(&[(0.0, 0.0), (30.0, 0.0), (15.0, 24.0)]));
    }

    #[test]
    fn test_hexagonal_site_coverage() {
        let vertices: Vec<(f64, f64)> = (0..6)
            .map(|i| {
                let angle = std::f64::consts::FRAC_PI_3 * i as f64;
                (15.0 + 14.0 * angle.cos(), 15.0 + 14.0 * angle.sin())
            })
            .collect();
        assert_traced_outline(&site_from_meters(&vertices));
    }
}

mod worker_tests {
    use super::*;

    #[test]
    fn test_optimizer_protocol() {
        let rx = spawn_optimizer(site(110.0, 6.0), strip_config()).unwrap();
        let messages: Vec<_> = rx.iter().collect();

        let (last, progress) = messages.split_last().unwrap();
        assert!(progress
            .iter()
            .all(|m| matches!(m, WorkerMessage::Progress { .. })));
        assert!(progress.len() >= 40);

        let json = last.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "RESULT");
        assert_eq!(value["payload"]["totalTested"], 400);
        assert_eq!(value["payload"]["items"].as_array().map(Vec::len), Some(10));
        assert_eq!(value["payload"]["bestConfig"]["anchor"], "bottom_left");
    }

    #[test]
    fn test_optimizer_error_payload() {
        let rx = spawn_optimizer(site(100.0, 50.0), strip_config().with_margin(30.0)).unwrap();
        let payload = wait_for_result(&rx).unwrap();
        assert!(payload.items.is_empty());
        assert_eq!(payload.error.as_deref(), Some("Buffer vide"));
    }

    #[test]
    fn test_tracer_protocol() {
        let config = strip_config();
        let layout = optimize(&site(110.0, 6.0), &config).unwrap();
        let rx = spawn_tracer(layout.items, config).unwrap();
        let payload = wait_for_result(&rx).unwrap();

        assert!(payload.success);
        assert_eq!(payload.method, Some(CoverageMethod::Tracing));
        assert!(payload.boundary_points.len() >= 4);
        assert_eq!(payload.boundary_points.first(), payload.boundary_points.last());
        assert_relative_eq!(payload.hull_area.unwrap(), 545.0, max_relative = 0.01);

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["method"], "tracing");
        assert!(json["boundaryPolygon"][0].is_array());
    }
}
