//! Tracer input preparation: panels in local meters grouped into rows.

use geo::Coord;
use solar_layout_core::{ItemKind, LocalFrame, Orientation, PlacedItem};
use std::collections::HashMap;

/// Rows group panels whose mean Y differs by less than this share of the
/// smallest panel height.
pub const ROW_GROUPING_RATIO: f64 = 0.3;

/// Corner of a prepared panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    BottomLeft,
    TopLeft,
    TopRight,
    BottomRight,
}

/// A placed item re-expressed in the local metric frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedPanel {
    /// `"{index}_{kind}"`, for diagnostics.
    pub id: String,
    pub index: usize,
    pub kind: ItemKind,
    /// Bottom-left, top-left, top-right, bottom-right.
    pub corners: [Coord<f64>; 4],
    pub centroid: Coord<f64>,
    pub min: Coord<f64>,
    pub max: Coord<f64>,
}

impl PreparedPanel {
    /// Projects an item and normalizes its corner order.
    ///
    /// Tracker items list their corners one position later than standard
    /// items, so they are rotated back by one.
    pub fn new(
        index: usize,
        item: &PlacedItem,
        frame: &LocalFrame,
        orientation: Orientation,
    ) -> Self {
        let mut corners = item.corners.map(|c| frame.to_local(c));
        if orientation.is_tracker() {
            corners.rotate_left(1);
        }

        let mut min = corners[0];
        let mut max = corners[0];
        for c in &corners[1..] {
            min.x = min.x.min(c.x);
            min.y = min.y.min(c.y);
            max.x = max.x.max(c.x);
            max.y = max.y.max(c.y);
        }
        let centroid = corners
            .iter()
            .fold(Coord { x: 0.0, y: 0.0 }, |acc, c| acc + *c)
            / 4.0;

        Self {
            id: format!("{}_{}", index, item.kind.label()),
            index,
            kind: item.kind,
            corners,
            centroid,
            min,
            max,
        }
    }

    pub fn left(&self) -> f64 {
        self.min.x
    }

    pub fn right(&self) -> f64 {
        self.max.x
    }

    pub fn bottom(&self) -> f64 {
        self.min.y
    }

    pub fn top(&self) -> f64 {
        self.max.y
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Axis-aligned corner of the panel's bounds.
    pub fn corner(&self, corner: Corner) -> Coord<f64> {
        match corner {
            Corner::BottomLeft => self.min,
            Corner::TopLeft => Coord {
                x: self.min.x,
                y: self.max.y,
            },
            Corner::TopRight => self.max,
            Corner::BottomRight => Coord {
                x: self.max.x,
                y: self.min.y,
            },
        }
    }
}

/// Panels grouped into rows, with a `(row, col)` position index.
#[derive(Debug, Clone)]
pub struct PanelGrid {
    panels: Vec<PreparedPanel>,
    /// Rows top to bottom, each left to right.
    rows: Vec<Vec<usize>>,
    slots: Vec<(usize, usize)>,
    positions: HashMap<(usize, usize), usize>,
}

impl PanelGrid {
    /// Groups panels into rows.
    pub fn build(panels: Vec<PreparedPanel>) -> Self {
        let min_height = panels
            .iter()
            .map(PreparedPanel::height)
            .fold(f64::INFINITY, f64::min);
        let threshold = ROW_GROUPING_RATIO * min_height;

        let mut order: Vec<usize> = (0..panels.len()).collect();
        order.sort_by(|&a, &b| panels[b].centroid.y.total_cmp(&panels[a].centroid.y));

        let mut rows: Vec<Vec<usize>> = Vec::new();
        let mut row_mean = 0.0;
        for idx in order {
            let y = panels[idx].centroid.y;
            match rows.last_mut() {
                Some(row) if (y - row_mean).abs() < threshold => {
                    row.push(idx);
                    row_mean += (y - row_mean) / row.len() as f64;
                }
                _ => {
                    rows.push(vec![idx]);
                    row_mean = y;
                }
            }
        }

        for row in &mut rows {
            row.sort_by(|&a, &b| panels[a].centroid.x.total_cmp(&panels[b].centroid.x));
        }

        let mut slots = vec![(0, 0); panels.len()];
        let mut positions = HashMap::with_capacity(panels.len());
        for (r, row) in rows.iter().enumerate() {
            for (c, &idx) in row.iter().enumerate() {
                slots[idx] = (r, c);
                positions.insert((r, c), idx);
            }
        }

        Self {
            panels,
            rows,
            slots,
            positions,
        }
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    pub fn panel(&self, idx: usize) -> &PreparedPanel {
        &self.panels[idx]
    }

    pub fn panels(&self) -> &[PreparedPanel] {
        &self.panels
    }

    pub fn rows(&self) -> &[Vec<usize>] {
        &self.rows
    }

    /// `(row, col)` of a panel.
    pub fn slot(&self, idx: usize) -> (usize, usize) {
        self.slots[idx]
    }

    pub fn at(&self, row: usize, col: usize) -> Option<usize> {
        self.positions.get(&(row, col)).copied()
    }

    pub fn right_of(&self, idx: usize) -> Option<usize> {
        let (r, c) = self.slots[idx];
        self.at(r, c + 1)
    }

    pub fn left_of(&self, idx: usize) -> Option<usize> {
        let (r, c) = self.slots[idx];
        c.checked_sub(1).and_then(|c| self.at(r, c))
    }

    pub fn row_above(&self, idx: usize) -> &[usize] {
        let (r, _) = self.slots[idx];
        match r.checked_sub(1) {
            Some(r) => &self.rows[r],
            None => &[],
        }
    }

    pub fn row_below(&self, idx: usize) -> &[usize] {
        let (r, _) = self.slots[idx];
        match self.rows.get(r + 1) {
            Some(row) => row,
            None => &[],
        }
    }

    /// Left-most panel of the top row.
    pub fn top_left(&self) -> Option<usize> {
        self.rows.first().and_then(|row| row.first()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::coord;

    fn panel(index: usize, x: f64, y: f64, w: f64, h: f64) -> PreparedPanel {
        let frame = LocalFrame::new(coord! { x: 0.0, y: 0.0 });
        let item = PlacedItem::new(
            ItemKind::Full,
            [
                frame.to_geographic(coord! { x: x, y: y }),
                frame.to_geographic(coord! { x: x, y: y + h }),
                frame.to_geographic(coord! { x: x + w, y: y + h }),
                frame.to_geographic(coord! { x: x + w, y: y }),
            ],
        );
        PreparedPanel::new(index, &item, &frame, Orientation::Standard)
    }

    #[test]
    fn test_panel_bounds() {
        let p = panel(3, 1.0, 2.0, 10.0, 5.0);
        assert_eq!(p.id, "3_full");
        assert!((p.left() - 1.0).abs() < 1e-9);
        assert!((p.top() - 7.0).abs() < 1e-9);
        assert!((p.width() - 10.0).abs() < 1e-9);
        assert!((p.centroid.x - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_tracker_corner_normalization() {
        let frame = LocalFrame::new(coord! { x: 0.0, y: 0.0 });
        let bl = coord! { x: 0.0, y: 0.0 };
        let tl = coord! { x: 0.0, y: 2.0 };
        let tr = coord! { x: 8.0, y: 2.0 };
        let br = coord! { x: 8.0, y: 0.0 };
        let item = PlacedItem::new(
            ItemKind::Full,
            [br, bl, tl, tr].map(|c| frame.to_geographic(c)),
        );
        let p = PreparedPanel::new(0, &item, &frame, Orientation::Tracker);
        assert!((p.corners[0].x - bl.x).abs() < 1e-9);
        assert!((p.corners[2].x - tr.x).abs() < 1e-9);
        assert!((p.corners[2].y - tr.y).abs() < 1e-9);
    }

    #[test]
    fn test_rows_top_to_bottom() {
        // Two rows of two, inserted out of order.
        let grid = PanelGrid::build(vec![
            panel(0, 11.0, 0.0, 10.0, 5.0),
            panel(1, 0.0, 6.0, 10.0, 5.0),
            panel(2, 0.0, 0.0, 10.0, 5.0),
            panel(3, 11.0, 6.0, 10.0, 5.0),
        ]);
        assert_eq!(grid.rows(), &[vec![1, 3], vec![2, 0]]);
        assert_eq!(grid.top_left(), Some(1));
        assert_eq!(grid.right_of(1), Some(3));
        assert_eq!(grid.left_of(1), None);
        assert_eq!(grid.row_below(1), &[2, 0]);
        assert!(grid.row_above(1).is_empty());
        assert_eq!(grid.slot(0), (1, 1));
    }

    #[test]
    fn test_small_offsets_share_a_row() {
        let grid = PanelGrid::build(vec![
            panel(0, 0.0, 0.0, 10.0, 5.0),
            panel(1, 11.0, 0.8, 10.0, 5.0),
            panel(2, 22.0, 1.6, 10.0, 5.0),
        ]);
        // 0.3 x 5 m = 1.5 m, measured against the running row mean.
        assert_eq!(grid.rows().len(), 1);
        assert_eq!(grid.rows()[0], vec![0, 1, 2]);
    }
}
