//! Row and grid filling for one candidate configuration.
//!
//! A candidate fixes the anchor corner and the row/column offsets; the filler
//! then sweeps the site bounding box row by row, column by column, keeping
//! every item the backend reports as fully contained.

use crate::backend::GeometryBackend;
use crate::boundary::SiteBoundary;
use geo::{coord, Rect};
use solar_layout_core::{
    CandidateConfig, EffectiveGrid, ItemKind, LayoutMode, LocalFrame, Orientation, PlacedItem,
    PlacementConfig,
};

/// Slack used when comparing item edges against the bounding box.
const EDGE_EPS: f64 = 1e-9;

/// Sub-steps per column step in the first-item scan.
const FINE_SCAN_DIVISIONS: f64 = 50.0;

/// How items are positioned along a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowPolicy {
    /// Fine scan for the first item, then fixed steps from it.
    FineScan,
    /// Fixed column positions shared by every row.
    FixedGrid,
}

/// An axis-aligned item in local meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalItem {
    pub kind: ItemKind,
    pub rect: Rect<f64>,
}

impl LocalItem {
    pub fn area(&self) -> f64 {
        self.rect.width() * self.rect.height()
    }

    /// Converts to a geographic item with corners in the orientation's order.
    pub fn to_placed(&self, frame: &LocalFrame, orientation: Orientation) -> PlacedItem {
        let (min, max) = (self.rect.min(), self.rect.max());
        let bottom_left = min;
        let top_left = coord! { x: min.x, y: max.y };
        let top_right = max;
        let bottom_right = coord! { x: max.x, y: min.y };
        let corners = match orientation {
            Orientation::Standard => [bottom_left, top_left, top_right, bottom_right],
            Orientation::Tracker => [bottom_right, bottom_left, top_left, top_right],
        };
        PlacedItem::new(self.kind, corners.map(|c| frame.to_geographic(c)))
    }
}

/// Fills the site for one candidate.
pub struct GridFiller<'a, B: GeometryBackend + ?Sized> {
    site: &'a SiteBoundary,
    backend: &'a B,
    grid: EffectiveGrid,
    policy: RowPolicy,
}

/// Direction-aware cursor along a row.
///
/// The cursor is the leading edge of the next item: its left edge when filling
/// rightward, its right edge when filling leftward.
#[derive(Debug, Clone, Copy)]
struct RowCursor {
    from_left: bool,
    min_x: f64,
    max_x: f64,
}

impl RowCursor {
    fn span(&self, cursor: f64, width: f64) -> (f64, f64) {
        if self.from_left {
            (cursor, cursor + width)
        } else {
            (cursor - width, cursor)
        }
    }

    fn fits(&self, cursor: f64, width: f64) -> bool {
        let (x0, x1) = self.span(cursor, width);
        x0 >= self.min_x - EDGE_EPS && x1 <= self.max_x + EDGE_EPS
    }

    fn advance(&self, cursor: f64, distance: f64) -> f64 {
        if self.from_left {
            cursor + distance
        } else {
            cursor - distance
        }
    }
}

impl<'a, B: GeometryBackend + ?Sized> GridFiller<'a, B> {
    /// Creates a filler for the given site and configuration.
    pub fn new(site: &'a SiteBoundary, backend: &'a B, config: &PlacementConfig) -> Self {
        let policy = match (config.mode, config.orientation) {
            (LayoutMode::Solar, Orientation::Standard) => RowPolicy::FineScan,
            _ => RowPolicy::FixedGrid,
        };
        Self {
            site,
            backend,
            grid: config.effective_grid(),
            policy,
        }
    }

    pub fn policy(&self) -> RowPolicy {
        self.policy
    }

    /// Places every item of one candidate.
    pub fn fill(&self, candidate: &CandidateConfig) -> Vec<LocalItem> {
        let bounds = self.site.bounds();
        let (min, max) = (bounds.min(), bounds.max());
        let height = self.grid.item_height;
        let row_step = self.grid.row_step();
        let row_offset = candidate.row_fraction() * row_step;
        let col_offset = candidate.col_fraction() * self.grid.column_step();

        let cursor = RowCursor {
            from_left: candidate.anchor.from_left(),
            min_x: min.x,
            max_x: max.x,
        };
        let start = if cursor.from_left {
            min.x + col_offset
        } else {
            max.x - col_offset
        };

        let mut items = Vec::new();
        let mut row = 0usize;
        loop {
            let shift = row_offset + row as f64 * row_step;
            let (y0, y1) = if candidate.anchor.from_bottom() {
                (min.y + shift, min.y + shift + height)
            } else {
                (max.y - shift - height, max.y - shift)
            };
            if y0 < min.y - EDGE_EPS || y1 > max.y + EDGE_EPS {
                break;
            }

            match self.policy {
                RowPolicy::FineScan => self.fill_scanned_row(&cursor, start, y0, y1, &mut items),
                RowPolicy::FixedGrid => self.fill_fixed_row(&cursor, start, y0, y1, &mut items),
            }
            row += 1;
        }
        items
    }

    fn half_width(&self) -> f64 {
        self.grid.item_width / 2.0
    }

    fn narrowest(&self) -> f64 {
        if self.grid.allow_half {
            self.half_width()
        } else {
            self.grid.item_width
        }
    }

    fn width_of(&self, kind: ItemKind) -> f64 {
        match kind {
            ItemKind::Full => self.grid.item_width,
            ItemKind::Half => self.half_width(),
        }
    }

    /// Tries a single item at `cursor`.
    fn try_place(
        &self,
        cursor: &RowCursor,
        at: f64,
        kind: ItemKind,
        y0: f64,
        y1: f64,
    ) -> Option<LocalItem> {
        let width = self.width_of(kind);
        if !cursor.fits(at, width) {
            return None;
        }
        let (x0, x1) = cursor.span(at, width);
        let rect = Rect::new(coord! { x: x0, y: y0 }, coord! { x: x1, y: y1 });
        if !self.site.corners_inside(&rect) {
            return None;
        }
        self.backend
            .fully_contains(self.site.shrunk(), &rect.to_polygon())
            .then_some(LocalItem { kind, rect })
    }

    /// Tries a full item, then a half item if allowed.
    fn try_full_then_half(
        &self,
        cursor: &RowCursor,
        at: f64,
        y0: f64,
        y1: f64,
    ) -> Option<LocalItem> {
        self.try_place(cursor, at, ItemKind::Full, y0, y1).or_else(|| {
            if self.grid.allow_half {
                self.try_place(cursor, at, ItemKind::Half, y0, y1)
            } else {
                None
            }
        })
    }

    /// Scans in 1/50 column-step increments for the first fitting item.
    fn scan_first(
        &self,
        cursor: &RowCursor,
        start: f64,
        kind: ItemKind,
        y0: f64,
        y1: f64,
    ) -> Option<LocalItem> {
        let fine_step = self.grid.column_step() / FINE_SCAN_DIVISIONS;
        let width = self.width_of(kind);
        let mut at = start;
        while cursor.fits(at, width) {
            if let Some(item) = self.try_place(cursor, at, kind, y0, y1) {
                return Some(item);
            }
            at = cursor.advance(at, fine_step);
        }
        None
    }

    fn fill_scanned_row(
        &self,
        cursor: &RowCursor,
        start: f64,
        y0: f64,
        y1: f64,
        items: &mut Vec<LocalItem>,
    ) {
        let first = self
            .scan_first(cursor, start, ItemKind::Full, y0, y1)
            .or_else(|| {
                if self.grid.allow_half {
                    self.scan_first(cursor, start, ItemKind::Half, y0, y1)
                } else {
                    None
                }
            });
        let Some(first) = first else {
            return;
        };

        let leading = |item: &LocalItem| {
            if cursor.from_left {
                item.rect.min().x
            } else {
                item.rect.max().x
            }
        };
        let mut at = cursor.advance(
            leading(&first),
            self.width_of(first.kind) + self.grid.h_spacing,
        );
        items.push(first);

        while cursor.fits(at, self.narrowest()) {
            match self.try_full_then_half(cursor, at, y0, y1) {
                Some(item) => {
                    at = cursor.advance(at, self.width_of(item.kind) + self.grid.h_spacing);
                    items.push(item);
                }
                None => at = cursor.advance(at, self.grid.column_step()),
            }
        }
    }

    fn fill_fixed_row(
        &self,
        cursor: &RowCursor,
        start: f64,
        y0: f64,
        y1: f64,
        items: &mut Vec<LocalItem>,
    ) {
        let mut at = start;
        while cursor.fits(at, self.narrowest()) {
            if let Some(item) = self.try_full_then_half(cursor, at, y0, y1) {
                items.push(item);
            }
            at = cursor.advance(at, self.grid.column_step());
        }
    }
}
