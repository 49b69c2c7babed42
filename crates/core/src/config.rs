//! Placement configuration.

use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Panel table orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Orientation {
    /// Tables laid out with their width along the x axis (0°).
    #[default]
    Standard,
    /// Single-axis tracker rows (90°). Rows and columns swap roles and so do
    /// the spacing values.
    Tracker,
}

impl Orientation {
    /// Maps an azimuth in degrees to an orientation. Only 0° and 90° are valid.
    pub fn from_degrees(degrees: f64) -> Result<Self> {
        if degrees.abs() < 1e-9 {
            Ok(Self::Standard)
        } else if (degrees - 90.0).abs() < 1e-9 {
            Ok(Self::Tracker)
        } else {
            Err(Error::InvalidConfig(format!(
                "orientation must be 0 or 90 degrees, got {}",
                degrees
            )))
        }
    }

    /// Returns the orientation as degrees.
    pub fn degrees(&self) -> f64 {
        match self {
            Self::Standard => 0.0,
            Self::Tracker => 90.0,
        }
    }

    /// Returns true for tracker orientation.
    pub fn is_tracker(&self) -> bool {
        matches!(self, Self::Tracker)
    }
}

/// What kind of item is being placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LayoutMode {
    /// Rectangular panel tables.
    #[default]
    Solar,
    /// Circular tree crowns approximated by axis-aligned squares.
    Plantation,
}

/// Immutable input of one optimization run.
///
/// Dimensions are in meters. The caller is expected to range-check values
/// before invoking the optimizer; [`PlacementConfig::validate`] only rejects
/// inputs the search cannot work with at all.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PlacementConfig {
    /// Item width. For plantations this is the crown diameter.
    pub item_width: f64,

    /// Item length. Ignored for plantations.
    pub item_length: f64,

    /// Gap between neighbouring items of the same row.
    pub h_spacing: f64,

    /// Gap between neighbouring rows.
    pub v_spacing: f64,

    /// Inward margin applied to the site polygon before placement.
    pub edge_margin: f64,

    pub orientation: Orientation,

    /// Whether half-width items may fill gaps full items cannot.
    pub allow_half: bool,

    pub mode: LayoutMode,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            item_width: 2.0,
            item_length: 4.0,
            h_spacing: 0.5,
            v_spacing: 3.0,
            edge_margin: 0.0,
            orientation: Orientation::default(),
            allow_half: false,
            mode: LayoutMode::default(),
        }
    }
}

impl PlacementConfig {
    /// Creates a solar configuration for items of the given size.
    pub fn new(item_width: f64, item_length: f64) -> Self {
        Self {
            item_width,
            item_length,
            ..Self::default()
        }
    }

    /// Creates a plantation configuration for crowns of the given diameter.
    pub fn plantation(crown_diameter: f64) -> Self {
        Self {
            item_width: crown_diameter,
            item_length: crown_diameter,
            mode: LayoutMode::Plantation,
            ..Self::default()
        }
    }

    /// Sets horizontal and vertical spacing.
    pub fn with_spacing(mut self, h_spacing: f64, v_spacing: f64) -> Self {
        self.h_spacing = h_spacing;
        self.v_spacing = v_spacing;
        self
    }

    /// Sets the edge margin.
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.edge_margin = margin;
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Allows half-width items.
    pub fn with_half_items(mut self, allow: bool) -> Self {
        self.allow_half = allow;
        self
    }

    /// Returns the area of one full item in square meters.
    pub fn item_area(&self) -> f64 {
        let grid = self.effective_grid();
        grid.item_width * grid.item_height
    }

    /// Checks that all dimensions are finite and usable.
    pub fn validate(&self) -> Result<()> {
        if !self.item_width.is_finite() || self.item_width <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "item width must be positive, got {}",
                self.item_width
            )));
        }
        if self.mode == LayoutMode::Solar
            && (!self.item_length.is_finite() || self.item_length <= 0.0)
        {
            return Err(Error::InvalidConfig(format!(
                "item length must be positive, got {}",
                self.item_length
            )));
        }

        let non_negative = [
            ("horizontal spacing", self.h_spacing),
            ("vertical spacing", self.v_spacing),
            ("edge margin", self.edge_margin),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{} must be zero or positive, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Resolves item size and spacing in the placement frame.
    ///
    /// Tracker rows run perpendicular to standard rows, so both the item
    /// dimensions and the spacing values swap. Plantations ignore orientation
    /// and never use half items.
    pub fn effective_grid(&self) -> EffectiveGrid {
        match (self.mode, self.orientation) {
            (LayoutMode::Plantation, _) => EffectiveGrid {
                item_width: self.item_width,
                item_height: self.item_width,
                h_spacing: self.h_spacing,
                v_spacing: self.v_spacing,
                allow_half: false,
            },
            (LayoutMode::Solar, Orientation::Standard) => EffectiveGrid {
                item_width: self.item_width,
                item_height: self.item_length,
                h_spacing: self.h_spacing,
                v_spacing: self.v_spacing,
                allow_half: self.allow_half,
            },
            (LayoutMode::Solar, Orientation::Tracker) => EffectiveGrid {
                item_width: self.item_length,
                item_height: self.item_width,
                h_spacing: self.v_spacing,
                v_spacing: self.h_spacing,
                allow_half: self.allow_half,
            },
        }
    }
}

/// Item size and spacing along the x (column) and y (row) axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveGrid {
    pub item_width: f64,
    pub item_height: f64,
    pub h_spacing: f64,
    pub v_spacing: f64,
    pub allow_half: bool,
}

impl EffectiveGrid {
    /// Distance between the left edges of two neighbouring full items.
    pub fn column_step(&self) -> f64 {
        self.item_width + self.h_spacing
    }

    /// Distance between the bottom edges of two neighbouring rows.
    pub fn row_step(&self) -> f64 {
        self.item_height + self.v_spacing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_grid() {
        let config = PlacementConfig::new(10.0, 5.0).with_spacing(1.0, 2.0);
        let grid = config.effective_grid();
        assert_eq!(grid.item_width, 10.0);
        assert_eq!(grid.item_height, 5.0);
        assert_eq!(grid.column_step(), 11.0);
        assert_eq!(grid.row_step(), 7.0);
    }

    #[test]
    fn test_tracker_swaps_dimensions_and_spacing() {
        let config = PlacementConfig::new(10.0, 5.0)
            .with_spacing(1.0, 2.0)
            .with_orientation(Orientation::Tracker);
        let grid = config.effective_grid();
        assert_eq!(grid.item_width, 5.0);
        assert_eq!(grid.item_height, 10.0);
        assert_eq!(grid.h_spacing, 2.0);
        assert_eq!(grid.v_spacing, 1.0);
    }

    #[test]
    fn test_plantation_is_square_without_halves() {
        let config = PlacementConfig::plantation(6.0)
            .with_half_items(true)
            .with_orientation(Orientation::Tracker);
        let grid = config.effective_grid();
        assert_eq!(grid.item_width, 6.0);
        assert_eq!(grid.item_height, 6.0);
        assert!(!grid.allow_half);
    }

    #[test]
    fn test_orientation_from_degrees() {
        assert_eq!(Orientation::from_degrees(0.0).unwrap(), Orientation::Standard);
        assert_eq!(Orientation::from_degrees(90.0).unwrap(), Orientation::Tracker);
        assert!(Orientation::from_degrees(45.0).is_err());
    }

    #[test]
    fn test_validation() {
        assert!(PlacementConfig::default().validate().is_ok());
        assert!(PlacementConfig::new(0.0, 5.0).validate().is_err());
        assert!(PlacementConfig::new(f64::NAN, 5.0).validate().is_err());
        assert!(PlacementConfig::new(2.0, 5.0)
            .with_margin(-1.0)
            .validate()
            .is_err());
        assert!(PlacementConfig::plantation(4.0).validate().is_ok());
    }
}
