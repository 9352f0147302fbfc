use serde::{Deserialize, Serialize};

use crate::error::GridError;
use crate::id::{PlacementId, UnitId};
use crate::placement::Placement;

/// Edge length of one Gridfinity module in millimeters. Display only.
pub const GRID_UNIT_MM: u32 = 42;

/// Physical length of a run of cells.
pub fn cells_to_mm(cells: u32) -> u32 {
    cells * GRID_UNIT_MM
}

/// Grid dimensions in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridBounds {
    pub columns: u32,
    pub rows: u32,
}

impl GridBounds {
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    pub fn cell_count(&self) -> u32 {
        self.columns * self.rows
    }
}

/// A storage unit laid out as a grid of cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridUnit {
    pub id: UnitId,
    pub name: String,
    #[serde(rename = "grid_columns")]
    pub columns: u32,
    #[serde(rename = "grid_rows")]
    pub rows: u32,
    /// Inner container size, if the unit was measured.
    #[serde(default)]
    pub width_mm: Option<f64>,
    #[serde(default)]
    pub depth_mm: Option<f64>,
}

impl GridUnit {
    pub fn new(
        id: impl Into<UnitId>,
        name: impl Into<String>,
        columns: u32,
        rows: u32,
    ) -> Result<Self, GridError> {
        let unit = Self {
            id: id.into(),
            name: name.into(),
            columns,
            rows,
            width_mm: None,
            depth_mm: None,
        };
        unit.validate()?;
        Ok(unit)
    }

    pub fn with_container_mm(mut self, width_mm: f64, depth_mm: f64) -> Self {
        self.width_mm = Some(width_mm);
        self.depth_mm = Some(depth_mm);
        self
    }

    pub fn validate(&self) -> Result<(), GridError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(GridError::InvalidDimensions {
                columns: self.columns,
                rows: self.rows,
            });
        }
        Ok(())
    }

    pub fn bounds(&self) -> GridBounds {
        GridBounds::new(self.columns, self.rows)
    }

    /// Footprint of the grid itself in millimeters.
    pub fn grid_mm(&self) -> (u32, u32) {
        (cells_to_mm(self.columns), cells_to_mm(self.rows))
    }
}

/// A unit together with its placements, in the order the service returned them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitLayout {
    pub unit: GridUnit,
    #[serde(default)]
    pub placements: Vec<Placement>,
}

impl UnitLayout {
    pub fn bounds(&self) -> GridBounds {
        self.unit.bounds()
    }

    pub fn placement(&self, id: &PlacementId) -> Option<&Placement> {
        self.placements.iter().find(|p| &p.id == id)
    }
}
