use std::collections::{BTreeMap, BTreeSet};

use crate::geometry::Cell;
use crate::id::PlacementId;
use crate::placement::Placement;
use crate::unit::GridBounds;

/// Lookup from grid cell to the placement covering it.
///
/// Rebuilt from the latest fetched placement list whenever it is needed;
/// nothing writes into it incrementally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccupancyMap {
    cells: BTreeMap<Cell, PlacementId>,
    conflicts: BTreeSet<Cell>,
}

/// Marks every cell of every placement as owned by that placement.
///
/// Valid server state never has two placements on one cell. If a stale list
/// does, the placement later in iteration order owns the cell and the cell is
/// recorded in [`OccupancyMap::conflicts`].
pub fn compute_occupancy(placements: &[Placement]) -> OccupancyMap {
    let mut map = OccupancyMap::default();
    for placement in placements {
        for cell in placement.rect().cells() {
            if let Some(previous) = map.cells.insert(cell, placement.id.clone()) {
                if previous != placement.id {
                    map.conflicts.insert(cell);
                }
            }
        }
    }
    map
}

impl OccupancyMap {
    pub fn get(&self, cell: Cell) -> Option<&PlacementId> {
        self.cells.get(&cell)
    }

    pub fn is_free(&self, cell: Cell) -> bool {
        !self.cells.contains_key(&cell)
    }

    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Cell, &PlacementId)> {
        self.cells.iter().map(|(cell, id)| (*cell, id))
    }

    /// Cells claimed by more than one placement.
    pub fn conflicts(&self) -> impl Iterator<Item = Cell> + '_ {
        self.conflicts.iter().copied()
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// Cells currently attributed to `id`.
    pub fn cells_of(&self, id: &PlacementId) -> Vec<Cell> {
        self.cells
            .iter()
            .filter(|(_, owner)| *owner == id)
            .map(|(cell, _)| *cell)
            .collect()
    }

    /// Unoccupied cells inside `bounds`, row by row.
    pub fn free_cells(&self, bounds: GridBounds) -> Vec<Cell> {
        (0..bounds.rows)
            .flat_map(|y| (0..bounds.columns).map(move |x| Cell::new(x, y)))
            .filter(|cell| self.is_free(*cell))
            .collect()
    }
}
