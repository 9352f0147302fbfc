use serde::{Deserialize, Serialize};

use crate::error::GridError;
use crate::geometry::{Cell, Rect, Size};
use crate::id::{ItemId, PlacementId, UnitId};
use crate::unit::GridBounds;

/// An item's rectangular footprint within a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub id: PlacementId,
    pub unit_id: UnitId,
    pub item_id: ItemId,
    pub grid_x: u32,
    pub grid_y: u32,
    pub width_units: u32,
    pub depth_units: u32,
}

impl Placement {
    pub fn new(
        id: impl Into<PlacementId>,
        unit_id: impl Into<UnitId>,
        item_id: impl Into<ItemId>,
        rect: Rect,
    ) -> Self {
        Self {
            id: id.into(),
            unit_id: unit_id.into(),
            item_id: item_id.into(),
            grid_x: rect.x,
            grid_y: rect.y,
            width_units: rect.width,
            depth_units: rect.depth,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.grid_x, self.grid_y, self.width_units, self.depth_units)
    }

    pub fn origin(&self) -> Cell {
        Cell::new(self.grid_x, self.grid_y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width_units, self.depth_units)
    }
}

/// First placement, other than `exclude`, that intersects `candidate`.
pub fn find_overlap<'a>(
    existing: &'a [Placement],
    candidate: Rect,
    exclude: Option<&PlacementId>,
) -> Option<&'a Placement> {
    existing
        .iter()
        .filter(|p| Some(&p.id) != exclude)
        .find(|p| candidate.overlaps(&p.rect()))
}

/// Whether `candidate` intersects any placement other than `exclude`.
///
/// Pass the placement's own id as `exclude` when checking a move or resize,
/// so the placement does not collide with its previous footprint.
pub fn check_overlap(
    existing: &[Placement],
    candidate: Rect,
    exclude: Option<&PlacementId>,
) -> bool {
    find_overlap(existing, candidate, exclude).is_some()
}

/// Full client-side precheck for a create or update: extent, bounds, then overlap.
pub fn validate_candidate(
    bounds: GridBounds,
    existing: &[Placement],
    candidate: Rect,
    exclude: Option<&PlacementId>,
) -> Result<(), GridError> {
    if candidate.is_empty() {
        return Err(GridError::ZeroExtent {
            width: candidate.width,
            depth: candidate.depth,
        });
    }
    if !candidate.fits_within(bounds) {
        return Err(GridError::OutOfBounds {
            rect: candidate,
            columns: bounds.columns,
            rows: bounds.rows,
        });
    }
    if let Some(other) = find_overlap(existing, candidate, exclude) {
        return Err(GridError::Overlap {
            placement: other.id.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placement(id: &str, rect: Rect) -> Placement {
        Placement::new(id, "unit", format!("item-{id}"), rect)
    }

    #[test]
    fn overlap_against_any_placement() {
        let existing = vec![
            placement("a", Rect::new(0, 0, 1, 1)),
            placement("b", Rect::new(3, 3, 1, 1)),
        ];
        assert!(check_overlap(&existing, Rect::new(2, 2, 2, 2), None));
        assert!(!check_overlap(&existing, Rect::new(1, 1, 2, 2), None));
    }

    #[test]
    fn excluded_placement_is_ignored() {
        let existing = vec![placement("a", Rect::new(0, 0, 2, 2))];
        let id = PlacementId::new("a");
        assert!(!check_overlap(&existing, Rect::new(1, 0, 2, 2), Some(&id)));
        assert!(check_overlap(&existing, Rect::new(1, 0, 2, 2), None));
    }

    #[test]
    fn find_overlap_reports_first_in_order() {
        let existing = vec![
            placement("a", Rect::new(0, 0, 2, 1)),
            placement("b", Rect::new(0, 1, 2, 1)),
        ];
        let hit = find_overlap(&existing, Rect::new(0, 0, 2, 2), None).unwrap();
        assert_eq!(hit.id.as_str(), "a");
    }

    #[test]
    fn validate_reports_reason() {
        let bounds = GridBounds::new(4, 4);
        let existing = vec![placement("a", Rect::new(0, 0, 2, 2))];

        assert_eq!(
            validate_candidate(bounds, &existing, Rect::new(0, 0, 0, 2), None),
            Err(GridError::ZeroExtent { width: 0, depth: 2 })
        );
        assert!(matches!(
            validate_candidate(bounds, &existing, Rect::new(3, 3, 2, 1), None),
            Err(GridError::OutOfBounds { .. })
        ));
        assert_eq!(
            validate_candidate(bounds, &existing, Rect::new(1, 1, 2, 2), None),
            Err(GridError::Overlap {
                placement: PlacementId::new("a")
            })
        );
        assert_eq!(
            validate_candidate(bounds, &existing, Rect::new(2, 2, 2, 2), None),
            Ok(())
        );
    }

    #[test]
    fn placement_json_field_names() {
        let p = placement("a", Rect::new(1, 2, 3, 4));
        let value = serde_json::to_value(&p).unwrap();
        assert_eq!(value["grid_x"], 1);
        assert_eq!(value["grid_y"], 2);
        assert_eq!(value["width_units"], 3);
        assert_eq!(value["depth_units"], 4);
        assert_eq!(value["item_id"], "item-a");
    }
}
