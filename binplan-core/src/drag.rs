use serde::{Deserialize, Serialize};

use crate::geometry::Cell;
use crate::id::PlacementId;
use crate::item::ItemSummary;
use crate::pending::{propose_placement, BinRecommendation, PendingPlacement};
use crate::placement::Placement;

/// What is being dragged onto the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DragPayload {
    /// An item from the unplaced list.
    Item(ItemSummary),
    /// An existing placement being relocated.
    Placement(Placement),
}

/// What a drop asks the editor to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropAction {
    /// Open the confirmation dialog for a new placement.
    Propose(PendingPlacement),
    /// Relocate a placement, keeping its extent.
    Move { placement_id: PlacementId, origin: Cell },
    /// Dropped back on its own origin.
    Unchanged,
}

/// Turns a finished drag into an action.
///
/// `recommendation` is only consulted for item drags.
pub fn resolve_drop(
    payload: DragPayload,
    target: Cell,
    recommendation: Option<BinRecommendation>,
) -> DropAction {
    match payload {
        DragPayload::Item(item) => {
            DropAction::Propose(propose_placement(item, target, recommendation))
        }
        DragPayload::Placement(placement) if placement.origin() == target => DropAction::Unchanged,
        DragPayload::Placement(placement) => DropAction::Move {
            placement_id: placement.id,
            origin: target,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Rect, Size};

    #[test]
    fn item_drop_proposes() {
        let item = ItemSummary::new("i", "Caliper");
        let rec = BinRecommendation::new("i", Size::new(3, 1), "Long and thin");
        match resolve_drop(DragPayload::Item(item), Cell::new(0, 2), Some(rec)) {
            DropAction::Propose(pending) => {
                assert_eq!(pending.origin, Cell::new(0, 2));
                assert_eq!(pending.size, Size::new(3, 1));
            }
            other => panic!("Expected proposal, got {other:?}"),
        }
    }

    #[test]
    fn placement_drop_moves() {
        let placement = Placement::new("p", "u", "i", Rect::new(0, 0, 2, 2));
        assert_eq!(
            resolve_drop(DragPayload::Placement(placement.clone()), Cell::new(1, 2), None),
            DropAction::Move {
                placement_id: PlacementId::new("p"),
                origin: Cell::new(1, 2),
            }
        );
        assert_eq!(
            resolve_drop(DragPayload::Placement(placement), Cell::new(0, 0), None),
            DropAction::Unchanged
        );
    }

    #[test]
    fn payload_is_tagged_by_type() {
        let payload = DragPayload::Item(ItemSummary::new("i", "Caliper"));
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["type"], "item");
        assert_eq!(value["name"], "Caliper");

        let back: DragPayload = serde_json::from_value(value).unwrap();
        assert_eq!(back, payload);
    }
}
