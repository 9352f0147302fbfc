use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::id::ItemId;
use crate::placement::Placement;

/// An inventory item as shown in the drag source list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSummary {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl ItemSummary {
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: None,
        }
    }
}

/// Items that have no placement in `placements`, keeping their order.
pub fn unplaced_items(items: &[ItemSummary], placements: &[Placement]) -> Vec<ItemSummary> {
    let placed: HashSet<&ItemId> = placements.iter().map(|p| &p.item_id).collect();
    items
        .iter()
        .filter(|item| !placed.contains(&item.id))
        .cloned()
        .collect()
}
