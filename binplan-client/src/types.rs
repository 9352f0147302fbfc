use binplan_core::{Cell, ItemId, Placement, Rect, Size, UnitId};
use serde::{Deserialize, Serialize};

/// Body of a create-placement request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePlacement {
    pub unit_id: UnitId,
    pub item_id: ItemId,
    pub grid_x: u32,
    pub grid_y: u32,
    pub width_units: u32,
    pub depth_units: u32,
}

impl CreatePlacement {
    pub fn new(unit_id: UnitId, item_id: ItemId, rect: Rect) -> Self {
        Self {
            unit_id,
            item_id,
            grid_x: rect.x,
            grid_y: rect.y,
            width_units: rect.width,
            depth_units: rect.depth,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.grid_x, self.grid_y, self.width_units, self.depth_units)
    }
}

/// Partial update of a placement. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePlacement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_x: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_y: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_units: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth_units: Option<u32>,
}

impl UpdatePlacement {
    pub fn move_to(origin: Cell) -> Self {
        Self {
            grid_x: Some(origin.x),
            grid_y: Some(origin.y),
            ..Self::default()
        }
    }

    pub fn resize_to(size: Size) -> Self {
        Self {
            width_units: Some(size.width_units),
            depth_units: Some(size.depth_units),
            ..Self::default()
        }
    }

    /// The placement as it would look after this update.
    pub fn apply(&self, placement: &Placement) -> Placement {
        Placement {
            grid_x: self.grid_x.unwrap_or(placement.grid_x),
            grid_y: self.grid_y.unwrap_or(placement.grid_y),
            width_units: self.width_units.unwrap_or(placement.width_units),
            depth_units: self.depth_units.unwrap_or(placement.depth_units),
            ..placement.clone()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoLayoutRequest {
    pub item_ids: Vec<ItemId>,
}

/// One placement proposed by the auto-layout solver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSuggestion {
    pub item_id: ItemId,
    pub grid_x: u32,
    pub grid_y: u32,
    pub width_units: u32,
    pub depth_units: u32,
}

impl LayoutSuggestion {
    pub fn new(item_id: impl Into<ItemId>, rect: Rect) -> Self {
        Self {
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
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub item_ids: Vec<ItemId>,
}

/// Parameters of an item search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Only items without a placement in this unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unplaced_in: Option<UnitId>,
}

impl ItemQuery {
    pub fn unplaced_in(unit_id: UnitId) -> Self {
        Self {
            search: None,
            unplaced_in: Some(unit_id),
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Case-insensitive name match used by in-memory implementations.
    pub fn matches_name(&self, name: &str) -> bool {
        match &self.search {
            Some(needle) => name.to_lowercase().contains(&needle.to_lowercase()),
            None => true,
        }
    }
}
