use serde::{Deserialize, Serialize};

use crate::geometry::{Cell, Rect, Size};
use crate::id::ItemId;
use crate::item::ItemSummary;

/// Advisory bin size for an item. Only ever used to pre-fill a dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinRecommendation {
    pub item_id: ItemId,
    #[serde(default)]
    pub recommended_width_units: Option<u32>,
    #[serde(default)]
    pub recommended_depth_units: Option<u32>,
    #[serde(default)]
    pub reasoning: String,
}

impl BinRecommendation {
    pub fn new(item_id: impl Into<ItemId>, size: Size, reasoning: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            recommended_width_units: Some(size.width_units),
            recommended_depth_units: Some(size.depth_units),
            reasoning: reasoning.into(),
        }
    }

    /// The recommended size, if both dimensions are present and non-zero.
    pub fn size(&self) -> Option<Size> {
        match (self.recommended_width_units, self.recommended_depth_units) {
            (Some(w), Some(d)) if w > 0 && d > 0 => Some(Size::new(w, d)),
            _ => None,
        }
    }
}

/// A dropped item waiting for the user to confirm or cancel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPlacement {
    pub item: ItemSummary,
    pub origin: Cell,
    pub size: Size,
    pub recommendation: Option<BinRecommendation>,
}

impl PendingPlacement {
    pub fn rect(&self) -> Rect {
        Rect::at(self.origin, self.size)
    }

    pub fn recommended_size(&self) -> Option<Size> {
        self.recommendation.as_ref().and_then(BinRecommendation::size)
    }
}

/// Builds the pending placement for an item dropped on `target`.
///
/// Uses the recommendation's size when it is valid, otherwise 1x1.
pub fn propose_placement(
    item: ItemSummary,
    target: Cell,
    recommendation: Option<BinRecommendation>,
) -> PendingPlacement {
    let size = recommendation
        .as_ref()
        .and_then(BinRecommendation::size)
        .unwrap_or_default();

    PendingPlacement {
        item,
        origin: target,
        size,
        recommendation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_valid_recommendation() {
        let rec = BinRecommendation::new("a", Size::new(2, 3), "Long handle");
        let pending = propose_placement(ItemSummary::new("a", "Saw"), Cell::new(1, 0), Some(rec));
        assert_eq!(pending.size, Size::new(2, 3));
        assert_eq!(pending.rect(), Rect::new(1, 0, 2, 3));
    }

    #[test]
    fn zero_dimension_falls_back() {
        let rec = BinRecommendation {
            item_id: ItemId::new("a"),
            recommended_width_units: Some(2),
            recommended_depth_units: Some(0),
            reasoning: String::new(),
        };
        assert_eq!(rec.size(), None);
        let pending = propose_placement(ItemSummary::new("a", "Saw"), Cell::new(0, 0), Some(rec));
        assert_eq!(pending.size, Size::new(1, 1));
        assert!(pending.recommendation.is_some());
    }

    #[test]
    fn missing_fields_deserialize_as_none() {
        let rec: BinRecommendation =
            serde_json::from_str(r#"{"item_id": "a", "recommended_width_units": 2}"#).unwrap();
        assert_eq!(rec.recommended_depth_units, None);
        assert_eq!(rec.size(), None);
    }
}
