use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use binplan_core::{
    check_overlap, BinRecommendation, Cell, GridUnit, ItemId, ItemSummary, Placement,
    PlacementId, Rect, Size, UnitId, UnitLayout,
};

use crate::error::ClientError;
use crate::service::LayoutService;
use crate::types::{CreatePlacement, ItemQuery, LayoutSuggestion, UpdatePlacement};

/// An in-memory layout service.
///
/// Validates like the real server (bounds, overlap, one placement per item
/// per unit) and runs a first-fit auto-layout. Useful for testing and as a
/// reference implementation; failures can be injected per item.
#[derive(Debug, Default)]
pub struct MemoryLayoutService {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    units: BTreeMap<UnitId, GridUnit>,
    placements: Vec<Placement>,
    items: Vec<ItemSummary>,
    recommendations: HashMap<ItemId, BinRecommendation>,
    failing_creates: HashSet<ItemId>,
    offline: bool,
    next_id: u64,
    mutations: usize,
}

impl MemoryLayoutService {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_unit(&self, unit: GridUnit) {
        self.state().units.insert(unit.id.clone(), unit);
    }

    pub fn add_item(&self, item: ItemSummary) {
        self.state().items.push(item);
    }

    pub fn set_recommendation(&self, recommendation: BinRecommendation) {
        self.state()
            .recommendations
            .insert(recommendation.item_id.clone(), recommendation);
    }

    /// Stores a placement as-is, skipping validation. For seeding stale or conflicting state.
    pub fn insert_placement(&self, placement: Placement) {
        self.state().placements.push(placement);
    }

    /// Makes every create for `item_id` fail with a transport error.
    pub fn fail_creates_for(&self, item_id: impl Into<ItemId>) {
        self.state().failing_creates.insert(item_id.into());
    }

    /// While offline every call fails with a transport error.
    pub fn set_offline(&self, offline: bool) {
        self.state().offline = offline;
    }

    pub fn placements(&self, unit_id: &UnitId) -> Vec<Placement> {
        self.state()
            .placements
            .iter()
            .filter(|p| &p.unit_id == unit_id)
            .cloned()
            .collect()
    }

    /// Number of create, update and delete requests received, including rejected ones.
    pub fn mutation_count(&self) -> usize {
        self.state().mutations
    }
}

fn api_error(status: u16, message: impl Into<String>) -> ClientError {
    ClientError::Api {
        status,
        message: message.into(),
    }
}

impl MemoryState {
    fn check_online(&self) -> Result<(), ClientError> {
        if self.offline {
            return Err(ClientError::Transport("service unreachable".to_string()));
        }
        Ok(())
    }

    fn unit(&self, unit_id: &UnitId) -> Result<&GridUnit, ClientError> {
        self.units
            .get(unit_id)
            .ok_or_else(|| api_error(404, format!("Unit {unit_id} not found")))
    }

    fn unit_placements(&self, unit_id: &UnitId) -> Vec<Placement> {
        self.placements
            .iter()
            .filter(|p| &p.unit_id == unit_id)
            .cloned()
            .collect()
    }

    fn validate(
        &self,
        unit_id: &UnitId,
        rect: Rect,
        exclude: Option<&PlacementId>,
    ) -> Result<(), ClientError> {
        let unit = self.unit(unit_id)?;
        if rect.is_empty() {
            return Err(api_error(422, "Bin size must be at least 1x1"));
        }
        if !rect.fits_within(unit.bounds()) {
            return Err(api_error(
                422,
                format!(
                    "Bin {rect} extends beyond the {}x{} grid",
                    unit.columns, unit.rows
                ),
            ));
        }
        if check_overlap(&self.unit_placements(unit_id), rect, exclude) {
            return Err(api_error(409, format!("Bin {rect} overlaps an existing placement")));
        }
        Ok(())
    }

    fn recommended_size(&self, item_id: &ItemId) -> Size {
        self.recommendations
            .get(item_id)
            .and_then(BinRecommendation::size)
            .unwrap_or_default()
    }
}

/// Row-major first fit. Items that fit nowhere are left out.
fn first_fit(
    unit: &GridUnit,
    placed: &[Placement],
    items: &[(ItemId, Size)],
) -> Vec<LayoutSuggestion> {
    let bounds = unit.bounds();
    let mut taken: Vec<Rect> = placed.iter().map(Placement::rect).collect();
    let mut suggestions = Vec::new();

    for (item_id, size) in items {
        let origin = (0..bounds.rows)
            .flat_map(|y| (0..bounds.columns).map(move |x| Cell::new(x, y)))
            .map(|cell| Rect::at(cell, *size))
            .find(|rect| rect.fits_within(bounds) && !taken.iter().any(|t| t.overlaps(rect)));

        if let Some(rect) = origin {
            taken.push(rect);
            suggestions.push(LayoutSuggestion::new(item_id.clone(), rect));
        }
    }
    suggestions
}

impl LayoutService for MemoryLayoutService {
    async fn get_layout(&self, unit_id: &UnitId) -> Result<UnitLayout, ClientError> {
        let state = self.state();
        state.check_online()?;
        Ok(UnitLayout {
            unit: state.unit(unit_id)?.clone(),
            placements: state.unit_placements(unit_id),
        })
    }

    async fn create_placement(&self, request: &CreatePlacement) -> Result<Placement, ClientError> {
        let mut state = self.state();
        state.check_online()?;
        state.mutations += 1;

        if state.failing_creates.contains(&request.item_id) {
            return Err(ClientError::Transport("connection reset".to_string()));
        }
        state.validate(&request.unit_id, request.rect(), None)?;
        let already_placed = state
            .placements
            .iter()
            .any(|p| p.unit_id == request.unit_id && p.item_id == request.item_id);
        if already_placed {
            return Err(api_error(409, "Item is already placed in this unit"));
        }

        state.next_id += 1;
        let placement = Placement::new(
            format!("placement-{}", state.next_id),
            request.unit_id.clone(),
            request.item_id.clone(),
            request.rect(),
        );
        state.placements.push(placement.clone());
        Ok(placement)
    }

    async fn update_placement(
        &self,
        id: &PlacementId,
        request: &UpdatePlacement,
    ) -> Result<Placement, ClientError> {
        let mut state = self.state();
        state.check_online()?;
        state.mutations += 1;

        let index = state
            .placements
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| api_error(404, format!("Placement {id} not found")))?;
        let updated = request.apply(&state.placements[index]);
        state.validate(&updated.unit_id, updated.rect(), Some(id))?;

        state.placements[index] = updated.clone();
        Ok(updated)
    }

    async fn delete_placement(&self, id: &PlacementId) -> Result<(), ClientError> {
        let mut state = self.state();
        state.check_online()?;
        state.mutations += 1;

        let before = state.placements.len();
        state.placements.retain(|p| &p.id != id);
        if state.placements.len() == before {
            return Err(api_error(404, format!("Placement {id} not found")));
        }
        Ok(())
    }

    async fn request_auto_layout(
        &self,
        unit_id: &UnitId,
        item_ids: &[ItemId],
    ) -> Result<Vec<LayoutSuggestion>, ClientError> {
        let state = self.state();
        state.check_online()?;
        let unit = state.unit(unit_id)?;
        let placed = state.unit_placements(unit_id);

        let pending: Vec<(ItemId, Size)> = item_ids
            .iter()
            .filter(|id| !placed.iter().any(|p| &p.item_id == *id))
            .map(|id| (id.clone(), state.recommended_size(id)))
            .collect();
        Ok(first_fit(unit, &placed, &pending))
    }

    async fn request_recommendations(
        &self,
        item_ids: &[ItemId],
    ) -> Result<Vec<BinRecommendation>, ClientError> {
        let state = self.state();
        state.check_online()?;
        Ok(item_ids
            .iter()
            .filter_map(|id| state.recommendations.get(id).cloned())
            .collect())
    }

    async fn search_items(&self, query: &ItemQuery) -> Result<Vec<ItemSummary>, ClientError> {
        let state = self.state();
        state.check_online()?;
        let placed: HashSet<&ItemId> = match &query.unplaced_in {
            Some(unit_id) => state
                .placements
                .iter()
                .filter(|p| &p.unit_id == unit_id)
                .map(|p| &p.item_id)
                .collect(),
            None => HashSet::new(),
        };
        Ok(state
            .items
            .iter()
            .filter(|item| query.matches_name(&item.name) && !placed.contains(&item.id))
            .cloned()
            .collect())
    }
}
