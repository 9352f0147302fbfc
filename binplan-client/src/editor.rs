use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use binplan_core::{
    clamp_custom_size, compute_occupancy, list_size_options, resolve_drop, unplaced_items,
    validate_candidate, BinRecommendation, Cell, DragPayload, DropAction, GridError, ItemId,
    ItemSummary, OccupancyMap, PendingPlacement, Placement, PlacementId, Rect, Size, SizeOption,
    UnitId, UnitLayout,
};
use tracing::{debug, info, warn};

use crate::batch::{settle_all, BatchReport};
use crate::cache::LayoutCache;
use crate::error::EditorError;
use crate::service::LayoutService;
use crate::types::{CreatePlacement, ItemQuery, LayoutSuggestion, UpdatePlacement};

/// Size being edited for an existing placement. The origin never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeDraft {
    pub placement_id: PlacementId,
    pub origin: Cell,
    pub size: Size,
}

impl ResizeDraft {
    pub fn rect(&self) -> Rect {
        Rect::at(self.origin, self.size)
    }
}

/// What a drop onto the grid led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// The confirmation dialog is open for this candidate.
    Proposed(PendingPlacement),
    Moved(Placement),
    Unchanged,
}

#[derive(Debug, Default)]
struct EditorState {
    pending: Option<PendingPlacement>,
    resize: Option<ResizeDraft>,
    error: Option<String>,
    notice: Option<String>,
}

struct MutationGuard<'a> {
    in_flight: &'a AtomicUsize,
}

impl<'a> MutationGuard<'a> {
    fn new(in_flight: &'a AtomicUsize) -> Self {
        in_flight.fetch_add(1, Ordering::SeqCst);
        Self { in_flight }
    }
}

impl Drop for MutationGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Interactive placement workflow for one unit.
///
/// The server is the only source of truth. Every successful mutation
/// invalidates the cached layout and refetches it; nothing is moved or
/// resized locally ahead of the server. Failures are turned into a banner
/// message (see [`PlacementEditor::error`]) and returned to the caller.
///
/// Methods take `&self`, so unrelated mutations may be in flight at the same
/// time. [`PlacementEditor::is_busy`] reports whether any are.
pub struct PlacementEditor<S> {
    service: S,
    unit_id: UnitId,
    cache: LayoutCache,
    state: Mutex<EditorState>,
    in_flight: AtomicUsize,
}

impl<S: LayoutService> PlacementEditor<S> {
    pub fn new(service: S, unit_id: impl Into<UnitId>) -> Self {
        Self {
            service,
            unit_id: unit_id.into(),
            cache: LayoutCache::new(),
            state: Mutex::new(EditorState::default()),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn unit_id(&self) -> &UnitId {
        &self.unit_id
    }

    pub fn cache(&self) -> &LayoutCache {
        &self.cache
    }

    fn state(&self) -> MutexGuard<'_, EditorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn report_error(&self, message: String) {
        warn!(unit = %self.unit_id, "{message}");
        self.state().error = Some(message);
    }

    fn require_layout(&self) -> Result<UnitLayout, EditorError> {
        self.layout().ok_or(EditorError::LayoutNotLoaded)
    }

    /// Banner text of the last failure, if not yet cleared.
    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    /// Informational text, such as the last auto-layout summary.
    pub fn notice(&self) -> Option<String> {
        self.state().notice.clone()
    }

    pub fn clear_error(&self) {
        self.state().error = None;
    }

    /// Whether any create, update, delete or auto-layout call is in flight.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    // Layout

    /// Fetches the unit layout and replaces the cached copy.
    pub async fn refresh(&self) -> Result<UnitLayout, EditorError> {
        match self.service.get_layout(&self.unit_id).await {
            Ok(layout) => {
                let occupancy = compute_occupancy(&layout.placements);
                if occupancy.has_conflicts() {
                    let cells: Vec<String> =
                        occupancy.conflicts().map(|c| c.to_string()).collect();
                    warn!(
                        unit = %self.unit_id,
                        cells = %cells.join(" "),
                        "Layout has overlapping placements"
                    );
                }
                debug!(
                    unit = %self.unit_id,
                    placements = layout.placements.len(),
                    "Layout refreshed"
                );
                self.cache.put_layout(layout.clone());
                Ok(layout)
            }
            Err(e) => {
                self.report_error(e.user_message());
                Err(e.into())
            }
        }
    }

    /// The last fetched layout.
    pub fn layout(&self) -> Option<UnitLayout> {
        self.cache.layout(&self.unit_id)
    }

    /// Occupancy derived from the last fetched layout.
    pub fn occupancy(&self) -> Option<OccupancyMap> {
        self.layout().map(|layout| compute_occupancy(&layout.placements))
    }

    async fn after_mutation(&self) {
        self.cache.invalidate_unit(&self.unit_id);
        // refresh already reports its own failure
        let _ = self.refresh().await;
    }

    /// Items without a placement in this unit, optionally filtered by name.
    pub async fn unplaced_items(
        &self,
        search: Option<String>,
    ) -> Result<Vec<ItemSummary>, EditorError> {
        let query = ItemQuery {
            search,
            unplaced_in: Some(self.unit_id.clone()),
        };
        let items = match self.cache.items(&query) {
            Some(items) => items,
            None => {
                let items = self.service.search_items(&query).await.inspect_err(|e| {
                    self.report_error(e.user_message());
                })?;
                self.cache.put_items(query, items.clone());
                items
            }
        };

        // the item list and the layout are fetched separately and may disagree
        Ok(match self.layout() {
            Some(layout) => unplaced_items(&items, &layout.placements),
            None => items,
        })
    }

    /// Recommendations for `item_ids`, as the service returns them.
    pub async fn recommendations(
        &self,
        item_ids: &[ItemId],
    ) -> Result<Vec<BinRecommendation>, EditorError> {
        Ok(self.service.request_recommendations(item_ids).await?)
    }

    async fn recommendation_for(&self, item_id: &ItemId) -> Option<BinRecommendation> {
        match self
            .service
            .request_recommendations(std::slice::from_ref(item_id))
            .await
        {
            Ok(recommendations) => recommendations.into_iter().find(|r| &r.item_id == item_id),
            Err(e) => {
                debug!(item = %item_id, error = %e, "No bin recommendation");
                None
            }
        }
    }

    // Drag and drop

    /// Handles a finished drag over `target`.
    ///
    /// Items open the confirmation dialog, pre-sized from their bin
    /// recommendation. Placements are moved straight away.
    pub async fn drop_onto(
        &self,
        payload: DragPayload,
        target: Cell,
    ) -> Result<DropOutcome, EditorError> {
        let recommendation = match &payload {
            DragPayload::Item(item) => self.recommendation_for(&item.id).await,
            DragPayload::Placement(_) => None,
        };

        match resolve_drop(payload, target, recommendation) {
            DropAction::Propose(pending) => {
                debug!(item = %pending.item.id, rect = %pending.rect(), "Placement proposed");
                let mut state = self.state();
                state.pending = Some(pending.clone());
                state.error = None;
                Ok(DropOutcome::Proposed(pending))
            }
            DropAction::Move {
                placement_id,
                origin,
            } => self
                .move_placement(&placement_id, origin)
                .await
                .map(DropOutcome::Moved),
            DropAction::Unchanged => Ok(DropOutcome::Unchanged),
        }
    }

    // Pending placement

    pub fn pending(&self) -> Option<PendingPlacement> {
        self.state().pending.clone()
    }

    /// Applies a typed-in size, clamped to the grid. Returns the size actually used.
    pub fn set_pending_size(&self, size: Size) -> Option<Size> {
        let bounds = self.layout()?.bounds();
        let mut state = self.state();
        let pending = state.pending.as_mut()?;
        pending.size = clamp_custom_size(pending.origin, bounds, size);
        Some(pending.size)
    }

    /// Presets available at the pending origin.
    pub fn pending_size_options(&self) -> Vec<SizeOption> {
        let (Some(layout), Some(pending)) = (self.layout(), self.pending()) else {
            return Vec::new();
        };
        list_size_options(
            pending.origin,
            layout.bounds(),
            &layout.placements,
            None,
            pending.recommended_size(),
        )
    }

    /// Why the pending candidate cannot be placed as sized, if anything.
    pub fn pending_conflict(&self) -> Option<GridError> {
        let (layout, pending) = (self.layout()?, self.pending()?);
        validate_candidate(layout.bounds(), &layout.placements, pending.rect(), None).err()
    }

    pub fn can_confirm(&self) -> bool {
        !self.is_busy()
            && self.layout().is_some()
            && self.pending().is_some()
            && self.pending_conflict().is_none()
    }

    /// Creates the pending placement.
    ///
    /// On failure the pending placement stays open so the user can adjust
    /// and retry.
    pub async fn confirm_pending(&self) -> Result<Placement, EditorError> {
        let pending = self.pending().ok_or(EditorError::NoPendingPlacement)?;
        let layout = self.require_layout()?;

        if let Err(e) =
            validate_candidate(layout.bounds(), &layout.placements, pending.rect(), None)
        {
            self.report_error(e.to_string());
            return Err(e.into());
        }

        let request =
            CreatePlacement::new(self.unit_id.clone(), pending.item.id.clone(), pending.rect());
        let result = {
            let _guard = MutationGuard::new(&self.in_flight);
            self.service.create_placement(&request).await
        };

        match result {
            Ok(placement) => {
                info!(
                    placement = %placement.id,
                    item = %placement.item_id,
                    rect = %placement.rect(),
                    "Placement created"
                );
                {
                    // a newer drop may have replaced the dialog while the create was in flight
                    let mut state = self.state();
                    if state.pending.as_ref() == Some(&pending) {
                        state.pending = None;
                    }
                    state.error = None;
                }
                self.after_mutation().await;
                Ok(placement)
            }
            Err(e) => {
                self.report_error(e.user_message());
                Err(e.into())
            }
        }
    }

    pub fn cancel_pending(&self) {
        let mut state = self.state();
        state.pending = None;
        state.error = None;
    }

    // Existing placements

    fn placement(&self, layout: &UnitLayout, id: &PlacementId) -> Result<Placement, EditorError> {
        layout
            .placement(id)
            .cloned()
            .ok_or_else(|| EditorError::UnknownPlacement(id.clone()))
    }

    async fn submit_update(
        &self,
        id: &PlacementId,
        candidate: Rect,
        update: UpdatePlacement,
    ) -> Result<Placement, EditorError> {
        let layout = self.require_layout()?;
        self.placement(&layout, id)?;

        if let Err(e) =
            validate_candidate(layout.bounds(), &layout.placements, candidate, Some(id))
        {
            self.report_error(e.to_string());
            return Err(e.into());
        }

        let result = {
            let _guard = MutationGuard::new(&self.in_flight);
            self.service.update_placement(id, &update).await
        };

        match result {
            Ok(placement) => {
                info!(placement = %placement.id, rect = %placement.rect(), "Placement updated");
                self.clear_error();
                self.after_mutation().await;
                Ok(placement)
            }
            Err(e) => {
                self.report_error(e.user_message());
                Err(e.into())
            }
        }
    }

    /// Moves a placement to `origin`, keeping its extent.
    ///
    /// The cached layout is left untouched until the server accepts the move.
    pub async fn move_placement(
        &self,
        id: &PlacementId,
        origin: Cell,
    ) -> Result<Placement, EditorError> {
        let layout = self.require_layout()?;
        let current = self.placement(&layout, id)?;
        let candidate = Rect::at(origin, current.size());
        self.submit_update(id, candidate, UpdatePlacement::move_to(origin))
            .await
    }

    /// Changes a placement's extent, keeping its origin.
    pub async fn resize_placement(
        &self,
        id: &PlacementId,
        size: Size,
    ) -> Result<Placement, EditorError> {
        let layout = self.require_layout()?;
        let current = self.placement(&layout, id)?;
        let candidate = Rect::at(current.origin(), size);
        self.submit_update(id, candidate, UpdatePlacement::resize_to(size))
            .await
    }

    /// Opens the edit dialog for `id` with its current size.
    pub fn begin_resize(&self, id: &PlacementId) -> Result<ResizeDraft, EditorError> {
        let layout = self.require_layout()?;
        let placement = self.placement(&layout, id)?;
        let draft = ResizeDraft {
            placement_id: placement.id.clone(),
            origin: placement.origin(),
            size: placement.size(),
        };
        self.state().resize = Some(draft.clone());
        Ok(draft)
    }

    pub fn resize_draft(&self) -> Option<ResizeDraft> {
        self.state().resize.clone()
    }

    /// Applies a typed-in size to the edit dialog, clamped to the grid.
    pub fn set_resize_size(&self, size: Size) -> Option<Size> {
        let bounds = self.layout()?.bounds();
        let mut state = self.state();
        let draft = state.resize.as_mut()?;
        draft.size = clamp_custom_size(draft.origin, bounds, size);
        Some(draft.size)
    }

    /// Presets available for the placement being resized.
    pub fn resize_size_options(&self) -> Vec<SizeOption> {
        let (Some(layout), Some(draft)) = (self.layout(), self.resize_draft()) else {
            return Vec::new();
        };
        list_size_options(
            draft.origin,
            layout.bounds(),
            &layout.placements,
            Some(&draft.placement_id),
            None,
        )
    }

    pub fn resize_conflict(&self) -> Option<GridError> {
        let (layout, draft) = (self.layout()?, self.resize_draft()?);
        validate_candidate(
            layout.bounds(),
            &layout.placements,
            draft.rect(),
            Some(&draft.placement_id),
        )
        .err()
    }

    /// Submits the edit dialog. The dialog stays open on failure.
    pub async fn confirm_resize(&self) -> Result<Placement, EditorError> {
        let draft = self.resize_draft().ok_or(EditorError::NoActiveResize)?;
        let placement = self.resize_placement(&draft.placement_id, draft.size).await?;
        let mut state = self.state();
        if state.resize.as_ref() == Some(&draft) {
            state.resize = None;
        }
        Ok(placement)
    }

    pub fn cancel_resize(&self) {
        let mut state = self.state();
        state.resize = None;
        state.error = None;
    }

    /// Deletes a placement immediately.
    pub async fn delete_placement(&self, id: &PlacementId) -> Result<(), EditorError> {
        let result = {
            let _guard = MutationGuard::new(&self.in_flight);
            self.service.delete_placement(id).await
        };

        match result {
            Ok(()) => {
                info!(placement = %id, "Placement deleted");
                {
                    let mut state = self.state();
                    if state.resize.as_ref().is_some_and(|d| &d.placement_id == id) {
                        state.resize = None;
                    }
                    state.error = None;
                }
                self.after_mutation().await;
                Ok(())
            }
            Err(e) => {
                self.report_error(e.user_message());
                Err(e.into())
            }
        }
    }

    // Auto-layout

    /// Asks the solver where `item_ids` could go. Nothing is persisted.
    pub async fn request_auto_layout(
        &self,
        item_ids: &[ItemId],
    ) -> Result<Vec<LayoutSuggestion>, EditorError> {
        let result = {
            let _guard = MutationGuard::new(&self.in_flight);
            self.service.request_auto_layout(&self.unit_id, item_ids).await
        };

        match result {
            Ok(suggestions) => {
                if suggestions.len() < item_ids.len() {
                    info!(
                        requested = item_ids.len(),
                        suggested = suggestions.len(),
                        "Auto-layout could not fit every item"
                    );
                }
                Ok(suggestions)
            }
            Err(e) => {
                self.report_error(e.user_message());
                Err(e.into())
            }
        }
    }

    /// Creates one placement per suggestion.
    ///
    /// All creates are sent at once and each succeeds or fails on its own.
    /// Successful placements are kept whatever happens to the rest. The
    /// summary ("N placed, M failed") becomes the editor's notice.
    pub async fn accept_auto_layout(&self, suggestions: &[LayoutSuggestion]) -> BatchReport {
        let requests: Vec<CreatePlacement> = suggestions
            .iter()
            .map(|s| CreatePlacement::new(self.unit_id.clone(), s.item_id.clone(), s.rect()))
            .collect();

        let settled = {
            let _guard = MutationGuard::new(&self.in_flight);
            settle_all(
                requests
                    .iter()
                    .map(|request| {
                        (request.item_id.clone(), self.service.create_placement(request))
                    }),
            )
            .await
        };

        for (item_id, e) in settled.failures() {
            warn!(item = %item_id, error = %e, "Auto-layout placement failed");
        }
        let report = BatchReport::from(settled);
        info!(unit = %self.unit_id, "Auto-layout accepted: {report}");

        self.state().notice = Some(report.to_string());
        if !suggestions.is_empty() {
            self.after_mutation().await;
        }
        report
    }
}
