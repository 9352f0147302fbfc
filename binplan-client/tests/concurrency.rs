//! Editor behaviour while several mutations are in flight at once.
//!
//! [`GatedService`] parks every create, update and delete until the test
//! releases it, so the interleavings below are deterministic.

use std::sync::atomic::{AtomicUsize, Ordering};

use binplan_client::{
    ClientError, CreatePlacement, DropOutcome, ItemQuery, LayoutService, LayoutSuggestion,
    MemoryLayoutService, PlacementEditor, UpdatePlacement,
};
use binplan_core::{
    BinRecommendation, Cell, DragPayload, GridUnit, ItemId, ItemSummary, Placement, PlacementId,
    Rect, Size, UnitId, UnitLayout,
};
use tokio::sync::Semaphore;

const UNIT: &str = "unit-1";

struct GatedService {
    inner: MemoryLayoutService,
    gate: Semaphore,
    waiting: AtomicUsize,
}

impl GatedService {
    fn new(inner: MemoryLayoutService) -> Self {
        Self {
            inner,
            gate: Semaphore::new(0),
            waiting: AtomicUsize::new(0),
        }
    }

    async fn pass(&self) {
        self.waiting.fetch_add(1, Ordering::SeqCst);
        self.gate
            .acquire()
            .await
            .expect("gate is never closed")
            .forget();
        self.waiting.fetch_sub(1, Ordering::SeqCst);
    }

    /// Resolves once `count` mutations are parked on the gate.
    async fn parked(&self, count: usize) {
        while self.waiting.load(Ordering::SeqCst) < count {
            tokio::task::yield_now().await;
        }
    }

    fn release(&self, count: usize) {
        self.gate.add_permits(count);
    }
}

impl LayoutService for GatedService {
    async fn get_layout(&self, unit_id: &UnitId) -> Result<UnitLayout, ClientError> {
        self.inner.get_layout(unit_id).await
    }

    async fn create_placement(&self, request: &CreatePlacement) -> Result<Placement, ClientError> {
        self.pass().await;
        self.inner.create_placement(request).await
    }

    async fn update_placement(
        &self,
        id: &PlacementId,
        request: &UpdatePlacement,
    ) -> Result<Placement, ClientError> {
        self.pass().await;
        self.inner.update_placement(id, request).await
    }

    async fn delete_placement(&self, id: &PlacementId) -> Result<(), ClientError> {
        self.pass().await;
        self.inner.delete_placement(id).await
    }

    async fn request_auto_layout(
        &self,
        unit_id: &UnitId,
        item_ids: &[ItemId],
    ) -> Result<Vec<LayoutSuggestion>, ClientError> {
        self.inner.request_auto_layout(unit_id, item_ids).await
    }

    async fn request_recommendations(
        &self,
        item_ids: &[ItemId],
    ) -> Result<Vec<BinRecommendation>, ClientError> {
        self.inner.request_recommendations(item_ids).await
    }

    async fn search_items(&self, query: &ItemQuery) -> Result<Vec<ItemSummary>, ClientError> {
        self.inner.search_items(query).await
    }
}

/// A 4x4 unit seeded with 1x1 bins at (0, 0) and (3, 3).
async fn seeded() -> (PlacementEditor<GatedService>, PlacementId, PlacementId) {
    let memory = MemoryLayoutService::new();
    memory.add_unit(GridUnit::new(UNIT, "Bench drawer", 4, 4).unwrap());
    let a = PlacementId::new("seed-a");
    let b = PlacementId::new("seed-b");
    memory.insert_placement(Placement::new(a.clone(), UNIT, "a", Rect::new(0, 0, 1, 1)));
    memory.insert_placement(Placement::new(b.clone(), UNIT, "b", Rect::new(3, 3, 1, 1)));

    let editor = PlacementEditor::new(GatedService::new(memory), UNIT);
    editor.refresh().await.unwrap();
    (editor, a, b)
}

#[tokio::test]
async fn busy_while_two_mutations_are_outstanding() {
    let (editor, a, b) = seeded().await;
    assert!(!editor.is_busy());

    let (moved, deleted, ()) = futures::join!(
        editor.move_placement(&a, Cell::new(1, 1)),
        editor.delete_placement(&b),
        async {
            editor.service().parked(2).await;
            assert!(editor.is_busy());
            editor.service().release(2);
        },
    );
    moved.unwrap();
    deleted.unwrap();

    assert!(!editor.is_busy());
    let layout = editor.layout().unwrap();
    assert_eq!(layout.placements.len(), 1);
    assert_eq!(layout.placements[0].origin(), Cell::new(1, 1));
}

#[tokio::test]
async fn busy_until_the_last_mutation_settles() {
    let (editor, a, b) = seeded().await;

    let (moved, deleted, ()) = futures::join!(
        editor.move_placement(&a, Cell::new(1, 0)),
        editor.delete_placement(&b),
        async {
            editor.service().parked(2).await;
            editor.service().release(1);
            while editor.service().waiting.load(Ordering::SeqCst) > 1 {
                tokio::task::yield_now().await;
            }
            // one call has gone through, the other is still parked
            assert!(editor.is_busy());
            editor.service().release(1);
        },
    );
    moved.unwrap();
    deleted.unwrap();
    assert!(!editor.is_busy());
}

#[tokio::test]
async fn confirm_keeps_a_dialog_opened_while_it_was_in_flight() {
    let (editor, _, _) = seeded().await;

    editor
        .drop_onto(
            DragPayload::Item(ItemSummary::new("c", "Calipers")),
            Cell::new(1, 0),
        )
        .await
        .unwrap();

    let (confirmed, second) = futures::join!(editor.confirm_pending(), async {
        editor.service().parked(1).await;
        let outcome = editor
            .drop_onto(
                DragPayload::Item(ItemSummary::new("d", "Deburring tool")),
                Cell::new(2, 2),
            )
            .await;
        editor.service().release(1);
        outcome
    });

    let placed = confirmed.unwrap();
    assert_eq!(placed.item_id, ItemId::new("c"));
    assert!(matches!(second.unwrap(), DropOutcome::Proposed(_)));

    let pending = editor.pending().expect("second dialog is still open");
    assert_eq!(pending.item.id, ItemId::new("d"));
    assert_eq!(pending.origin, Cell::new(2, 2));
    assert!(editor.can_confirm());
}

#[tokio::test]
async fn confirm_clears_its_own_dialog() {
    let (editor, _, _) = seeded().await;
    editor
        .drop_onto(
            DragPayload::Item(ItemSummary::new("c", "Calipers")),
            Cell::new(1, 0),
        )
        .await
        .unwrap();

    let (confirmed, ()) = futures::join!(editor.confirm_pending(), async {
        editor.service().parked(1).await;
        editor.service().release(1);
    });
    confirmed.unwrap();
    assert!(editor.pending().is_none());
}

#[tokio::test]
async fn resize_keeps_a_draft_opened_for_another_placement() {
    let (editor, a, b) = seeded().await;

    editor.begin_resize(&a).unwrap();
    assert_eq!(editor.set_resize_size(Size::new(2, 2)), Some(Size::new(2, 2)));

    let (resized, ()) = futures::join!(editor.confirm_resize(), async {
        editor.service().parked(1).await;
        editor.begin_resize(&b).unwrap();
        editor.service().release(1);
    });

    assert_eq!(resized.unwrap().size(), Size::new(2, 2));
    let draft = editor.resize_draft().expect("draft for the other bin is still open");
    assert_eq!(draft.placement_id, b);
    assert_eq!(draft.size, Size::new(1, 1));
}

#[tokio::test]
async fn resize_clears_its_own_draft() {
    let (editor, a, _) = seeded().await;
    editor.begin_resize(&a).unwrap();
    editor.set_resize_size(Size::new(2, 1));

    let (resized, ()) = futures::join!(editor.confirm_resize(), async {
        editor.service().parked(1).await;
        editor.service().release(1);
    });
    resized.unwrap();
    assert!(editor.resize_draft().is_none());
}
