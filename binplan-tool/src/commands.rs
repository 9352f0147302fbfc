use binplan_client::{DropOutcome, LayoutService, PlacementEditor};
use binplan_core::{list_size_options, Cell, DragPayload, ItemId, ItemSummary, PlacementId, Size};

use crate::error::ToolError;
use crate::render::{render_grid, render_size_options, render_suggestions};

/// Settings shared by every command.
pub struct Context<S> {
    pub editor: PlacementEditor<S>,
    pub unit_mm: u32,
}

impl<S: LayoutService> Context<S> {
    fn print_grid(&self) {
        if let Some(layout) = self.editor.layout() {
            print!("{}", render_grid(&layout, self.unit_mm));
        }
    }

    pub async fn show(&self) -> Result<(), ToolError> {
        self.editor.refresh().await?;
        self.print_grid();
        Ok(())
    }

    pub async fn unplaced(&self, search: Option<String>) -> Result<(), ToolError> {
        self.editor.refresh().await?;
        let items = self.editor.unplaced_items(search).await?;
        if items.is_empty() {
            println!("Every item is placed");
        }
        for item in items {
            match item.category {
                Some(category) => println!("{}  {}  [{}]", item.id, item.name, category),
                None => println!("{}  {}", item.id, item.name),
            }
        }
        Ok(())
    }

    async fn find_item(&self, item_id: &str) -> Result<ItemSummary, ToolError> {
        let items = self.editor.unplaced_items(None).await?;
        Ok(items
            .into_iter()
            .find(|i| i.id.as_str() == item_id)
            .unwrap_or_else(|| ItemSummary::new(item_id, item_id)))
    }

    pub async fn place(
        &self,
        item_id: &str,
        target: Cell,
        width: Option<u32>,
        depth: Option<u32>,
    ) -> Result<(), ToolError> {
        self.editor.refresh().await?;
        let item = self.find_item(item_id).await?;

        let pending = match self.editor.drop_onto(DragPayload::Item(item), target).await? {
            DropOutcome::Proposed(pending) => pending,
            DropOutcome::Moved(_) | DropOutcome::Unchanged => {
                return Err(ToolError::NotProposed(item_id.to_string()));
            }
        };
        if let (Some(rec), Some(size)) = (&pending.recommendation, pending.recommended_size()) {
            println!("Recommended {size}: {}", rec.reasoning);
        }

        if width.is_some() || depth.is_some() {
            let requested = Size::new(
                width.unwrap_or(pending.size.width_units),
                depth.unwrap_or(pending.size.depth_units),
            );
            if let Some(applied) = self.editor.set_pending_size(requested) {
                if applied != requested {
                    println!("Clamped {requested} to {applied}");
                }
            }
        }

        if let Some(conflict) = self.editor.pending_conflict() {
            println!(
                "Sizes that fit at {target}: {}",
                render_size_options(&self.editor.pending_size_options())
            );
            self.editor.cancel_pending();
            return Err(ToolError::Conflict(conflict));
        }

        let placement = self.editor.confirm_pending().await?;
        println!("Placed {} as {} ({})", placement.item_id, placement.id, placement.rect());
        self.print_grid();
        Ok(())
    }

    pub async fn move_to(&self, placement: &str, target: Cell) -> Result<(), ToolError> {
        self.editor.refresh().await?;
        let moved = self
            .editor
            .move_placement(&PlacementId::new(placement), target)
            .await?;
        println!("Moved {} to {}", moved.id, moved.origin());
        self.print_grid();
        Ok(())
    }

    pub async fn resize(&self, placement: &str, size: Size) -> Result<(), ToolError> {
        self.editor.refresh().await?;
        let id = PlacementId::new(placement);
        self.editor.begin_resize(&id)?;
        if let Some(applied) = self.editor.set_resize_size(size) {
            if applied != size {
                println!("Clamped {size} to {applied}");
            }
        }
        if let Some(conflict) = self.editor.resize_conflict() {
            println!(
                "Sizes that fit: {}",
                render_size_options(&self.editor.resize_size_options())
            );
            self.editor.cancel_resize();
            return Err(ToolError::Conflict(conflict));
        }

        let resized = self.editor.confirm_resize().await?;
        println!("Resized {} to {}", resized.id, resized.size());
        self.print_grid();
        Ok(())
    }

    pub async fn delete(&self, placement: &str) -> Result<(), ToolError> {
        self.editor
            .delete_placement(&PlacementId::new(placement))
            .await?;
        println!("Deleted {placement}");
        self.print_grid();
        Ok(())
    }

    pub async fn auto_layout(&self, items: Vec<String>, dry_run: bool) -> Result<(), ToolError> {
        self.editor.refresh().await?;
        let item_ids: Vec<ItemId> = if items.is_empty() {
            self.editor
                .unplaced_items(None)
                .await?
                .into_iter()
                .map(|i| i.id)
                .collect()
        } else {
            items.into_iter().map(ItemId::new).collect()
        };
        if item_ids.is_empty() {
            println!("Nothing to place");
            return Ok(());
        }

        let suggestions = self.editor.request_auto_layout(&item_ids).await?;
        println!("{}", render_suggestions(&suggestions));
        if suggestions.len() < item_ids.len() {
            println!(
                "{} of {} items did not fit",
                item_ids.len() - suggestions.len(),
                item_ids.len()
            );
        }
        if dry_run || suggestions.is_empty() {
            return Ok(());
        }

        let report = self.editor.accept_auto_layout(&suggestions).await;
        println!("{report}");
        for failure in &report.failures {
            println!("  {}: {}", failure.item_id, failure.message);
        }
        self.print_grid();
        Ok(())
    }

    pub async fn recommend(&self, items: Vec<String>) -> Result<(), ToolError> {
        let item_ids: Vec<ItemId> = items.into_iter().map(ItemId::new).collect();
        let recommendations = self.editor.recommendations(&item_ids).await?;
        for id in &item_ids {
            match recommendations.iter().find(|r| &r.item_id == id) {
                Some(rec) => match rec.size() {
                    Some(size) => println!("{id}  {size}  {}", rec.reasoning),
                    None => println!("{id}  no size  {}", rec.reasoning),
                },
                None => println!("{id}  no recommendation"),
            }
        }
        Ok(())
    }

    pub async fn sizes(&self, target: Cell, placement: Option<String>) -> Result<(), ToolError> {
        let layout = self.editor.refresh().await?;
        let exclude = placement.map(PlacementId::new);
        let options = list_size_options(
            target,
            layout.bounds(),
            &layout.placements,
            exclude.as_ref(),
            None,
        );
        println!("{}", render_size_options(&options));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use binplan_client::MemoryLayoutService;
    use binplan_core::{BinRecommendation, GridUnit, Rect, GRID_UNIT_MM};

    fn context() -> Context<MemoryLayoutService> {
        let service = MemoryLayoutService::new();
        service.add_unit(GridUnit::new("u", "Drawer", 3, 3).unwrap());
        service.add_item(ItemSummary::new("a", "Calipers"));
        service.add_item(ItemSummary::new("b", "Files"));
        service.set_recommendation(BinRecommendation::new("a", Size::new(3, 1), "Long jaws"));
        Context {
            editor: PlacementEditor::new(service, "u"),
            unit_mm: GRID_UNIT_MM,
        }
    }

    #[tokio::test]
    async fn place_uses_recommendation() {
        let ctx = context();
        ctx.place("a", Cell::new(0, 0), None, None).await.unwrap();
        let placements = ctx.editor.layout().unwrap().placements;
        assert_eq!(placements[0].rect(), Rect::new(0, 0, 3, 1));
    }

    #[tokio::test]
    async fn place_conflict_cancels() {
        let ctx = context();
        ctx.place("a", Cell::new(0, 0), None, None).await.unwrap();
        let result = ctx.place("b", Cell::new(1, 0), Some(1), Some(1)).await;
        assert!(matches!(result, Err(ToolError::Conflict(_))));
        assert!(ctx.editor.pending().is_none());
    }

    #[tokio::test]
    async fn auto_layout_places_all_unplaced() {
        let ctx = context();
        ctx.auto_layout(Vec::new(), false).await.unwrap();
        assert_eq!(ctx.editor.layout().unwrap().placements.len(), 2);
        assert_eq!(ctx.editor.notice().as_deref(), Some("2 placed, 0 failed"));
    }

    #[tokio::test]
    async fn dry_run_persists_nothing() {
        let ctx = context();
        ctx.auto_layout(Vec::new(), true).await.unwrap();
        assert!(ctx.editor.layout().unwrap().placements.is_empty());
        assert_eq!(ctx.editor.service().mutation_count(), 0);
    }

    #[tokio::test]
    async fn resize_then_delete() {
        let ctx = context();
        ctx.place("b", Cell::new(0, 0), None, None).await.unwrap();
        let id = ctx.editor.layout().unwrap().placements[0].id.clone();

        ctx.resize(id.as_str(), Size::new(2, 2)).await.unwrap();
        assert_eq!(
            ctx.editor.layout().unwrap().placements[0].size(),
            Size::new(2, 2)
        );

        ctx.delete(id.as_str()).await.unwrap();
        assert!(ctx.editor.layout().unwrap().placements.is_empty());
    }
}
