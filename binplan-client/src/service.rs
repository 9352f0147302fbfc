use std::future::Future;

use binplan_core::{
    BinRecommendation, ItemId, ItemSummary, Placement, PlacementId, UnitId, UnitLayout,
};

use crate::error::ClientError;
use crate::types::{CreatePlacement, ItemQuery, LayoutSuggestion, UpdatePlacement};

/// Remote side of the placement editor.
///
/// The service owns every placement. It validates and persists creates and
/// updates, runs the auto-layout solver and produces bin recommendations.
/// Implementations: [`crate::HttpLayoutService`] for a real server and
/// [`crate::MemoryLayoutService`] for tests.
pub trait LayoutService: Send + Sync {
    /// Unit dimensions plus its placements in server order.
    fn get_layout(
        &self,
        unit_id: &UnitId,
    ) -> impl Future<Output = Result<UnitLayout, ClientError>> + Send;

    fn create_placement(
        &self,
        request: &CreatePlacement,
    ) -> impl Future<Output = Result<Placement, ClientError>> + Send;

    fn update_placement(
        &self,
        id: &PlacementId,
        request: &UpdatePlacement,
    ) -> impl Future<Output = Result<Placement, ClientError>> + Send;

    fn delete_placement(
        &self,
        id: &PlacementId,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Suggested placements for `item_ids`. May cover fewer items than requested.
    fn request_auto_layout(
        &self,
        unit_id: &UnitId,
        item_ids: &[ItemId],
    ) -> impl Future<Output = Result<Vec<LayoutSuggestion>, ClientError>> + Send;

    fn request_recommendations(
        &self,
        item_ids: &[ItemId],
    ) -> impl Future<Output = Result<Vec<BinRecommendation>, ClientError>> + Send;

    fn search_items(
        &self,
        query: &ItemQuery,
    ) -> impl Future<Output = Result<Vec<ItemSummary>, ClientError>> + Send;
}
