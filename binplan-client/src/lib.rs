//! Client side of the Gridfinity bin planner.
//!
//! [`PlacementEditor`] drives the interactive workflow for one storage unit:
//! dropping items on the grid, confirming, moving, resizing and deleting
//! placements, and accepting auto-layout suggestions in bulk. It talks to a
//! [`LayoutService`], either [`HttpLayoutService`] against a running server
//! or [`MemoryLayoutService`] in tests.
//!
//! # Example
//!
//! ```ignore
//! use binplan_client::{HttpLayoutService, PlacementEditor};
//! use binplan_core::{Cell, DragPayload, ItemSummary};
//!
//! #[tokio::main]
//! async fn main() {
//!     let service = HttpLayoutService::new("http://localhost:8000/api/v1").with_token("token");
//!     let editor = PlacementEditor::new(service, "unit-1");
//!     editor.refresh().await.unwrap();
//!
//!     let item = ItemSummary::new("item-7", "Hex keys");
//!     editor.drop_onto(DragPayload::Item(item), Cell::new(0, 0)).await.unwrap();
//!     if editor.can_confirm() {
//!         editor.confirm_pending().await.unwrap();
//!     }
//! }
//! ```

mod batch;
mod cache;
mod editor;
mod error;
mod http;
mod memory;
mod service;
mod types;

pub use batch::{settle_all, BatchFailure, BatchReport, Settled};
pub use cache::{CacheKey, LayoutCache};
pub use editor::{DropOutcome, PlacementEditor, ResizeDraft};
pub use error::{ClientError, EditorError, GENERIC_FAILURE_MESSAGE};
pub use http::HttpLayoutService;
pub use memory::MemoryLayoutService;
pub use service::LayoutService;
pub use types::{
    AutoLayoutRequest, CreatePlacement, ItemQuery, LayoutSuggestion, RecommendationRequest,
    UpdatePlacement,
};
