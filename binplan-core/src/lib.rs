//! Binplan core - grid placement model for Gridfinity storage units.
//!
//! Core concepts:
//! - **GridUnit**: a storage container modelled as a fixed grid of cells
//! - **Placement**: an item's rectangular footprint inside a unit
//! - **OccupancyMap**: cell to placement lookup derived from a placement list
//! - **PendingPlacement**: a dropped item awaiting confirmation
//! - **DragPayload**: what is being dragged onto the grid
//!
//! Nothing here talks to a server. The types serialize to the JSON shapes the
//! layout service speaks, and every check is advisory: the service has the
//! final word on whether a placement is accepted.
//!
//! # Example
//!
//! ```
//! use binplan_core::{check_overlap, compute_occupancy, Cell, Placement, Rect};
//!
//! let a = Placement::new("p-1", "unit-1", "item-a", Rect::new(0, 0, 2, 2));
//! let placements = vec![a];
//!
//! assert!(check_overlap(&placements, Rect::new(1, 1, 2, 2), None));
//! assert!(!check_overlap(&placements, Rect::new(2, 0, 2, 2), None));
//!
//! let occupancy = compute_occupancy(&placements);
//! assert_eq!(occupancy.len(), 4);
//! assert!(occupancy.is_free(Cell::new(2, 2)));
//! ```

mod drag;
mod error;
mod geometry;
mod id;
mod item;
mod occupancy;
mod pending;
mod placement;
mod sizing;
mod unit;

pub use drag::{resolve_drop, DragPayload, DropAction};
pub use error::GridError;
pub use geometry::{Cell, Rect, Size};
pub use id::{ItemId, PlacementId, UnitId};
pub use item::{unplaced_items, ItemSummary};
pub use occupancy::{compute_occupancy, OccupancyMap};
pub use pending::{propose_placement, BinRecommendation, PendingPlacement};
pub use placement::{check_overlap, find_overlap, validate_candidate, Placement};
pub use sizing::{clamp_custom_size, list_size_options, SizeOption, SIZE_PRESETS};
pub use unit::{cells_to_mm, GridBounds, GridUnit, UnitLayout, GRID_UNIT_MM};
