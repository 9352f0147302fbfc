use thiserror::Error;

use crate::geometry::Rect;
use crate::id::PlacementId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("Grid must be at least 1x1, got {columns}x{rows}")]
    InvalidDimensions { columns: u32, rows: u32 },

    #[error("Bin size must be at least 1x1, got {width}x{depth}")]
    ZeroExtent { width: u32, depth: u32 },

    #[error("Bin {rect} does not fit in the {columns}x{rows} grid")]
    OutOfBounds { rect: Rect, columns: u32, rows: u32 },

    #[error("Bin overlaps existing placement {placement}")]
    Overlap { placement: PlacementId },
}
