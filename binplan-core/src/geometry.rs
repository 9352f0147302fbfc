use std::fmt;

use serde::{Deserialize, Serialize};

use crate::unit::GridBounds;

/// A single grid cell, zero-based from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: u32,
    pub y: u32,
}

impl Cell {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Extent of a bin in grid units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width_units: u32,
    pub depth_units: u32,
}

impl Size {
    pub const fn new(width_units: u32, depth_units: u32) -> Self {
        Self {
            width_units,
            depth_units,
        }
    }

    pub fn area(&self) -> u32 {
        self.width_units * self.depth_units
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width_units, self.depth_units)
    }
}

/// Axis-aligned rectangle of cells covering `[x, x + width) x [y, y + depth)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub depth: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, depth: u32) -> Self {
        Self { x, y, width, depth }
    }

    pub fn at(origin: Cell, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width_units, size.depth_units)
    }

    pub fn origin(&self) -> Cell {
        Cell::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.depth)
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.depth)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.depth == 0
    }

    /// Half-open intersection test. Rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= self.x && cell.x < self.right() && cell.y >= self.y && cell.y < self.bottom()
    }

    pub fn fits_within(&self, bounds: GridBounds) -> bool {
        !self.is_empty() && self.right() <= bounds.columns && self.bottom() <= bounds.rows
    }

    /// Cells covered by the rectangle, row by row.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + use<> {
        let Rect { x, y, width, depth } = *self;
        (y..y.saturating_add(depth))
            .flat_map(move |cy| (x..x.saturating_add(width)).map(move |cx| Cell::new(cx, cy)))
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} at ({}, {})", self.width, self.depth, self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_edge_is_not_overlap() {
        let a = Rect::new(0, 0, 2, 2);
        assert!(!a.overlaps(&Rect::new(2, 0, 2, 2)));
        assert!(!a.overlaps(&Rect::new(0, 2, 2, 2)));
        assert!(!a.overlaps(&Rect::new(2, 2, 1, 1)));
    }

    #[test]
    fn corner_cell_is_overlap() {
        let a = Rect::new(0, 0, 2, 2);
        assert!(a.overlaps(&Rect::new(1, 1, 2, 2)));
    }

    #[test]
    fn contained_rect_overlaps() {
        let outer = Rect::new(0, 0, 4, 4);
        let inner = Rect::new(1, 1, 1, 1);
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn cells_are_row_major() {
        let cells: Vec<_> = Rect::new(1, 2, 2, 2).cells().collect();
        assert_eq!(
            cells,
            vec![
                Cell::new(1, 2),
                Cell::new(2, 2),
                Cell::new(1, 3),
                Cell::new(2, 3),
            ]
        );
    }

    #[test]
    fn fits_within_checks_far_edges() {
        let bounds = GridBounds::new(4, 3);
        assert!(Rect::new(2, 1, 2, 2).fits_within(bounds));
        assert!(!Rect::new(3, 0, 2, 1).fits_within(bounds));
        assert!(!Rect::new(0, 2, 1, 2).fits_within(bounds));
        assert!(!Rect::new(0, 0, 0, 1).fits_within(bounds));
    }

    #[test]
    fn contains_is_half_open() {
        let r = Rect::new(1, 1, 2, 2);
        assert!(r.contains(Cell::new(1, 1)));
        assert!(r.contains(Cell::new(2, 2)));
        assert!(!r.contains(Cell::new(3, 1)));
        assert!(!r.contains(Cell::new(0, 1)));
    }
}
