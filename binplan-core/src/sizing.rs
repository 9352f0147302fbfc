use crate::geometry::{Cell, Rect, Size};
use crate::id::PlacementId;
use crate::placement::{check_overlap, Placement};
use crate::unit::GridBounds;

/// Common bin sizes offered in the placement dialog, in display order.
pub const SIZE_PRESETS: [Size; 7] = [
    Size::new(1, 1),
    Size::new(1, 2),
    Size::new(2, 1),
    Size::new(2, 2),
    Size::new(2, 3),
    Size::new(3, 2),
    Size::new(3, 3),
];

/// A preset that can be placed at the target cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeOption {
    pub size: Size,
    /// Matches the item's bin recommendation.
    pub recommended: bool,
}

/// Presets that fit the grid from `target` and collide with nothing.
///
/// Order follows [`SIZE_PRESETS`]; the recommended size is flagged, not promoted.
pub fn list_size_options(
    target: Cell,
    bounds: GridBounds,
    existing: &[Placement],
    exclude: Option<&PlacementId>,
    recommended: Option<Size>,
) -> Vec<SizeOption> {
    SIZE_PRESETS
        .iter()
        .map(|size| Rect::at(target, *size))
        .filter(|rect| rect.fits_within(bounds))
        .filter(|rect| !check_overlap(existing, *rect, exclude))
        .map(|rect| SizeOption {
            size: rect.size(),
            recommended: Some(rect.size()) == recommended,
        })
        .collect()
}

/// Clamps a typed-in size to `[1, remaining extent from target]` per dimension.
pub fn clamp_custom_size(target: Cell, bounds: GridBounds, size: Size) -> Size {
    let max_width = bounds.columns.saturating_sub(target.x).max(1);
    let max_depth = bounds.rows.saturating_sub(target.y).max(1);
    Size::new(
        size.width_units.clamp(1, max_width),
        size.depth_units.clamp(1, max_depth),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes(options: &[SizeOption]) -> Vec<Size> {
        options.iter().map(|o| o.size).collect()
    }

    #[test]
    fn all_presets_fit_empty_large_grid() {
        let options = list_size_options(Cell::new(0, 0), GridBounds::new(6, 6), &[], None, None);
        assert_eq!(sizes(&options), SIZE_PRESETS.to_vec());
    }

    #[test]
    fn edge_cell_only_gets_small_sizes() {
        let options = list_size_options(Cell::new(3, 2), GridBounds::new(4, 4), &[], None, None);
        assert_eq!(sizes(&options), vec![Size::new(1, 1), Size::new(1, 2)]);
    }

    #[test]
    fn overlapping_presets_are_dropped() {
        let existing = vec![Placement::new("p", "u", "i", Rect::new(2, 0, 1, 1))];
        let options =
            list_size_options(Cell::new(0, 0), GridBounds::new(4, 4), &existing, None, None);
        assert_eq!(
            sizes(&options),
            vec![
                Size::new(1, 1),
                Size::new(1, 2),
                Size::new(2, 1),
                Size::new(2, 2),
                Size::new(2, 3),
            ]
        );
    }

    #[test]
    fn excluded_placement_does_not_block_its_own_sizes() {
        let existing = vec![Placement::new("p", "u", "i", Rect::new(0, 0, 1, 1))];
        let id = PlacementId::new("p");
        let options =
            list_size_options(Cell::new(0, 0), GridBounds::new(3, 3), &existing, Some(&id), None);
        assert_eq!(options.len(), SIZE_PRESETS.len());
    }

    #[test]
    fn recommended_is_flagged_in_place() {
        let options = list_size_options(
            Cell::new(0, 0),
            GridBounds::new(3, 3),
            &[],
            None,
            Some(Size::new(2, 1)),
        );
        let flagged: Vec<_> = options.iter().filter(|o| o.recommended).collect();
        assert_eq!(flagged.len(), 1);
        assert_eq!(options[2].size, Size::new(2, 1));
        assert!(options[2].recommended);
    }

    #[test]
    fn custom_size_is_clamped_per_dimension() {
        let bounds = GridBounds::new(5, 4);
        assert_eq!(
            clamp_custom_size(Cell::new(3, 1), bounds, Size::new(9, 0)),
            Size::new(2, 1)
        );
        assert_eq!(
            clamp_custom_size(Cell::new(0, 0), bounds, Size::new(5, 4)),
            Size::new(5, 4)
        );
    }
}
