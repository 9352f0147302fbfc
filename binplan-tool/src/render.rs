use std::collections::HashMap;
use std::fmt::Write;

use binplan_core::{compute_occupancy, Cell, PlacementId, SizeOption, UnitLayout};
use binplan_client::LayoutSuggestion;

const LABELS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

fn label(index: usize) -> char {
    LABELS.get(index).map(|b| *b as char).unwrap_or('#')
}

/// Draws the grid one character per cell followed by a legend.
///
/// Placements are lettered in layout order, free cells are `.` and cells
/// claimed by more than one placement are `!`.
pub fn render_grid(layout: &UnitLayout, unit_mm: u32) -> String {
    let unit = &layout.unit;
    let occupancy = compute_occupancy(&layout.placements);
    let conflicts: Vec<Cell> = occupancy.conflicts().collect();
    let labels: HashMap<&PlacementId, char> = layout
        .placements
        .iter()
        .enumerate()
        .map(|(i, p)| (&p.id, label(i)))
        .collect();

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({}x{}, {}x{} mm)",
        unit.name,
        unit.columns,
        unit.rows,
        unit.columns * unit_mm,
        unit.rows * unit_mm
    );

    for y in 0..unit.rows {
        let row: String = (0..unit.columns)
            .map(|x| {
                let cell = Cell::new(x, y);
                if conflicts.contains(&cell) {
                    return '!';
                }
                occupancy
                    .get(cell)
                    .and_then(|id| labels.get(id).copied())
                    .unwrap_or('.')
            })
            .collect();
        let _ = writeln!(out, "  {row}");
    }

    if layout.placements.is_empty() {
        let _ = writeln!(out, "No placements");
    }
    for (i, p) in layout.placements.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}  {}  item {}  {}  {}x{} mm",
            label(i),
            p.id,
            p.item_id,
            p.rect(),
            p.width_units * unit_mm,
            p.depth_units * unit_mm
        );
    }
    out
}

pub fn render_size_options(options: &[SizeOption]) -> String {
    if options.is_empty() {
        return "No preset fits here".to_string();
    }
    options
        .iter()
        .map(|o| {
            if o.recommended {
                format!("{} (recommended)", o.size)
            } else {
                o.size.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn render_suggestions(suggestions: &[LayoutSuggestion]) -> String {
    if suggestions.is_empty() {
        return "Auto-layout found no room for these items".to_string();
    }
    suggestions
        .iter()
        .map(|s| format!("{}  {}", s.item_id, s.rect()))
        .collect::<Vec<_>>()
        .join("\n")
}
