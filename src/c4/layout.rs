use super::types::*;
use crate::layout::{LayoutPos, text_width};

const MARGIN: f32 = 40.0;
const COLUMN_GAP: f32 = 60.0;
const ROW_GAP: f32 = 80.0;

/// Default box size per element kind.
pub fn entity_size(entity: &C4Entity) -> (f32, f32) {
    let (width, height): (f32, f32) = match entity.kind {
        C4Kind::Person | C4Kind::PersonExt => (200.0, 180.0),
        C4Kind::System | C4Kind::SystemExt => (240.0, 120.0),
        C4Kind::SystemDb | C4Kind::ContainerDb | C4Kind::ComponentDb => (200.0, 140.0),
        C4Kind::SystemQueue | C4Kind::ContainerQueue => (240.0, 100.0),
        C4Kind::Container | C4Kind::ContainerExt => (220.0, 110.0),
        C4Kind::Component | C4Kind::ComponentExt => (200.0, 100.0),
        C4Kind::Boundary => (260.0, 60.0),
    };
    (width.max(text_width(&entity.label) + 40.0), height)
}

/// One row per nesting depth, entities left to right in declaration order.
///
/// Positions are indexed like [`C4Diagram::flatten`], so entities that
/// share an alias each get their own box.
pub fn layout_c4(diagram: &C4Diagram) -> Vec<LayoutPos> {
    let flat = diagram.flatten();
    let mut rows: Vec<Vec<(usize, (f32, f32))>> = Vec::new();
    for (index, (depth, entity)) in flat.iter().enumerate() {
        if rows.len() <= *depth {
            rows.resize_with(depth + 1, Vec::new);
        }
        rows[*depth].push((index, entity_size(entity)));
    }

    let row_width = |row: &[(usize, (f32, f32))]| {
        row.iter().map(|(_, (w, _))| w).sum::<f32>()
            + COLUMN_GAP * row.len().saturating_sub(1) as f32
    };
    let widest = rows.iter().map(|r| row_width(r.as_slice())).fold(0.0, f32::max);

    let mut positions = vec![LayoutPos::new(0.0, 0.0, 0.0, 0.0); flat.len()];
    let mut y = MARGIN;
    for row in &rows {
        let mut x = MARGIN + (widest - row_width(row.as_slice())) / 2.0;
        let height = row.iter().map(|(_, (_, h))| *h).fold(0.0, f32::max);
        for (index, (w, h)) in row {
            positions[*index] = LayoutPos::new(x, y + (height - h) / 2.0, *w, *h);
            x += w + COLUMN_GAP;
        }
        y += height + ROW_GAP;
    }
    positions
}
