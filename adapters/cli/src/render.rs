//! ASCII renderings of the navigation fields, top row first.

use std::fmt::Write as _;

use tower_fusion_core::{GridCoord, GridDelta, INTEGRATION_MAX};
use tower_fusion_world::navigation::NavigationLayers;

const BLOCKED: char = '#';
const UNREACHABLE: char = '.';

/// Integration values padded to a common width.
pub(crate) fn integration(layers: &NavigationLayers) -> String {
    let costs = layers.costs();
    let field = layers.integration();
    let width = field
        .cells()
        .iter()
        .filter(|&&value| value != INTEGRATION_MAX)
        .map(|value| value.to_string().len())
        .max()
        .unwrap_or(1);

    render_rows(field.width(), field.height(), |cell| {
        if costs.is_blocked(cell) {
            format!("{BLOCKED:>width$}")
        } else if field.is_reachable(cell) {
            format!("{:>width$}", field.value(cell))
        } else {
            format!("{UNREACHABLE:>width$}")
        }
    })
}

/// Flow directions drawn as arrows; `*` marks cells with no direction.
pub(crate) fn flow(layers: &NavigationLayers) -> String {
    let costs = layers.costs();
    let field = layers.flow();

    render_rows(field.width(), field.height(), |cell| {
        if costs.is_blocked(cell) {
            return BLOCKED.to_string();
        }
        let glyph = match field.direction(cell) {
            GridDelta::UP => '^',
            GridDelta::DOWN => 'v',
            GridDelta::RIGHT => '>',
            GridDelta::LEFT => '<',
            _ => '*',
        };
        glyph.to_string()
    })
}

fn render_rows(width: u32, height: u32, mut glyph: impl FnMut(GridCoord) -> String) -> String {
    let mut output = String::new();
    for y in (0..height).rev() {
        let row: Vec<String> = (0..width).map(|x| glyph(GridCoord::new(x, y))).collect();
        let _ = writeln!(output, "{}", row.join(" "));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use tower_fusion_core::{Destination, Grid};
    use tower_fusion_world::navigation::FlowFieldRegistry;

    fn layers(obstacles: &[Vec2]) -> NavigationLayers {
        let grid = Grid::new(Vec2::ZERO, 1.0, 3, 3);
        let mut registry = FlowFieldRegistry::new();
        let destinations = |_: Destination| Some(Vec2::new(0.5, 0.5));
        registry.rebuild_all(&grid, obstacles, &destinations);
        registry
            .layers(Destination::ResourceCache)
            .expect("field")
            .clone()
    }

    #[test]
    fn integration_marks_walls_and_unreachable_cells() {
        let walls = [Vec2::new(1.5, 2.5), Vec2::new(2.5, 1.5)];
        let rendered = integration(&layers(&walls));
        assert_eq!(rendered, "2 # .\n1 2 #\n0 1 2\n");
    }

    #[test]
    fn flow_prints_top_row_first() {
        let rendered = flow(&layers(&[Vec2::new(1.5, 1.5)]));
        assert_eq!(rendered, "v < v\nv # v\n* < <\n");
    }
}
