//! Best-neighbour directions derived from an integration field.

use tower_fusion_core::{Grid, GridCoord, GridDelta};

use super::{CostField, IntegrationField};

/// Dense per-cell directions stored in row-major order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlowField {
    width: u32,
    height: u32,
    directions: Vec<GridDelta>,
}

impl FlowField {
    /// Points every reachable cell at its cheapest cardinal neighbour.
    ///
    /// Blocked and unreachable cells, the destination itself, and cells with
    /// no strictly cheaper neighbour receive [`GridDelta::ZERO`]. When several
    /// neighbours share the lowest value, the first one in
    /// [`GridDelta::CARDINALS`] order wins.
    #[must_use]
    pub fn build(grid: &Grid, costs: &CostField, integration: &IntegrationField) -> Self {
        let directions = grid
            .coords()
            .map(|cell| best_step(grid, costs, integration, cell))
            .collect();

        Self {
            width: grid.width(),
            height: grid.height(),
            directions,
        }
    }

    /// Direction stored for the provided cell; cells outside the field yield zero.
    #[must_use]
    pub fn direction(&self, cell: GridCoord) -> GridDelta {
        cell.raster_index(self.width, self.height)
            .and_then(|index| self.directions.get(index).copied())
            .unwrap_or(GridDelta::ZERO)
    }

    /// Width of the field in cells.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the field in cells.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Dense directions stored in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[GridDelta] {
        &self.directions
    }
}

fn best_step(
    grid: &Grid,
    costs: &CostField,
    integration: &IntegrationField,
    cell: GridCoord,
) -> GridDelta {
    if costs.is_blocked(cell) || !integration.is_reachable(cell) {
        return GridDelta::ZERO;
    }

    let mut best = GridDelta::ZERO;
    let mut lowest = integration.value(cell);

    for delta in GridDelta::CARDINALS {
        let Some(neighbor) = grid.offset(cell, delta) else {
            continue;
        };

        let value = integration.value(neighbor);
        if value < lowest {
            lowest = value;
            best = delta;
        }
    }

    best
}
