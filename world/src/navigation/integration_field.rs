//! Accumulated travel cost from every cell to a single destination.

use std::collections::VecDeque;

use tower_fusion_core::{Grid, GridCoord, INTEGRATION_MAX};
use tracing::{error, warn};

use super::CostField;

/// Dense integration values stored in row-major order.
///
/// The destination holds `0`, unreachable cells hold [`INTEGRATION_MAX`],
/// and every other cell holds the cheapest accumulated cost of entering
/// cells along a 4-connected path to the destination.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IntegrationField {
    width: u32,
    height: u32,
    values: Vec<u16>,
}

impl IntegrationField {
    /// Propagates costs outward from the destination with a FIFO relaxation.
    ///
    /// A cell re-enters the queue each time a strictly cheaper path reaches
    /// it, so the result is exact for non-negative costs. `costs` must have
    /// been built against `grid`.
    #[must_use]
    pub fn build(grid: &Grid, costs: &CostField, destination: GridCoord) -> Self {
        let mut field = Self {
            width: grid.width(),
            height: grid.height(),
            values: vec![INTEGRATION_MAX; grid.cell_count()],
        };

        let Some(destination_index) = grid.index(destination) else {
            error!(
                ?destination,
                width = grid.width(),
                height = grid.height(),
                "destination lies outside the grid; integration field left unreachable"
            );
            return field;
        };

        field.values[destination_index] = 0;

        if costs.is_blocked(destination) {
            warn!(
                ?destination,
                "destination cell is blocked; no cell can reach it"
            );
            return field;
        }

        let mut queue = VecDeque::new();
        queue.push_back(destination);

        while let Some(cell) = queue.pop_front() {
            let Some(current_index) = grid.index(cell) else {
                continue;
            };
            let current = field.values[current_index];

            for neighbor in grid.neighbors4(cell) {
                if costs.is_blocked(neighbor) {
                    continue;
                }

                let Some(neighbor_index) = grid.index(neighbor) else {
                    continue;
                };

                let candidate = current.saturating_add(u16::from(costs.cost(neighbor)));
                if candidate >= field.values[neighbor_index] {
                    continue;
                }

                field.values[neighbor_index] = candidate;
                queue.push_back(neighbor);
            }
        }

        field
    }

    /// Integration value of the provided cell; cells outside the field are unreachable.
    #[must_use]
    pub fn value(&self, cell: GridCoord) -> u16 {
        cell.raster_index(self.width, self.height)
            .and_then(|index| self.values.get(index).copied())
            .unwrap_or(INTEGRATION_MAX)
    }

    /// Reports whether the destination can be reached from the provided cell.
    #[must_use]
    pub fn is_reachable(&self, cell: GridCoord) -> bool {
        self.value(cell) != INTEGRATION_MAX
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

    /// Dense integration values stored in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[u16] {
        &self.values
    }
}
