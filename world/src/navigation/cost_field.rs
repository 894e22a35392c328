//! Per-cell traversal costs derived from structure occupancy.

use glam::Vec2;
use tower_fusion_core::{Grid, GridCoord, BLOCKED_COST, PASSABLE_COST};

/// Dense traversal costs stored in row-major order.
///
/// Every cell is either [`PASSABLE_COST`] or [`BLOCKED_COST`]. The field is
/// rebuilt from scratch whenever the structure set changes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CostField {
    width: u32,
    height: u32,
    costs: Vec<u8>,
}

impl CostField {
    /// Marks every cell that an obstacle maps onto as blocked.
    ///
    /// The result matches querying [`Grid::is_blocked`] for every cell in
    /// raster order, but visits each obstacle only once.
    #[must_use]
    pub fn build(grid: &Grid, obstacles: &[Vec2]) -> Self {
        let mut costs = vec![PASSABLE_COST; grid.cell_count()];

        for &position in obstacles {
            let cell = grid.world_to_grid(position);
            if let Some(slot) = grid.index(cell).and_then(|index| costs.get_mut(index)) {
                *slot = BLOCKED_COST;
            }
        }

        Self {
            width: grid.width(),
            height: grid.height(),
            costs,
        }
    }

    /// Cost of entering the provided cell; cells outside the field are blocked.
    #[must_use]
    pub fn cost(&self, cell: GridCoord) -> u8 {
        cell.raster_index(self.width, self.height)
            .and_then(|index| self.costs.get(index).copied())
            .unwrap_or(BLOCKED_COST)
    }

    /// Reports whether the provided cell cannot be entered.
    #[must_use]
    pub fn is_blocked(&self, cell: GridCoord) -> bool {
        self.cost(cell) == BLOCKED_COST
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

    /// Dense costs stored in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[u8] {
        &self.costs
    }
}
