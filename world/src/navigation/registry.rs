//! Ownership and rebuilding of the per-destination flow fields.

use std::collections::BTreeMap;

use glam::Vec2;
use tower_fusion_core::{Destination, Grid, GridCoord, GridDelta};
use tracing::{info, warn};

use super::{CostField, FlowField, IntegrationField};

/// Supplies the current world-space position of each destination.
pub trait DestinationSource {
    /// Position of the destination, or `None` when nothing provides it.
    fn destination_position(&self, destination: Destination) -> Option<Vec2>;
}

impl DestinationSource for BTreeMap<Destination, Vec2> {
    fn destination_position(&self, destination: Destination) -> Option<Vec2> {
        self.get(&destination).copied()
    }
}

impl<F> DestinationSource for F
where
    F: Fn(Destination) -> Option<Vec2>,
{
    fn destination_position(&self, destination: Destination) -> Option<Vec2> {
        self(destination)
    }
}

/// Lifecycle of the registry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RegistryState {
    /// No rebuild has completed yet.
    #[default]
    Uninitialized,
    /// Every destination owns a field built against the current grid.
    Ready,
}

/// Cost, integration, and flow fields computed for one destination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationLayers {
    destination: GridCoord,
    costs: CostField,
    integration: IntegrationField,
    flow: FlowField,
}

impl NavigationLayers {
    fn build(grid: &Grid, costs: CostField, destination: GridCoord) -> Self {
        let integration = IntegrationField::build(grid, &costs, destination);
        let flow = FlowField::build(grid, &costs, &integration);
        Self {
            destination,
            costs,
            integration,
            flow,
        }
    }

    /// Cell the fields converge on.
    #[must_use]
    pub fn destination(&self) -> GridCoord {
        self.destination
    }

    /// Traversal costs the fields were built from.
    #[must_use]
    pub fn costs(&self) -> &CostField {
        &self.costs
    }

    /// Accumulated costs toward the destination.
    #[must_use]
    pub fn integration(&self) -> &IntegrationField {
        &self.integration
    }

    /// Per-cell directions toward the destination.
    #[must_use]
    pub fn flow(&self) -> &FlowField {
        &self.flow
    }
}

/// Owns one flow field per [`Destination`] and answers direction queries.
///
/// Every rebuild replaces all fields wholesale; readers never observe a mix
/// of old and new data.
#[derive(Clone, Debug, Default)]
pub struct FlowFieldRegistry {
    state: RegistryState,
    grid: Option<Grid>,
    layers: BTreeMap<Destination, NavigationLayers>,
    generation: u64,
}

impl FlowFieldRegistry {
    /// Creates a registry that has not built any field yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes the fields of every destination against the provided grid.
    ///
    /// Destinations without a provider resolve to the grid origin so the
    /// registry always ends up with a usable field for each of them.
    pub fn rebuild_all<S>(&mut self, grid: &Grid, obstacles: &[Vec2], destinations: &S)
    where
        S: DestinationSource + ?Sized,
    {
        let costs = CostField::build(grid, obstacles);
        let mut layers = BTreeMap::new();

        for destination in Destination::ALL {
            let position = destinations
                .destination_position(destination)
                .unwrap_or_else(|| {
                    warn!(
                        destination = destination.label(),
                        "no provider for destination; using grid origin"
                    );
                    grid.origin()
                });
            let cell = grid.world_to_grid(position);
            let _ = layers.insert(
                destination,
                NavigationLayers::build(grid, costs.clone(), cell),
            );
        }

        self.grid = Some(*grid);
        self.layers = layers;
        self.state = RegistryState::Ready;
        self.generation = self.generation.wrapping_add(1);

        info!(
            generation = self.generation,
            width = grid.width(),
            height = grid.height(),
            obstacles = obstacles.len(),
            "rebuilt flow fields"
        );
    }

    /// Direction of travel toward `destination` from the cell containing `position`.
    ///
    /// Returns [`GridDelta::ZERO`] and logs a warning before the first rebuild.
    #[must_use]
    pub fn query_direction(&self, destination: Destination, position: Vec2) -> GridDelta {
        let (Some(grid), Some(layers)) = (self.grid.as_ref(), self.layers.get(&destination))
        else {
            warn!(
                destination = destination.label(),
                "flow field queried before it was built"
            );
            return GridDelta::ZERO;
        };

        layers.flow().direction(grid.world_to_grid(position))
    }

    /// Reports whether every destination has a field.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state == RegistryState::Ready
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> RegistryState {
        self.state
    }

    /// Grid the current fields were built against.
    #[must_use]
    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    /// Fields built for the provided destination.
    #[must_use]
    pub fn layers(&self, destination: Destination) -> Option<&NavigationLayers> {
        self.layers.get(&destination)
    }

    /// Number of completed rebuilds.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
