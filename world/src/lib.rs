#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the Tower Fusion navigation engine.

pub mod navigation;
mod structures;

use std::collections::BTreeMap;

use glam::Vec2;
use tower_fusion_core::{
    AgentId, AgentProfile, AgentSnapshot, Command, Destination, Event, Grid, GridSettings,
    Separation, SteeringStrategy,
};
use tracing::{debug, info, warn};

use crate::{navigation::FlowFieldRegistry, structures::StructureRegistry};

/// Represents the authoritative navigation world state.
#[derive(Debug)]
pub struct World {
    grid: Option<Grid>,
    structures: StructureRegistry,
    destinations: BTreeMap<Destination, Vec2>,
    agents: BTreeMap<AgentId, Agent>,
    next_agent_id: AgentId,
    navigation: FlowFieldRegistry,
    tick_index: u64,
}

impl World {
    /// Creates an empty world without a grid, structures, or agents.
    #[must_use]
    pub fn new() -> Self {
        Self {
            grid: None,
            structures: StructureRegistry::new(),
            destinations: BTreeMap::new(),
            agents: BTreeMap::new(),
            next_agent_id: AgentId::new(0),
            navigation: FlowFieldRegistry::new(),
            tick_index: 0,
        }
    }

    fn rebuild_navigation(&mut self, out_events: &mut Vec<Event>) -> bool {
        let Some(grid) = self.grid else {
            return false;
        };

        let obstacles = self.structures.positions();
        self.navigation
            .rebuild_all(&grid, &obstacles, &self.destinations);
        out_events.push(Event::FlowFieldsRebuilt {
            generation: self.navigation.generation(),
        });
        true
    }

    fn agent_mut(&mut self, agent: AgentId) -> Option<&mut Agent> {
        let found = self.agents.get_mut(&agent);
        if found.is_none() {
            debug!(agent = agent.get(), "ignoring command for unknown agent");
        }
        found
    }

    fn allocate_agent_id(&mut self) -> AgentId {
        let id = self.next_agent_id;
        self.next_agent_id = AgentId::new(id.get().wrapping_add(1));
        id
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid { bounds, settings } => {
            let settings = match settings.validate() {
                Ok(()) => settings,
                Err(error) => {
                    warn!(%error, "invalid grid settings; using defaults");
                    GridSettings::default()
                }
            };
            if bounds.is_none() {
                warn!("map bounds unavailable; using fallback grid extent");
            }

            let grid = Grid::from_bounds(bounds, &settings);
            info!(
                width = grid.width(),
                height = grid.height(),
                cell_size = grid.cell_size(),
                origin_x = grid.origin().x,
                origin_y = grid.origin().y,
                "configured navigation grid"
            );
            world.grid = Some(grid);
            out_events.push(Event::GridConfigured {
                width: grid.width(),
                height: grid.height(),
            });
            let _ = world.rebuild_navigation(out_events);
        }
        Command::PlaceStructure { position } => {
            let structure = world.structures.insert(position);
            out_events.push(Event::StructurePlaced {
                structure,
                position,
            });
            let _ = world.rebuild_navigation(out_events);
        }
        Command::RemoveStructure { structure } => {
            let Some(position) = world.structures.remove(structure) else {
                debug!(
                    structure = structure.get(),
                    "rejected removal of unknown structure"
                );
                out_events.push(Event::StructureRemovalRejected { structure });
                return;
            };
            out_events.push(Event::StructureRemoved {
                structure,
                position,
            });
            let _ = world.rebuild_navigation(out_events);
        }
        Command::SetDestination {
            destination,
            position,
        } => {
            let _ = world.destinations.insert(destination, position);
            out_events.push(Event::DestinationMoved {
                destination,
                cell: world.grid.map(|grid| grid.world_to_grid(position)),
            });
            let _ = world.rebuild_navigation(out_events);
        }
        Command::ClearDestination { destination } => {
            if world.destinations.remove(&destination).is_none() {
                debug!(
                    destination = destination.label(),
                    "destination already without a position"
                );
                return;
            }
            out_events.push(Event::DestinationMoved {
                destination,
                cell: world.grid.map(|grid| grid.world_to_grid(grid.origin())),
            });
            let _ = world.rebuild_navigation(out_events);
        }
        Command::RebuildFlowFields => {
            if !world.rebuild_navigation(out_events) {
                warn!("flow field rebuild requested before the grid was configured");
            }
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::SpawnAgent { position, profile } => {
            if !profile.base_speed.is_finite() || profile.base_speed < 0.0 {
                warn!(
                    base_speed = profile.base_speed,
                    "ignoring spawn with invalid base speed"
                );
                return;
            }
            let agent = world.allocate_agent_id();
            let _ = world
                .agents
                .insert(agent, Agent::from_profile(agent, position, profile));
            out_events.push(Event::AgentSpawned { agent, position });
        }
        Command::MoveAgent { agent, position } => {
            let Some(state) = world.agent_mut(agent) else {
                return;
            };
            let from = state.position;
            if from == position {
                return;
            }
            state.position = position;
            out_events.push(Event::AgentMoved {
                agent,
                from,
                to: position,
            });
        }
        Command::AssignGoal { agent, destination } => {
            let Some(state) = world.agent_mut(agent) else {
                return;
            };
            if state.goal == destination {
                return;
            }
            state.goal = destination;
            out_events.push(Event::AgentGoalChanged { agent, destination });
        }
        Command::SetSpeedMultiplier { agent, multiplier } => {
            if !multiplier.is_finite() || multiplier < 0.0 {
                warn!(
                    agent = agent.get(),
                    multiplier, "ignoring invalid speed multiplier"
                );
                return;
            }
            if let Some(state) = world.agent_mut(agent) {
                state.speed_multiplier = multiplier;
            }
        }
        Command::DespawnAgent { agent } => {
            if world.agents.remove(&agent).is_some() {
                out_events.push(Event::AgentDespawned { agent });
            } else {
                debug!(agent = agent.get(), "ignoring despawn of unknown agent");
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::collections::BTreeMap;

    use glam::Vec2;
    use tower_fusion_core::{AgentView, Destination, Grid, GridDelta, StructureSnapshot};

    use super::World;
    use crate::navigation::FlowFieldRegistry;

    /// Navigation grid, if one has been configured.
    #[must_use]
    pub fn grid(world: &World) -> Option<&Grid> {
        world.grid.as_ref()
    }

    /// Provides read-only access to the flow field registry.
    #[must_use]
    pub fn flow_fields(world: &World) -> &FlowFieldRegistry {
        &world.navigation
    }

    /// Captures a read-only view of every agent in identifier order.
    #[must_use]
    pub fn agent_view(world: &World) -> AgentView {
        AgentView::from_snapshots(world.agents.values().map(|agent| agent.snapshot()).collect())
    }

    /// Snapshots of every placed structure in identifier order.
    #[must_use]
    pub fn structures(world: &World) -> Vec<StructureSnapshot> {
        world.structures.snapshots()
    }

    /// World-space position of the destination, if one has been provided.
    #[must_use]
    pub fn destination_position(world: &World, destination: Destination) -> Option<Vec2> {
        world.destinations.get(&destination).copied()
    }

    /// Direction of travel toward the destination from the provided position.
    #[must_use]
    pub fn flow_direction(world: &World, destination: Destination, position: Vec2) -> GridDelta {
        world.navigation.query_direction(destination, position)
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Bundles the navigation state steering systems read.
    #[must_use]
    pub fn navigation(world: &World) -> NavigationView<'_> {
        NavigationView {
            grid: world.grid.as_ref(),
            flow_fields: &world.navigation,
            destinations: &world.destinations,
        }
    }

    /// Read-only view of the grid, flow fields, and destination anchors.
    #[derive(Clone, Copy, Debug)]
    pub struct NavigationView<'a> {
        grid: Option<&'a Grid>,
        flow_fields: &'a FlowFieldRegistry,
        destinations: &'a BTreeMap<Destination, Vec2>,
    }

    impl<'a> NavigationView<'a> {
        /// Navigation grid, if one has been configured.
        #[must_use]
        pub fn grid(&self) -> Option<&'a Grid> {
            self.grid
        }

        /// Flow field registry owned by the world.
        #[must_use]
        pub fn flow_fields(&self) -> &'a FlowFieldRegistry {
            self.flow_fields
        }

        /// World-space position of the destination, if one has been provided.
        #[must_use]
        pub fn destination_position(&self, destination: Destination) -> Option<Vec2> {
            self.destinations.get(&destination).copied()
        }
    }
}

#[derive(Clone, Debug)]
struct Agent {
    id: AgentId,
    position: Vec2,
    goal: Destination,
    base_speed: f32,
    speed_multiplier: f32,
    strategy: SteeringStrategy,
    separation: Option<Separation>,
}

impl Agent {
    fn from_profile(id: AgentId, position: Vec2, profile: AgentProfile) -> Self {
        Self {
            id,
            position,
            goal: profile.goal,
            base_speed: profile.base_speed,
            speed_multiplier: 1.0,
            strategy: profile.strategy,
            separation: profile.separation,
        }
    }

    fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            position: self.position,
            goal: self.goal,
            base_speed: self.base_speed,
            speed_multiplier: self.speed_multiplier,
            strategy: self.strategy,
            separation: self.separation,
        }
    }
}
