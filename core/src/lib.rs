#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tower Fusion navigation engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

mod grid;

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use grid::{
    Grid, GridCoord, GridDelta, GridSettings, GridSettingsError, MapBounds, FALLBACK_EXTENT,
    FALLBACK_ORIGIN,
};

/// Traversal cost of an unobstructed cell.
pub const PASSABLE_COST: u8 = 1;

/// Traversal cost marking a cell that cannot be entered.
pub const BLOCKED_COST: u8 = 255;

/// Integration value of cells that cannot reach the destination.
pub const INTEGRATION_MAX: u16 = u16::MAX;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Rebuilds the navigation grid from the map backdrop bounds.
    ConfigureGrid {
        /// Bounds of the map backdrop, or `None` to use the fallback extent.
        bounds: Option<MapBounds>,
        /// Discretization settings applied to the bounds.
        settings: GridSettings,
    },
    /// Registers a blocking structure at the provided world position.
    PlaceStructure {
        /// World-space position of the structure.
        position: Vec2,
    },
    /// Removes a previously placed structure.
    RemoveStructure {
        /// Identifier of the structure targeted for removal.
        structure: StructureId,
    },
    /// Moves a destination anchor to a new world position.
    SetDestination {
        /// Destination being moved.
        destination: Destination,
        /// New world-space position of the destination.
        position: Vec2,
    },
    /// Forgets the world position of a destination.
    ClearDestination {
        /// Destination whose provider went away.
        destination: Destination,
    },
    /// Requests an explicit rebuild of every flow field.
    RebuildFlowFields,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Adds a steering agent to the simulation; ignored when the base speed
    /// is negative or not finite.
    SpawnAgent {
        /// World-space position the agent starts at.
        position: Vec2,
        /// Movement parameters of the agent.
        profile: AgentProfile,
    },
    /// Moves an agent to the position computed by the steering system.
    MoveAgent {
        /// Agent being moved.
        agent: AgentId,
        /// New world-space position.
        position: Vec2,
    },
    /// Points an agent at a different destination.
    AssignGoal {
        /// Agent receiving the new goal.
        agent: AgentId,
        /// Destination the agent should travel toward.
        destination: Destination,
    },
    /// Replaces an agent's speed multiplier.
    SetSpeedMultiplier {
        /// Agent whose speed changes.
        agent: AgentId,
        /// Multiplier applied on top of the base speed.
        multiplier: f32,
    },
    /// Removes an agent from the simulation.
    DespawnAgent {
        /// Agent being removed.
        agent: AgentId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// The navigation grid was (re)initialized.
    GridConfigured {
        /// Number of cell columns.
        width: u32,
        /// Number of cell rows.
        height: u32,
    },
    /// A blocking structure was registered.
    StructurePlaced {
        /// Identifier allocated to the structure.
        structure: StructureId,
        /// World-space position of the structure.
        position: Vec2,
    },
    /// A blocking structure was removed.
    StructureRemoved {
        /// Identifier of the removed structure.
        structure: StructureId,
        /// World-space position the structure occupied.
        position: Vec2,
    },
    /// A removal request referenced an unknown structure.
    StructureRemovalRejected {
        /// Identifier provided in the request.
        structure: StructureId,
    },
    /// A destination anchor moved.
    DestinationMoved {
        /// Destination that moved.
        destination: Destination,
        /// Cell the destination now resolves to, if a grid is configured.
        cell: Option<GridCoord>,
    },
    /// Every flow field was rebuilt.
    FlowFieldsRebuilt {
        /// Monotonic counter identifying the rebuild.
        generation: u64,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// An agent joined the simulation.
    AgentSpawned {
        /// Identifier allocated to the agent.
        agent: AgentId,
        /// Position the agent starts at.
        position: Vec2,
    },
    /// An agent changed position.
    AgentMoved {
        /// Agent that moved.
        agent: AgentId,
        /// Position before the move.
        from: Vec2,
        /// Position after the move.
        to: Vec2,
    },
    /// An agent now travels toward a different destination.
    AgentGoalChanged {
        /// Agent whose goal changed.
        agent: AgentId,
        /// New destination.
        destination: Destination,
    },
    /// An agent left the simulation.
    AgentDespawned {
        /// Agent that was removed.
        agent: AgentId,
    },
}

/// Named goals that each own a flow field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Destination {
    /// Storage the agents raid.
    ResourceCache,
    /// Point the agents carry their haul back to.
    ReturnPoint,
}

impl Destination {
    /// Every destination, in the order fields are rebuilt.
    pub const ALL: [Self; 2] = [Self::ResourceCache, Self::ReturnPoint];

    /// Human-readable label used in logs and reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ResourceCache => "resource-cache",
            Self::ReturnPoint => "return-point",
        }
    }
}

/// Strategy an agent uses to pick its desired direction.
///
/// Variants are ordered from most to least informed; an agent falls back to
/// a later variant when the guidance an earlier one needs is unavailable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SteeringStrategy {
    /// Follow the destination's flow field.
    #[default]
    FlowField,
    /// Step cell by cell toward the destination along grid axes.
    GridAligned,
    /// Head straight for the destination.
    Direct,
}

impl SteeringStrategy {
    /// Downgrades the strategy to the best one the current guidance supports.
    #[must_use]
    pub fn resolve(self, flow_fields_ready: bool, grid_ready: bool) -> Self {
        let available = if flow_fields_ready {
            Self::FlowField
        } else if grid_ready {
            Self::GridAligned
        } else {
            Self::Direct
        };
        self.max(available)
    }
}

/// Local repulsion parameters of an agent.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Separation {
    /// Distance under which other agents push this one away.
    pub radius: f32,
    /// Scale of the push at zero distance.
    pub strength: f32,
}

impl Default for Separation {
    fn default() -> Self {
        Self {
            radius: 1.0,
            strength: 2.0,
        }
    }
}

/// Movement parameters supplied when spawning an agent.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Speed in world units per second before multipliers.
    pub base_speed: f32,
    /// Destination the agent starts out heading for.
    pub goal: Destination,
    /// Preferred steering strategy.
    pub strategy: SteeringStrategy,
    /// Separation settings, or `None` to disable separation.
    pub separation: Option<Separation>,
}

impl Default for AgentProfile {
    fn default() -> Self {
        Self {
            base_speed: 2.0,
            goal: Destination::ResourceCache,
            strategy: SteeringStrategy::FlowField,
            separation: Some(Separation::default()),
        }
    }
}

/// Unique identifier assigned to an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a blocking structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StructureId(u32);

impl StructureId {
    /// Creates a new structure identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Immutable representation of a single agent's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentSnapshot {
    /// Unique identifier assigned to the agent.
    pub id: AgentId,
    /// Current world-space position.
    pub position: Vec2,
    /// Destination the agent is travelling toward.
    pub goal: Destination,
    /// Speed before multipliers.
    pub base_speed: f32,
    /// Current multiplier applied to the base speed.
    pub speed_multiplier: f32,
    /// Preferred steering strategy.
    pub strategy: SteeringStrategy,
    /// Separation settings, if enabled.
    pub separation: Option<Separation>,
}

impl AgentSnapshot {
    /// Effective speed in world units per second.
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.base_speed * self.speed_multiplier
    }
}

/// Read-only snapshot describing all active agents.
#[derive(Clone, Debug, Default)]
pub struct AgentView {
    snapshots: Vec<AgentSnapshot>,
}

impl AgentView {
    /// Creates a new agent view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<AgentSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured agent snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentSnapshot> {
        self.snapshots.iter()
    }

    /// Number of agents in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no agents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<AgentSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a placed structure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StructureSnapshot {
    /// Identifier allocated by the world.
    pub id: StructureId,
    /// World-space position of the structure.
    pub position: Vec2,
}
