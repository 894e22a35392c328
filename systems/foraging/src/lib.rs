#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Errand system that sends agents to the resource cache and back.
//!
//! Agents heading for [`Destination::ResourceCache`] walk there, gather for a
//! fixed duration, then carry their haul to [`Destination::ReturnPoint`] at a
//! reduced speed and leave the simulation once they arrive.

use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tower_fusion_core::{AgentId, AgentSnapshot, AgentView, Command, Destination, Event};
use tower_fusion_world::query::NavigationView;
use tracing::debug;

/// Tunables of the gather-and-return cycle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForagingSettings {
    /// Distance at which an agent counts as having reached a destination.
    pub arrival_radius: f32,
    /// Seconds an agent spends at the resource cache.
    pub gather_seconds: f32,
    /// Factor applied to the agent's speed multiplier while carrying.
    pub carry_speed_multiplier: f32,
}

impl ForagingSettings {
    /// Time spent gathering, clamped to zero for negative or invalid values.
    #[must_use]
    pub fn gather_duration(&self) -> Duration {
        Duration::try_from_secs_f32(self.gather_seconds).unwrap_or(Duration::ZERO)
    }
}

impl Default for ForagingSettings {
    fn default() -> Self {
        Self {
            arrival_radius: 0.5,
            gather_seconds: 1.0,
            carry_speed_multiplier: 0.8,
        }
    }
}

/// Stage of an agent's errand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrandPhase {
    /// Travelling toward the resource cache.
    Outbound,
    /// Standing at the cache, accumulating gather time.
    Gathering {
        /// Time spent gathering so far.
        elapsed: Duration,
    },
    /// Carrying the haul back to the return point.
    Returning,
    /// Arrived at the return point; a despawn has been requested.
    Completed,
}

/// Pure system that reacts to world events and emits errand commands.
#[derive(Debug, Default)]
pub struct Foraging {
    settings: ForagingSettings,
    phases: BTreeMap<AgentId, ErrandPhase>,
}

impl Foraging {
    /// Creates the system with the provided settings.
    #[must_use]
    pub fn new(settings: ForagingSettings) -> Self {
        Self {
            settings,
            phases: BTreeMap::new(),
        }
    }

    /// Current errand phase of the agent, if the system tracks it.
    #[must_use]
    pub fn phase(&self, agent: AgentId) -> Option<ErrandPhase> {
        self.phases.get(&agent).copied()
    }

    /// Consumes world events and immutable views to emit errand commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        agents: &AgentView,
        navigation: &NavigationView<'_>,
        out: &mut Vec<Command>,
    ) {
        let mut dt = Duration::ZERO;
        for event in events {
            match event {
                Event::TimeAdvanced { dt: step } => dt = dt.saturating_add(*step),
                Event::AgentDespawned { agent } => {
                    let _ = self.phases.remove(agent);
                }
                _ => {}
            }
        }

        if dt.is_zero() {
            return;
        }

        for agent in agents.iter() {
            let phase = match self.phases.get(&agent.id) {
                Some(phase) => *phase,
                None if agent.goal == Destination::ResourceCache => ErrandPhase::Outbound,
                None => continue,
            };

            let next = self.advance(agent, phase, dt, navigation, out);
            if next != phase {
                debug!(agent = agent.id.get(), from = ?phase, to = ?next, "errand advanced");
            }
            let _ = self.phases.insert(agent.id, next);
        }
    }

    fn advance(
        &self,
        agent: &AgentSnapshot,
        phase: ErrandPhase,
        dt: Duration,
        navigation: &NavigationView<'_>,
        out: &mut Vec<Command>,
    ) -> ErrandPhase {
        match phase {
            ErrandPhase::Outbound => {
                if self.has_arrived(agent.position, Destination::ResourceCache, navigation) {
                    ErrandPhase::Gathering {
                        elapsed: Duration::ZERO,
                    }
                } else {
                    ErrandPhase::Outbound
                }
            }
            ErrandPhase::Gathering { elapsed } => {
                let elapsed = elapsed.saturating_add(dt);
                if elapsed < self.settings.gather_duration() {
                    return ErrandPhase::Gathering { elapsed };
                }

                out.push(Command::AssignGoal {
                    agent: agent.id,
                    destination: Destination::ReturnPoint,
                });
                out.push(Command::SetSpeedMultiplier {
                    agent: agent.id,
                    multiplier: agent.speed_multiplier * self.settings.carry_speed_multiplier,
                });
                ErrandPhase::Returning
            }
            ErrandPhase::Returning => {
                if self.has_arrived(agent.position, Destination::ReturnPoint, navigation) {
                    out.push(Command::DespawnAgent { agent: agent.id });
                    ErrandPhase::Completed
                } else {
                    ErrandPhase::Returning
                }
            }
            ErrandPhase::Completed => ErrandPhase::Completed,
        }
    }

    fn has_arrived(
        &self,
        position: Vec2,
        destination: Destination,
        navigation: &NavigationView<'_>,
    ) -> bool {
        let Some(target) = navigation.destination_position(destination) else {
            return false;
        };

        if position.distance(target) <= self.settings.arrival_radius {
            return true;
        }

        navigation
            .grid()
            .is_some_and(|grid| grid.world_to_grid(position) == grid.world_to_grid(target))
    }
}
