#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic steering system that moves agents along flow fields.
//!
//! Every agent reads the same start-of-tick snapshot, picks a desired
//! direction according to its (possibly downgraded) strategy, blends in a
//! separation push from nearby agents, and emits a [`Command::MoveAgent`]
//! with the integrated position.

use std::time::Duration;

use glam::Vec2;
use tower_fusion_core::{
    AgentId, AgentSnapshot, AgentView, Command, Event, GridCoord, GridDelta, Separation,
    SteeringStrategy,
};
use tower_fusion_world::query::NavigationView;
use tracing::debug;

/// Distance under which two agents are treated as standing on the same spot.
const COINCIDENT_EPSILON: f32 = 1.0e-4;

/// Pure system that reacts to world events and emits movement commands.
#[derive(Debug, Default)]
pub struct Steering;

impl Steering {
    /// Consumes world events and immutable views to emit movement commands.
    ///
    /// Nothing is emitted unless the batch contains at least one
    /// [`Event::TimeAdvanced`]; several ticks in one batch are integrated as a
    /// single step covering their combined duration.
    pub fn handle(
        &mut self,
        events: &[Event],
        agents: &AgentView,
        navigation: &NavigationView<'_>,
        out: &mut Vec<Command>,
    ) {
        let dt = elapsed(events);
        if dt.is_zero() || agents.is_empty() {
            return;
        }
        let seconds = dt.as_secs_f32();

        for agent in agents.iter() {
            let desired = desired_direction(agent, navigation);
            let heading = match agent.separation {
                Some(settings) => {
                    let push = separation_force(agent, settings, desired, agents.iter());
                    (desired + push).normalize_or_zero()
                }
                None => desired,
            };

            if heading == Vec2::ZERO {
                continue;
            }

            let position = agent.position + heading * agent.speed() * seconds;
            if position != agent.position {
                out.push(Command::MoveAgent {
                    agent: agent.id,
                    position,
                });
            }
        }
    }
}

fn elapsed(events: &[Event]) -> Duration {
    events
        .iter()
        .filter_map(|event| match event {
            Event::TimeAdvanced { dt } => Some(*dt),
            _ => None,
        })
        .fold(Duration::ZERO, Duration::saturating_add)
}

/// Unit-length direction the agent wants to travel in before separation.
///
/// Returns [`Vec2::ZERO`] when the agent should hold its position.
#[must_use]
pub fn desired_direction(agent: &AgentSnapshot, navigation: &NavigationView<'_>) -> Vec2 {
    let flow_fields = navigation.flow_fields();
    let grid = navigation.grid();
    let strategy = agent
        .strategy
        .resolve(flow_fields.is_ready(), grid.is_some());

    match strategy {
        SteeringStrategy::FlowField => flow_fields
            .query_direction(agent.goal, agent.position)
            .to_vec2(),
        SteeringStrategy::GridAligned => {
            let (Some(grid), Some(target)) = (grid, navigation.destination_position(agent.goal))
            else {
                debug!(
                    agent = agent.id.get(),
                    destination = agent.goal.label(),
                    "holding; destination position unknown"
                );
                return Vec2::ZERO;
            };
            grid_aligned_step(grid.world_to_grid(agent.position), grid.world_to_grid(target))
                .to_vec2()
        }
        SteeringStrategy::Direct => {
            let Some(target) = navigation.destination_position(agent.goal) else {
                debug!(
                    agent = agent.id.get(),
                    destination = agent.goal.label(),
                    "holding; destination position unknown"
                );
                return Vec2::ZERO;
            };
            (target - agent.position).normalize_or_zero()
        }
    }
}

/// Single cardinal step from `from` toward `to`.
///
/// The axis with the larger distance is stepped along first; horizontal wins
/// ties. Equal cells yield [`GridDelta::ZERO`].
#[must_use]
pub fn grid_aligned_step(from: GridCoord, to: GridCoord) -> GridDelta {
    let dx = i64::from(to.x()) - i64::from(from.x());
    let dy = i64::from(to.y()) - i64::from(from.y());

    if dx == 0 && dy == 0 {
        return GridDelta::ZERO;
    }

    if dx.abs() >= dy.abs() {
        if dx > 0 {
            GridDelta::RIGHT
        } else {
            GridDelta::LEFT
        }
    } else if dy > 0 {
        GridDelta::UP
    } else {
        GridDelta::DOWN
    }
}

/// Averaged push away from every other agent closer than `settings.radius`.
///
/// Each neighbour contributes `strength * (1 - distance / radius)` along the
/// direction pointing away from it. Agents sharing a position are pushed
/// apart perpendicular to `heading`, the lower identifier turning left.
#[must_use]
pub fn separation_force<'a, I>(
    agent: &AgentSnapshot,
    settings: Separation,
    heading: Vec2,
    neighbors: I,
) -> Vec2
where
    I: IntoIterator<Item = &'a AgentSnapshot>,
{
    if !(settings.radius > 0.0) {
        return Vec2::ZERO;
    }

    let mut total = Vec2::ZERO;
    let mut contributors = 0_u32;

    for other in neighbors {
        if other.id == agent.id {
            continue;
        }

        let offset = agent.position - other.position;
        let distance = offset.length();
        if distance >= settings.radius {
            continue;
        }

        let away = if distance > COINCIDENT_EPSILON {
            offset / distance
        } else {
            coincident_push(agent.id, other.id, heading)
        };

        total += away * settings.strength * (1.0 - distance / settings.radius);
        contributors += 1;
    }

    if contributors == 0 {
        Vec2::ZERO
    } else {
        total / contributors as f32
    }
}

fn coincident_push(agent: AgentId, other: AgentId, heading: Vec2) -> Vec2 {
    let side = heading.try_normalize().unwrap_or(Vec2::X).perp();
    if agent < other {
        side
    } else {
        -side
    }
}
