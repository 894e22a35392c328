//! Headless tick loop wiring the world to the steering and foraging systems.

use std::time::Duration;

use tower_fusion_core::{AgentSnapshot, Command, Event};
use tower_fusion_system_foraging::{Foraging, ForagingSettings};
use tower_fusion_system_steering::Steering;
use tower_fusion_world::{self as world, query, World};
use tracing::info;

/// Owns the world and the systems that react to it.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    steering: Steering,
    foraging: Foraging,
    moves: u64,
    despawned: u32,
}

/// Summary of a finished run.
#[derive(Debug, PartialEq)]
pub(crate) struct Report {
    pub(crate) ticks: u32,
    pub(crate) moves: u64,
    pub(crate) despawned: u32,
    pub(crate) agents: Vec<AgentSnapshot>,
}

impl Simulation {
    pub(crate) fn new(foraging: ForagingSettings) -> Self {
        Self {
            world: World::new(),
            steering: Steering::default(),
            foraging: Foraging::new(foraging),
            moves: 0,
            despawned: 0,
        }
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    /// Applies a command and lets the systems react until they fall silent.
    pub(crate) fn submit(&mut self, command: Command) {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.pump(events);
    }

    fn pump(&mut self, mut events: Vec<Event>) {
        while !events.is_empty() {
            for event in &events {
                match event {
                    Event::AgentMoved { .. } => self.moves += 1,
                    Event::AgentDespawned { .. } => self.despawned += 1,
                    _ => {}
                }
            }

            let agents = query::agent_view(&self.world);
            let navigation = query::navigation(&self.world);
            let mut commands = Vec::new();
            self.steering
                .handle(&events, &agents, &navigation, &mut commands);
            self.foraging
                .handle(&events, &agents, &navigation, &mut commands);

            events.clear();
            for command in commands {
                world::apply(&mut self.world, command, &mut events);
            }
        }
    }

    /// Advances the simulation, stopping early once every agent has left.
    pub(crate) fn run(&mut self, ticks: u32, dt: Duration) -> Report {
        let mut executed = 0;
        while executed < ticks && !query::agent_view(&self.world).is_empty() {
            self.submit(Command::Tick { dt });
            executed += 1;
        }

        info!(
            ticks = executed,
            moves = self.moves,
            despawned = self.despawned,
            "simulation finished"
        );

        Report {
            ticks: executed,
            moves: self.moves,
            despawned: self.despawned,
            agents: query::agent_view(&self.world).into_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Scenario;

    fn run_demo(ticks: u32) -> Report {
        let scenario = Scenario::demo().expect("demo parses");
        let mut simulation = Simulation::new(scenario.foraging);
        for command in scenario.setup_commands() {
            simulation.submit(command);
        }
        simulation.run(ticks, scenario.simulation.tick_duration())
    }

    #[test]
    fn demo_runs_are_reproducible() {
        let first = run_demo(200);
        let second = run_demo(200);

        assert_eq!(first, second);
        assert_eq!(first.ticks, 200);
        assert!(first.moves > 0);
    }

    #[test]
    fn run_stops_once_no_agents_remain() {
        let mut simulation = Simulation::new(ForagingSettings::default());
        let report = simulation.run(50, Duration::from_millis(16));

        assert_eq!(report.ticks, 0);
        assert!(report.agents.is_empty());
        assert_eq!(query::tick_index(simulation.world()), 0);
    }
}
