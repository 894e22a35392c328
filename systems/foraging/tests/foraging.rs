use std::time::Duration;

use glam::Vec2;
use tower_fusion_core::{
    AgentProfile, Command, Destination, Event, GridSettings, MapBounds, SteeringStrategy,
};
use tower_fusion_system_foraging::{ErrandPhase, Foraging};
use tower_fusion_system_steering::Steering;
use tower_fusion_world::{self as world, query, World};

struct Harness {
    world: World,
    steering: Steering,
    foraging: Foraging,
    log: Vec<Event>,
}

impl Harness {
    fn new() -> Self {
        let mut harness = Self {
            world: World::new(),
            steering: Steering::default(),
            foraging: Foraging::default(),
            log: Vec::new(),
        };
        harness.submit(Command::ConfigureGrid {
            bounds: Some(MapBounds::new(Vec2::ZERO, Vec2::new(8.0, 4.0))),
            settings: GridSettings::new(1.0, false, 0.0).expect("valid settings"),
        });
        harness.submit(Command::SetDestination {
            destination: Destination::ResourceCache,
            position: Vec2::new(6.5, 2.5),
        });
        harness.submit(Command::SetDestination {
            destination: Destination::ReturnPoint,
            position: Vec2::new(0.5, 0.5),
        });
        harness.submit(Command::PlaceStructure {
            position: Vec2::new(3.5, 0.5),
        });
        harness.submit(Command::PlaceStructure {
            position: Vec2::new(3.5, 1.5),
        });
        harness
    }

    fn submit(&mut self, command: Command) {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.pump(events);
    }

    fn pump(&mut self, mut events: Vec<Event>) {
        while !events.is_empty() {
            self.log.extend(events.iter().cloned());

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
}

#[test]
fn agents_gather_and_return_before_leaving() {
    let mut harness = Harness::new();
    harness.submit(Command::SpawnAgent {
        position: Vec2::new(0.5, 0.5),
        profile: AgentProfile {
            base_speed: 2.0,
            goal: Destination::ResourceCache,
            strategy: SteeringStrategy::FlowField,
            separation: None,
        },
    });

    for _ in 0..400 {
        if query::agent_view(&harness.world).is_empty() {
            break;
        }
        harness.submit(Command::Tick {
            dt: Duration::from_millis(50),
        });
    }

    assert!(query::agent_view(&harness.world).is_empty());

    let goal_changes: Vec<_> = harness
        .log
        .iter()
        .filter_map(|event| match event {
            Event::AgentGoalChanged { destination, .. } => Some(*destination),
            _ => None,
        })
        .collect();
    assert_eq!(goal_changes, vec![Destination::ReturnPoint]);
    assert!(harness
        .log
        .iter()
        .any(|event| matches!(event, Event::AgentDespawned { .. })));
}

#[test]
fn carried_haul_slows_the_agent() {
    let mut harness = Harness::new();
    harness.submit(Command::SpawnAgent {
        position: Vec2::new(6.5, 2.5),
        profile: AgentProfile {
            base_speed: 2.0,
            goal: Destination::ResourceCache,
            strategy: SteeringStrategy::FlowField,
            separation: None,
        },
    });

    for _ in 0..21 {
        harness.submit(Command::Tick {
            dt: Duration::from_millis(50),
        });
    }

    let agent = query::agent_view(&harness.world).into_vec()[0];
    assert_eq!(agent.goal, Destination::ReturnPoint);
    assert!((agent.speed() - 1.6).abs() < 1e-6);
    assert_eq!(harness.foraging.phase(agent.id), Some(ErrandPhase::Returning));
}
