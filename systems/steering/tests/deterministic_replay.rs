use std::time::Duration;

use glam::Vec2;
use tower_fusion_core::{
    AgentProfile, AgentSnapshot, Command, Destination, Event, GridSettings, MapBounds, Separation,
    SteeringStrategy,
};
use tower_fusion_system_steering::Steering;
use tower_fusion_world::{self as world, query, World};

#[test]
fn deterministic_replay_produces_identical_runs() {
    let first = replay(scripted_commands());
    let second = replay(scripted_commands());

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.agents.len(), 6);
    assert!(
        first
            .events
            .iter()
            .any(|event| matches!(event, Event::AgentMoved { .. })),
        "expected the replay to move agents"
    );
}

#[derive(Debug, PartialEq)]
struct ReplayOutcome {
    agents: Vec<AgentSnapshot>,
    events: Vec<Event>,
}

fn replay(commands: Vec<Command>) -> ReplayOutcome {
    let mut world = World::new();
    let mut steering = Steering::default();
    let mut log = Vec::new();

    for command in commands {
        let mut events = Vec::new();
        world::apply(&mut world, command, &mut events);
        log.extend(events.iter().cloned());
        process_steering(&mut world, &mut steering, events, &mut log);
    }

    ReplayOutcome {
        agents: query::agent_view(&world).into_vec(),
        events: log,
    }
}

fn process_steering(
    world: &mut World,
    steering: &mut Steering,
    pending_events: Vec<Event>,
    log: &mut Vec<Event>,
) {
    let mut events = pending_events;

    while !events.is_empty() {
        let agents = query::agent_view(world);
        let navigation = query::navigation(world);
        let mut commands = Vec::new();
        steering.handle(&events, &agents, &navigation, &mut commands);

        events.clear();
        for command in commands {
            world::apply(world, command, &mut events);
        }
        log.extend(events.iter().cloned());
    }
}

fn scripted_commands() -> Vec<Command> {
    let mut commands = vec![
        Command::ConfigureGrid {
            bounds: Some(MapBounds::new(Vec2::new(-6.0, -4.0), Vec2::new(6.0, 4.0))),
            settings: GridSettings::default(),
        },
        Command::SetDestination {
            destination: Destination::ResourceCache,
            position: Vec2::new(5.0, 3.0),
        },
        Command::SetDestination {
            destination: Destination::ReturnPoint,
            position: Vec2::new(-5.0, -3.0),
        },
    ];

    commands.extend((0..6).map(|row| Command::PlaceStructure {
        position: Vec2::new(0.25, -1.25 + row as f32 * 0.5),
    }));

    let strategies = [
        SteeringStrategy::FlowField,
        SteeringStrategy::GridAligned,
        SteeringStrategy::Direct,
    ];
    commands.extend((0..6).map(|index| Command::SpawnAgent {
        position: Vec2::new(-4.0, -2.0 + (index % 2) as f32 * 0.1),
        profile: AgentProfile {
            base_speed: 1.5,
            goal: Destination::ResourceCache,
            strategy: strategies[index % strategies.len()],
            separation: Some(Separation::default()),
        },
    }));

    for step in 0..120 {
        commands.push(Command::Tick {
            dt: Duration::from_millis(16),
        });
        if step == 60 {
            commands.push(Command::RemoveStructure {
                structure: tower_fusion_core::StructureId::new(2),
            });
        }
    }

    commands
}
