use std::time::Duration;

use glam::Vec2;
use tower_fusion_core::{
    AgentId, AgentProfile, Command, Destination, Event, GridSettings, MapBounds, Separation,
    SteeringStrategy,
};
use tower_fusion_system_steering::Steering;
use tower_fusion_world::{self as world, query, World};

fn center(x: u32, y: u32) -> Vec2 {
    Vec2::new(x as f32 + 0.5, y as f32 + 0.5)
}

fn configured_world(width: f32, height: f32, cache: Vec2) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureGrid {
            bounds: Some(MapBounds::new(Vec2::ZERO, Vec2::new(width, height))),
            settings: GridSettings::new(1.0, false, 0.0).expect("valid settings"),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::SetDestination {
            destination: Destination::ResourceCache,
            position: cache,
        },
        &mut events,
    );
    world
}

fn spawn(world: &mut World, position: Vec2, profile: AgentProfile) -> AgentId {
    let mut events = Vec::new();
    world::apply(world, Command::SpawnAgent { position, profile }, &mut events);
    match events.as_slice() {
        [Event::AgentSpawned { agent, .. }] => *agent,
        other => panic!("unexpected spawn events: {other:?}"),
    }
}

fn profile(strategy: SteeringStrategy, separation: Option<Separation>) -> AgentProfile {
    AgentProfile {
        base_speed: 1.0,
        goal: Destination::ResourceCache,
        strategy,
        separation,
    }
}

fn tick(world: &mut World, steering: &mut Steering, dt: Duration) -> Vec<Command> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt }, &mut events);

    let agents = query::agent_view(world);
    let navigation = query::navigation(world);
    let mut commands = Vec::new();
    steering.handle(&events, &agents, &navigation, &mut commands);

    let mut applied = Vec::new();
    for command in commands.iter().cloned() {
        world::apply(world, command, &mut applied);
    }
    commands
}

fn position_of(world: &World, agent: AgentId) -> Vec2 {
    query::agent_view(world)
        .iter()
        .find(|snapshot| snapshot.id == agent)
        .map(|snapshot| snapshot.position)
        .expect("agent exists")
}

#[test]
fn agents_follow_the_flow_field() {
    let mut world = configured_world(5.0, 5.0, center(0, 0));
    let agent = spawn(
        &mut world,
        center(4, 0),
        profile(SteeringStrategy::FlowField, None),
    );
    let mut steering = Steering::default();

    let commands = tick(&mut world, &mut steering, Duration::from_millis(500));

    assert_eq!(
        commands,
        vec![Command::MoveAgent {
            agent,
            position: Vec2::new(4.0, 0.5),
        }]
    );
}

#[test]
fn agents_route_around_structures() {
    let mut world = configured_world(5.0, 5.0, center(0, 0));
    let mut events = Vec::new();
    for cell in [(1, 0), (1, 1)] {
        world::apply(
            &mut world,
            Command::PlaceStructure {
                position: center(cell.0, cell.1),
            },
            &mut events,
        );
    }
    let agent = spawn(
        &mut world,
        center(2, 0),
        profile(SteeringStrategy::FlowField, None),
    );
    let mut steering = Steering::default();

    let _ = tick(&mut world, &mut steering, Duration::from_millis(250));

    assert_eq!(position_of(&world, agent), Vec2::new(2.5, 0.75));
}

#[test]
fn no_events_without_elapsed_time() {
    let mut world = configured_world(5.0, 5.0, center(0, 0));
    let _ = spawn(
        &mut world,
        center(4, 4),
        profile(SteeringStrategy::FlowField, None),
    );
    let agents = query::agent_view(&world);
    let navigation = query::navigation(&world);
    let mut steering = Steering::default();
    let mut commands = Vec::new();

    steering.handle(
        &[Event::FlowFieldsRebuilt { generation: 7 }],
        &agents,
        &navigation,
        &mut commands,
    );

    assert!(commands.is_empty());
}

#[test]
fn agents_at_their_destination_hold_position() {
    let mut world = configured_world(5.0, 5.0, center(2, 2));
    let _ = spawn(
        &mut world,
        Vec2::new(2.2, 2.7),
        profile(SteeringStrategy::FlowField, None),
    );
    let mut steering = Steering::default();

    let commands = tick(&mut world, &mut steering, Duration::from_millis(100));

    assert!(commands.is_empty());
}

#[test]
fn separation_moves_agents_that_reached_their_destination() {
    let mut world = configured_world(5.0, 5.0, center(2, 2));
    let left = spawn(
        &mut world,
        Vec2::new(2.3, 2.5),
        profile(SteeringStrategy::FlowField, Some(Separation::default())),
    );
    let right = spawn(
        &mut world,
        Vec2::new(2.7, 2.5),
        profile(SteeringStrategy::FlowField, Some(Separation::default())),
    );
    let mut steering = Steering::default();

    let _ = tick(&mut world, &mut steering, Duration::from_millis(100));

    let left_position = position_of(&world, left);
    let right_position = position_of(&world, right);
    assert!(left_position.x < 2.3, "left agent held at {left_position}");
    assert!(right_position.x > 2.7, "right agent held at {right_position}");
    assert!((left_position.y - 2.5).abs() < 1e-6);
    assert!((right_position.y - 2.5).abs() < 1e-6);
}

#[test]
fn flow_field_preference_downgrades_to_direct_without_a_grid() {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SetDestination {
            destination: Destination::ResourceCache,
            position: Vec2::new(3.0, 4.0),
        },
        &mut events,
    );
    let agent = spawn(
        &mut world,
        Vec2::ZERO,
        profile(SteeringStrategy::FlowField, None),
    );
    let mut steering = Steering::default();

    let _ = tick(&mut world, &mut steering, Duration::from_secs(1));

    let position = position_of(&world, agent);
    assert!((position - Vec2::new(0.6, 0.8)).length() < 1e-5);
}

#[test]
fn grid_aligned_agents_step_along_the_longer_axis() {
    let mut world = configured_world(8.0, 8.0, center(6, 2));
    let agent = spawn(
        &mut world,
        center(1, 1),
        profile(SteeringStrategy::GridAligned, None),
    );
    let mut steering = Steering::default();

    let _ = tick(&mut world, &mut steering, Duration::from_millis(500));

    assert_eq!(position_of(&world, agent), Vec2::new(2.0, 1.5));
}

#[test]
fn agents_without_a_known_destination_hold_when_steering_directly() {
    let mut world = World::new();
    let _ = spawn(
        &mut world,
        Vec2::ZERO,
        profile(SteeringStrategy::Direct, None),
    );
    let mut steering = Steering::default();

    let commands = tick(&mut world, &mut steering, Duration::from_secs(1));

    assert!(commands.is_empty());
}

#[test]
fn coincident_agents_diverge_with_separation() {
    let mut world = configured_world(10.0, 10.0, center(9, 5));
    let start = center(2, 5);
    let first = spawn(
        &mut world,
        start,
        profile(SteeringStrategy::FlowField, Some(Separation::default())),
    );
    let second = spawn(
        &mut world,
        start,
        profile(SteeringStrategy::FlowField, Some(Separation::default())),
    );
    let mut steering = Steering::default();

    let _ = tick(&mut world, &mut steering, Duration::from_millis(50));
    assert_ne!(position_of(&world, first), position_of(&world, second));

    for _ in 0..9 {
        let _ = tick(&mut world, &mut steering, Duration::from_millis(50));
    }

    let gap = position_of(&world, first).distance(position_of(&world, second));
    assert!(gap > 0.1, "agents stayed together: gap {gap}");
}

#[test]
fn coincident_agents_stay_together_without_separation() {
    let mut world = configured_world(10.0, 10.0, center(9, 5));
    let start = center(2, 5);
    let first = spawn(
        &mut world,
        start,
        profile(SteeringStrategy::FlowField, None),
    );
    let second = spawn(
        &mut world,
        start,
        profile(SteeringStrategy::FlowField, None),
    );
    let mut steering = Steering::default();

    for _ in 0..10 {
        let _ = tick(&mut world, &mut steering, Duration::from_millis(50));
    }

    assert_eq!(position_of(&world, first), position_of(&world, second));
    assert_ne!(position_of(&world, first), start);
}

#[test]
fn speed_multiplier_scales_displacement() {
    let mut world = configured_world(5.0, 5.0, center(0, 0));
    let agent = spawn(
        &mut world,
        center(4, 0),
        profile(SteeringStrategy::FlowField, None),
    );
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SetSpeedMultiplier {
            agent,
            multiplier: 0.5,
        },
        &mut events,
    );
    let mut steering = Steering::default();

    let _ = tick(&mut world, &mut steering, Duration::from_secs(1));

    assert_eq!(position_of(&world, agent), Vec2::new(4.0, 0.5));
}
