//! TOML scenario files describing a map, its destinations, and the agents to spawn.

use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use tower_fusion_core::{
    AgentProfile, Command, Destination, GridSettings, MapBounds, Separation, SteeringStrategy,
};
use tower_fusion_system_foraging::ForagingSettings;

/// Scenario used when no file is provided on the command line.
const DEMO_SCENARIO: &str = r#"
structures = [
    [0.25, -2.75], [0.25, -2.25], [0.25, -1.75], [0.25, -1.25],
    [0.25, -0.75], [0.25, -0.25], [0.25, 0.25], [0.25, 0.75],
    [-2.75, 1.75], [-2.25, 1.75], [-1.75, 1.75], [-1.25, 1.75],
]

[grid]
cell_size = 0.5
center_in_bounds = true
margin = 0.0

[map]
min = [-5.0, -3.5]
max = [5.0, 3.5]

[destinations]
resource_cache = [4.0, 2.5]
return_point = [-4.0, -2.5]

[[agents]]
position = [-4.0, -2.5]
count = 6
jitter = 0.3
speed = 2.0
strategy = "flow-field"
goal = "resource-cache"

[[agents]]
position = [-4.0, 2.5]
count = 2
speed = 1.5
strategy = "direct"
goal = "resource-cache"
separation = { radius = 0.8, strength = 1.5 }

[simulation]
ticks = 600
dt = 0.016
seed = 7
"#;

/// Everything needed to set up and run a headless simulation.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scenario {
    #[serde(default)]
    grid: GridSettings,
    #[serde(default)]
    map: Option<MapSection>,
    #[serde(default)]
    destinations: DestinationsSection,
    #[serde(default)]
    structures: Vec<[f32; 2]>,
    #[serde(default)]
    agents: Vec<AgentGroup>,
    #[serde(default)]
    pub(crate) foraging: ForagingSettings,
    #[serde(default)]
    pub(crate) simulation: SimulationSection,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MapSection {
    min: [f32; 2],
    max: [f32; 2],
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DestinationsSection {
    resource_cache: Option<[f32; 2]>,
    return_point: Option<[f32; 2]>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AgentGroup {
    position: [f32; 2],
    #[serde(default = "default_count")]
    count: u32,
    #[serde(default)]
    jitter: f32,
    #[serde(default = "default_speed")]
    speed: f32,
    #[serde(default)]
    strategy: SteeringStrategy,
    #[serde(default = "default_goal")]
    goal: Destination,
    #[serde(default = "default_separation")]
    separation: Option<Separation>,
}

/// Tick count, step length, and random seed of a run.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SimulationSection {
    pub(crate) ticks: u32,
    dt: f32,
    seed: u64,
}

impl SimulationSection {
    /// Simulated time covered by a single tick.
    ///
    /// `dt` is checked by [`Scenario::parse`], so the conversion only falls
    /// back for sections that skipped validation.
    pub(crate) fn tick_duration(&self) -> Duration {
        Duration::try_from_secs_f32(self.dt).unwrap_or(Duration::ZERO)
    }
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            ticks: 300,
            dt: 1.0 / 60.0,
            seed: 7,
        }
    }
}

fn default_count() -> u32 {
    1
}

fn default_speed() -> f32 {
    AgentProfile::default().base_speed
}

fn default_goal() -> Destination {
    Destination::ResourceCache
}

fn default_separation() -> Option<Separation> {
    Some(Separation::default())
}

impl Scenario {
    /// Reads and validates a scenario file.
    pub(crate) fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario at {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid scenario {}", path.display()))
    }

    /// Built-in scenario with a walled-off cache and two groups of agents.
    pub(crate) fn demo() -> Result<Self> {
        Self::parse(DEMO_SCENARIO).context("built-in demo scenario is malformed")
    }

    fn parse(contents: &str) -> Result<Self> {
        let scenario: Self =
            toml::from_str(contents).context("failed to parse scenario toml contents")?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<()> {
        let dt = self.simulation.dt;
        if !dt.is_finite() || dt <= 0.0 {
            bail!("simulation dt must be a positive number of seconds, got {dt}");
        }
        if Duration::try_from_secs_f32(dt).is_err() {
            bail!("simulation dt of {dt} seconds is too large for a tick");
        }

        for (index, group) in self.agents.iter().enumerate() {
            if !group.speed.is_finite() || group.speed < 0.0 {
                bail!(
                    "agent group {index} has invalid speed {}; expected a non-negative number",
                    group.speed
                );
            }
            if !group.jitter.is_finite() || group.jitter < 0.0 {
                bail!(
                    "agent group {index} has invalid jitter {}; expected a non-negative number",
                    group.jitter
                );
            }
        }

        Ok(())
    }

    /// Commands that build the scenario's world, in submission order.
    ///
    /// Spawn jitter is drawn from a generator seeded by the scenario, so the
    /// same file always yields the same commands.
    pub(crate) fn setup_commands(&self) -> Vec<Command> {
        let mut commands = vec![Command::ConfigureGrid {
            bounds: self
                .map
                .as_ref()
                .map(|map| MapBounds::new(Vec2::from(map.min), Vec2::from(map.max))),
            settings: self.grid,
        }];

        let anchors = [
            (Destination::ResourceCache, self.destinations.resource_cache),
            (Destination::ReturnPoint, self.destinations.return_point),
        ];
        commands.extend(anchors.into_iter().filter_map(|(destination, position)| {
            position.map(|position| Command::SetDestination {
                destination,
                position: Vec2::from(position),
            })
        }));

        commands.extend(
            self.structures
                .iter()
                .map(|&position| Command::PlaceStructure {
                    position: Vec2::from(position),
                }),
        );

        let mut rng = ChaCha8Rng::seed_from_u64(self.simulation.seed);
        for group in &self.agents {
            let profile = AgentProfile {
                base_speed: group.speed,
                goal: group.goal,
                strategy: group.strategy,
                separation: group.separation,
            };
            let origin = Vec2::from(group.position);
            for _ in 0..group.count {
                let offset = if group.jitter > 0.0 {
                    Vec2::new(
                        rng.gen_range(-group.jitter..=group.jitter),
                        rng.gen_range(-group.jitter..=group.jitter),
                    )
                } else {
                    Vec2::ZERO
                };
                commands.push(Command::SpawnAgent {
                    position: origin + offset,
                    profile,
                });
            }
        }

        commands
    }
}
