#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Tower Fusion navigation scenarios headlessly.

mod render;
mod scenario;
mod simulation;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tower_fusion_core::Destination;
use tower_fusion_world::query;
use tracing_subscriber::{fmt, EnvFilter};

use crate::{scenario::Scenario, simulation::Simulation};

#[derive(Debug, Parser)]
#[command(name = "tower-fusion")]
#[command(about = "Runs flow-field navigation scenarios without a renderer", version)]
struct Cli {
    /// Scenario file to load; the built-in demo runs when omitted.
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Overrides the number of ticks configured by the scenario.
    #[arg(long)]
    ticks: Option<u32>,

    /// Fields printed once the scenario is set up.
    #[arg(long, value_enum, default_value_t = FieldView::Flow)]
    show: FieldView,

    /// Destination whose fields are printed.
    #[arg(long, value_enum, default_value_t = DestinationArg::ResourceCache)]
    destination: DestinationArg,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "warn,tower_fusion=info")]
    log_level: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FieldView {
    Flow,
    Integration,
    Both,
    None,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum DestinationArg {
    ResourceCache,
    ReturnPoint,
}

impl From<DestinationArg> for Destination {
    fn from(value: DestinationArg) -> Self {
        match value {
            DestinationArg::ResourceCache => Destination::ResourceCache,
            DestinationArg::ReturnPoint => Destination::ReturnPoint,
        }
    }
}

/// Entry point for the Tower Fusion command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&cli.log_level))?;
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let scenario = match &cli.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::demo()?,
    };

    let mut simulation = Simulation::new(scenario.foraging);
    for command in scenario.setup_commands() {
        simulation.submit(command);
    }

    print_fields(&simulation, cli.show, cli.destination.into())?;

    let ticks = cli.ticks.unwrap_or(scenario.simulation.ticks);
    let report = simulation.run(ticks, scenario.simulation.tick_duration());

    println!(
        "ran {} ticks: {} moves, {} agents finished their errand, {} remaining",
        report.ticks,
        report.moves,
        report.despawned,
        report.agents.len()
    );
    for agent in &report.agents {
        println!(
            "  agent {:>3} at ({:>7.2}, {:>7.2}) heading to {}",
            agent.id.get(),
            agent.position.x,
            agent.position.y,
            agent.goal.label()
        );
    }

    Ok(())
}

fn print_fields(simulation: &Simulation, view: FieldView, destination: Destination) -> Result<()> {
    if view == FieldView::None {
        return Ok(());
    }

    let layers = query::flow_fields(simulation.world())
        .layers(destination)
        .context("flow fields were not built; the scenario configures no grid")?;

    if matches!(view, FieldView::Integration | FieldView::Both) {
        println!("integration field toward {}:", destination.label());
        print!("{}", render::integration(layers));
    }
    if matches!(view, FieldView::Flow | FieldView::Both) {
        println!("flow field toward {}:", destination.label());
        print!("{}", render::flow(layers));
    }

    Ok(())
}
