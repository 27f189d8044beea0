use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use flock_cli::{load_settings, plan_phases, run, ConfigOverrides, PhaseChoice, RunOptions};
use flock_core::FlockConfig;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless flocking simulation streaming JSON frames", long_about = None)]
struct Args {
    /// Number of spatial dimensions (2 or 3)
    #[arg(short, long, default_value_t = 2)]
    dimensions: usize,

    /// Number of agents (overrides the settings file)
    #[arg(short = 'n', long)]
    agents: Option<usize>,

    /// Edge length of the world box (overrides the settings file)
    #[arg(long)]
    world_size: Option<f32>,

    /// Speed cap (overrides the settings file)
    #[arg(long)]
    max_speed: Option<f32>,

    /// Per-rule steering force cap (overrides the settings file)
    #[arg(long)]
    max_force: Option<f32>,

    /// Steps to run per phase
    #[arg(short, long, default_value_t = 300)]
    steps: usize,

    /// Seed for reproducible runs; OS entropy when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Behavior phase to run, repeatable: default, high-cohesion, high-separation,
    /// high-alignment, or custom for the weights from --settings
    #[arg(short, long = "phase")]
    phases: Vec<PhaseChoice>,

    /// JSON file with simulation parameters
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Write frames here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.debug {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    let base: FlockConfig = match &args.settings {
        Some(path) => {
            log::info!("Loading settings from {}", path.display());
            load_settings(path)?.into()
        }
        None => FlockConfig::default(),
    };

    let overrides = ConfigOverrides {
        agent_count: args.agents,
        world_size: args.world_size,
        max_speed: args.max_speed,
        max_force: args.max_force,
    };

    let config = overrides.apply(base);
    let options = RunOptions {
        dimensions: args.dimensions,
        config,
        phases: plan_phases(&args.phases, &config, args.steps),
        seed: args.seed,
    };

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let summary = run(&options, &mut out).context("Simulation run failed")?;
    log::info!(
        "Finished {} phases, {} frames written",
        summary.phases,
        summary.frames
    );

    Ok(())
}
