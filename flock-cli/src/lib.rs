use std::fs;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use flock_core::{BehaviorPreset, FlockConfig, FlockError, FlockSimulation};
use flock_shared::{FlockSettings, FrameSnapshot, PhaseSpec};

pub const CUSTOM_PHASE: &str = "custom";

/// A phase requested on the command line: one of the presets, or `custom`
/// to run with the weights of the loaded configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseChoice {
    Custom,
    Preset(BehaviorPreset),
}

impl FromStr for PhaseChoice {
    type Err = FlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(CUSTOM_PHASE) {
            Ok(PhaseChoice::Custom)
        } else {
            s.parse().map(PhaseChoice::Preset)
        }
    }
}

fn default_weights() -> (f32, f32, f32) {
    let defaults = FlockConfig::default();
    (
        defaults.separation_weight,
        defaults.alignment_weight,
        defaults.cohesion_weight,
    )
}

/// Turns the requested phases into runnable ones.
///
/// With nothing requested, a config carrying its own weights runs as a
/// single `custom` phase; otherwise every preset runs in order.
pub fn plan_phases(requested: &[PhaseChoice], config: &FlockConfig, steps: usize) -> Vec<PhaseSpec> {
    let custom = PhaseSpec::from_config(CUSTOM_PHASE, config, steps);
    let has_own_weights = custom.weights() != default_weights();

    if requested.is_empty() {
        if has_own_weights {
            log::info!("Configured weights differ from the defaults; running a single custom phase");
            return vec![custom];
        }
        return BehaviorPreset::ALL
            .into_iter()
            .map(|preset| PhaseSpec::from_preset(preset, steps))
            .collect();
    }

    requested
        .iter()
        .map(|choice| match choice {
            PhaseChoice::Custom => custom.clone(),
            PhaseChoice::Preset(preset) => {
                let phase = PhaseSpec::from_preset(*preset, steps);
                if has_own_weights && phase.weights() != custom.weights() {
                    log::warn!(
                        "Phase '{}' replaces the configured weights {:?} with {:?}",
                        phase.name,
                        custom.weights(),
                        phase.weights()
                    );
                }
                phase
            }
        })
        .collect()
}

/// Command-line values that take precedence over the settings file.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigOverrides {
    pub agent_count: Option<usize>,
    pub world_size: Option<f32>,
    pub max_speed: Option<f32>,
    pub max_force: Option<f32>,
}

impl ConfigOverrides {
    pub fn apply(&self, mut config: FlockConfig) -> FlockConfig {
        if let Some(agent_count) = self.agent_count {
            config.agent_count = agent_count;
        }
        if let Some(world_size) = self.world_size {
            config.world_size = world_size;
        }
        if let Some(max_speed) = self.max_speed {
            config.max_speed = max_speed;
        }
        if let Some(max_force) = self.max_force {
            config.max_force = max_force;
        }
        config
    }
}

pub fn load_settings(path: &Path) -> Result<FlockSettings> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {}", path.display()))?;
    FlockSettings::from_json(&json)
        .with_context(|| format!("Invalid settings in {}", path.display()))
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub dimensions: usize,
    pub config: FlockConfig,
    pub phases: Vec<PhaseSpec>,
    /// Phase `k` is seeded with `seed + k`; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub phases: usize,
    pub frames: u64,
}

/// Runs every phase on a fresh flock and writes one JSON line per frame,
/// starting with the untouched initial state of each phase.
pub fn run<W: Write>(options: &RunOptions, out: &mut W) -> Result<RunSummary> {
    match options.dimensions {
        2 => run_phases::<2, W>(options, out),
        3 => run_phases::<3, W>(options, out),
        other => bail!("Unsupported dimension count {}; expected 2 or 3", other),
    }
}

fn run_phases<const D: usize, W: Write>(options: &RunOptions, out: &mut W) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    for (index, phase) in options.phases.iter().enumerate() {
        let config = phase.apply(options.config);
        let flock = match options.seed {
            Some(seed) => FlockSimulation::<D>::with_seed(config, seed.wrapping_add(index as u64)),
            None => FlockSimulation::<D>::from_entropy(config),
        }
        .with_context(|| format!("Failed to set up phase '{}'", phase.name))?;

        log::info!(
            "Phase '{}': {} agents in {}D, weights {:.2}/{:.2}/{:.2}, {} steps",
            phase.name,
            config.agent_count,
            D,
            config.separation_weight,
            config.alignment_weight,
            config.cohesion_weight,
            phase.steps
        );

        summary.frames += run_phase(flock, phase, out)?;
        summary.phases += 1;
    }

    out.flush().context("Failed to flush output")?;
    Ok(summary)
}

fn run_phase<const D: usize, W: Write>(
    mut flock: FlockSimulation<D>,
    phase: &PhaseSpec,
    out: &mut W,
) -> Result<u64> {
    let mut frames = 0;

    loop {
        let frame = FrameSnapshot::capture(&phase.name, &flock);
        let line = frame
            .to_json_line()
            .context("Failed to serialize frame")?;
        writeln!(out, "{}", line)
            .with_context(|| format!("Failed to write frame {} of phase '{}'", frame.tick, phase.name))?;
        log::debug!("Wrote frame {} of phase '{}'", frame.tick, phase.name);
        frames += 1;

        if flock.tick() >= phase.steps as u64 {
            break;
        }
        flock.step();
    }

    Ok(frames)
}
