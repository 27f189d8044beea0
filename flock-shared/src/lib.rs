#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use flock_core::{BehaviorPreset, FlockConfig, FlockSimulation, Vector};
use serde::{Deserialize, Serialize};

/// Simulation parameters as they travel over the wire. Missing fields take
/// the defaults of [`FlockConfig`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FlockSettings {
    pub agent_count: usize,
    pub world_size: f32,
    pub max_speed: f32,
    pub max_force: f32,
    pub separation_radius: f32,
    pub alignment_radius: f32,
    pub cohesion_radius: f32,
    pub separation_weight: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
}

impl Default for FlockSettings {
    fn default() -> Self {
        FlockConfig::default().into()
    }
}

impl From<FlockConfig> for FlockSettings {
    fn from(config: FlockConfig) -> Self {
        Self {
            agent_count: config.agent_count,
            world_size: config.world_size,
            max_speed: config.max_speed,
            max_force: config.max_force,
            separation_radius: config.separation_radius,
            alignment_radius: config.alignment_radius,
            cohesion_radius: config.cohesion_radius,
            separation_weight: config.separation_weight,
            alignment_weight: config.alignment_weight,
            cohesion_weight: config.cohesion_weight,
        }
    }
}

impl From<FlockSettings> for FlockConfig {
    fn from(settings: FlockSettings) -> Self {
        Self {
            agent_count: settings.agent_count,
            world_size: settings.world_size,
            max_speed: settings.max_speed,
            max_force: settings.max_force,
            separation_radius: settings.separation_radius,
            alignment_radius: settings.alignment_radius,
            cohesion_radius: settings.cohesion_radius,
            separation_weight: settings.separation_weight,
            alignment_weight: settings.alignment_weight,
            cohesion_weight: settings.cohesion_weight,
        }
    }
}

#[cfg(feature = "std")]
impl FlockSettings {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// A named run of the simulation with fixed rule weights.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhaseSpec {
    pub name: String,
    pub separation_weight: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
    pub steps: usize,
}

impl PhaseSpec {
    pub fn from_preset(preset: BehaviorPreset, steps: usize) -> Self {
        let (separation_weight, alignment_weight, cohesion_weight) = preset.weights();
        Self {
            name: preset.name().to_string(),
            separation_weight,
            alignment_weight,
            cohesion_weight,
            steps,
        }
    }

    /// A phase that keeps the weights already in `config`.
    pub fn from_config(name: &str, config: &FlockConfig, steps: usize) -> Self {
        Self {
            name: name.to_string(),
            separation_weight: config.separation_weight,
            alignment_weight: config.alignment_weight,
            cohesion_weight: config.cohesion_weight,
            steps,
        }
    }

    pub fn weights(&self) -> (f32, f32, f32) {
        (
            self.separation_weight,
            self.alignment_weight,
            self.cohesion_weight,
        )
    }

    /// `config` with this phase's weights swapped in.
    pub fn apply(&self, config: FlockConfig) -> FlockConfig {
        config.with_weights(
            self.separation_weight,
            self.alignment_weight,
            self.cohesion_weight,
        )
    }
}

/// One agent's state in simulation coordinates. Both vectors have one
/// entry per dimension.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentState {
    pub position: Vec<f32>,
    pub velocity: Vec<f32>,
}

impl AgentState {
    pub fn new<const D: usize>(position: Vector<D>, velocity: Vector<D>) -> Self {
        Self {
            position: position.to_array().to_vec(),
            velocity: velocity.to_array().to_vec(),
        }
    }
}

/// Everything a renderer needs to draw one tick.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrameSnapshot {
    pub phase: String,
    pub tick: u64,
    pub world_size: f32,
    pub dimensions: usize,
    pub agents: Vec<AgentState>,
}

impl FrameSnapshot {
    pub fn capture<const D: usize>(phase: &str, flock: &FlockSimulation<D>) -> Self {
        let agents = flock
            .positions()
            .iter()
            .zip(flock.velocities())
            .map(|(position, velocity)| AgentState::new(*position, *velocity))
            .collect();

        Self {
            phase: phase.to_string(),
            tick: flock.tick(),
            world_size: flock.world_size(),
            dimensions: D,
            agents,
        }
    }

    /// Serializes to a single line of JSON, without the trailing newline.
    #[cfg(feature = "std")]
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    #[cfg(feature = "std")]
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flock_core::{Flock2D, Flock3D, Vector2D};

    #[test]
    fn test_settings_match_default_config() {
        let config: FlockConfig = FlockSettings::default().into();
        assert_eq!(config, FlockConfig::default());
    }

    #[test]
    fn test_partial_settings_json_uses_defaults() {
        let settings = FlockSettings::from_json(r#"{ "agent_count": 12, "max_speed": 1.0 }"#).unwrap();
        assert_eq!(settings.agent_count, 12);
        assert_eq!(settings.max_speed, 1.0);
        assert_eq!(settings.world_size, 100.0);
        assert_eq!(settings.separation_radius, 3.0);
    }

    #[test]
    fn test_settings_json_rejects_wrong_types() {
        assert!(FlockSettings::from_json(r#"{ "agent_count": "many" }"#).is_err());
    }

    #[test]
    fn test_phase_from_preset() {
        let phase = PhaseSpec::from_preset(BehaviorPreset::HighAlignment, 120);
        assert_eq!(phase.name, "high-alignment");
        assert_eq!(phase.steps, 120);

        let config = phase.apply(FlockConfig::default());
        assert_eq!(config.separation_weight, 2.0);
        assert_eq!(config.alignment_weight, 3.0);
        assert_eq!(config.cohesion_weight, 1.0);
    }

    #[test]
    fn test_phase_from_config_keeps_weights() {
        let config = FlockConfig::default().with_weights(0.0, 0.5, 4.0);
        let phase = PhaseSpec::from_config("custom", &config, 30);

        assert_eq!(phase.name, "custom");
        assert_eq!(phase.weights(), (0.0, 0.5, 4.0));
        assert_eq!(phase.apply(config), config);
    }

    #[test]
    fn test_capture_2d_frame() {
        let config = FlockConfig::default().with_agent_count(1);
        let flock = Flock2D::from_state(
            config,
            vec![Vector2D::new(12.0, 34.0)],
            vec![Vector2D::new(1.0, -1.0)],
        )
        .unwrap();

        let frame = FrameSnapshot::capture("default", &flock);
        assert_eq!(frame.phase, "default");
        assert_eq!(frame.tick, 0);
        assert_eq!(frame.dimensions, 2);
        assert_eq!(frame.world_size, 100.0);
        assert_eq!(
            frame.agents,
            vec![AgentState {
                position: vec![12.0, 34.0],
                velocity: vec![1.0, -1.0],
            }]
        );
    }

    #[test]
    fn test_frame_json_line_is_single_line() {
        let mut flock = Flock3D::with_seed(FlockConfig::default().with_agent_count(5), 4).unwrap();
        flock.step();

        let frame = FrameSnapshot::capture("high-cohesion", &flock);
        let line = frame.to_json_line().unwrap();
        assert!(!line.contains('\n'));

        let parsed = FrameSnapshot::from_json(&line).unwrap();
        assert_eq!(parsed.tick, 1);
        assert_eq!(parsed.agents.len(), 5);
        assert!(parsed.agents.iter().all(|a| a.position.len() == 3));
    }
}
