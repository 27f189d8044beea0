use core::fmt;
use core::str::FromStr;

use alloc::string::ToString;

use crate::error::{FlockError, FlockResult};

/// Distance from a wall at which the boundary rule starts pushing agents back.
pub const BOUNDARY_MARGIN: f32 = 10.0;

/// Fixed multiplier on the boundary force so wall avoidance dominates the
/// behavioral rules.
pub const BOUNDARY_WEIGHT: f32 = 2.0;

/// Agents slower than this have no meaningful heading.
pub const MIN_HEADING_SPEED: f32 = 0.01;

/// Parameters of a flock simulation. Immutable once a simulation is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlockConfig {
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

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            agent_count: 50,
            world_size: 100.0,
            max_speed: 2.0,
            max_force: 0.1,
            separation_radius: 3.0,
            alignment_radius: 10.0,
            cohesion_radius: 10.0,
            separation_weight: 1.5,
            alignment_weight: 1.0,
            cohesion_weight: 1.0,
        }
    }
}

impl FlockConfig {
    pub fn with_agent_count(mut self, agent_count: usize) -> Self {
        self.agent_count = agent_count;
        self
    }

    pub fn with_world_size(mut self, world_size: f32) -> Self {
        self.world_size = world_size;
        self
    }

    pub fn with_max_speed(mut self, max_speed: f32) -> Self {
        self.max_speed = max_speed;
        self
    }

    pub fn with_max_force(mut self, max_force: f32) -> Self {
        self.max_force = max_force;
        self
    }

    pub fn with_radii(mut self, separation: f32, alignment: f32, cohesion: f32) -> Self {
        self.separation_radius = separation;
        self.alignment_radius = alignment;
        self.cohesion_radius = cohesion;
        self
    }

    pub fn with_weights(mut self, separation: f32, alignment: f32, cohesion: f32) -> Self {
        self.separation_weight = separation;
        self.alignment_weight = alignment;
        self.cohesion_weight = cohesion;
        self
    }

    /// Checks every precondition a simulation relies on.
    pub fn validate(&self) -> FlockResult<()> {
        if self.agent_count == 0 {
            return Err(FlockError::InvalidParameter {
                name: "agent_count",
                value: 0.0,
                reason: "must be at least 1",
            });
        }

        let positive = [
            ("world_size", self.world_size),
            ("max_speed", self.max_speed),
            ("max_force", self.max_force),
            ("separation_radius", self.separation_radius),
            ("alignment_radius", self.alignment_radius),
            ("cohesion_radius", self.cohesion_radius),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(FlockError::InvalidParameter {
                    name,
                    value,
                    reason: "must be finite and strictly positive",
                });
            }
        }

        let weights = [
            ("separation_weight", self.separation_weight),
            ("alignment_weight", self.alignment_weight),
            ("cohesion_weight", self.cohesion_weight),
        ];
        for (name, value) in weights {
            if !(value.is_finite() && value >= 0.0) {
                return Err(FlockError::InvalidParameter {
                    name,
                    value,
                    reason: "must be finite and non-negative",
                });
            }
        }

        Ok(())
    }
}

/// Named weight combinations for the separation, alignment and cohesion rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BehaviorPreset {
    Default,
    HighCohesion,
    HighSeparation,
    HighAlignment,
}

impl BehaviorPreset {
    pub const ALL: [BehaviorPreset; 4] = [
        BehaviorPreset::Default,
        BehaviorPreset::HighCohesion,
        BehaviorPreset::HighSeparation,
        BehaviorPreset::HighAlignment,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BehaviorPreset::Default => "default",
            BehaviorPreset::HighCohesion => "high-cohesion",
            BehaviorPreset::HighSeparation => "high-separation",
            BehaviorPreset::HighAlignment => "high-alignment",
        }
    }

    /// `(separation, alignment, cohesion)` weights.
    pub fn weights(&self) -> (f32, f32, f32) {
        match self {
            BehaviorPreset::Default => (1.5, 1.0, 1.0),
            BehaviorPreset::HighCohesion => (1.5, 1.0, 2.25),
            BehaviorPreset::HighSeparation => (3.5, 1.0, 1.0),
            BehaviorPreset::HighAlignment => (2.0, 3.0, 1.0),
        }
    }

    pub fn apply(&self, config: FlockConfig) -> FlockConfig {
        let (separation, alignment, cohesion) = self.weights();
        config.with_weights(separation, alignment, cohesion)
    }
}

impl fmt::Display for BehaviorPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BehaviorPreset {
    type Err = FlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        BehaviorPreset::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| FlockError::UnknownPreset(wanted.to_string()))
    }
}
