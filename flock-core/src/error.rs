use alloc::string::String;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlockError {
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f32,
        reason: &'static str,
    },

    #[error("expected {expected} agents, got {positions} positions and {velocities} velocities")]
    AgentCountMismatch {
        expected: usize,
        positions: usize,
        velocities: usize,
    },

    #[error("unknown behavior preset `{0}`")]
    UnknownPreset(String),
}

pub type FlockResult<T> = Result<T, FlockError>;
