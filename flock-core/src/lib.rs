//! Flocking ("boids") kernel for 2D and 3D worlds.
//!
//! A [`FlockSimulation`] owns the positions and velocities of a fixed number
//! of agents and advances them with [`FlockSimulation::step`]. Each step runs
//! separation, alignment, cohesion and boundary avoidance against a brute
//! force all-pairs scan, then integrates velocities and positions.
//!
//! ```
//! use flock_core::{Flock2D, FlockConfig};
//!
//! let mut flock = Flock2D::with_seed(FlockConfig::default(), 42).unwrap();
//! flock.step();
//! assert_eq!(flock.agent_count(), 50);
//! ```
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod behavior;
pub mod config;
pub mod error;
pub mod flock;
pub mod vector;

pub use behavior::SteeringForces;
pub use config::{BehaviorPreset, FlockConfig, BOUNDARY_MARGIN, BOUNDARY_WEIGHT, MIN_HEADING_SPEED};
pub use error::{FlockError, FlockResult};
pub use flock::{Flock2D, Flock3D, FlockSimulation};
pub use vector::{Vector, Vector2D, Vector3D, EPSILON};
