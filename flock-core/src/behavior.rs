//! Steering rules.
//!
//! Every rule reduces to the same primitive: pick a desired direction, ask
//! for it at full speed, and request the bounded change from the current
//! velocity ([`steer`]). The rules only differ in how they pick the direction.

use crate::config::{FlockConfig, BOUNDARY_MARGIN, BOUNDARY_WEIGHT};
use crate::vector::Vector;

/// Turns a desired heading into a steering force: normalize, scale to
/// `max_speed`, subtract the current velocity and clamp to `max_force`.
///
/// A near-zero `desired` produces no force at all.
pub fn steer<const D: usize>(
    desired: Vector<D>,
    velocity: Vector<D>,
    max_speed: f32,
    max_force: f32,
) -> Vector<D> {
    match desired.try_normalize() {
        Some(direction) => (direction * max_speed - velocity).limit(max_force),
        None => Vector::zero(),
    }
}

/// Aggregates gathered in one scan over the flock for a single agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighborhood<const D: usize> {
    /// Sum of `(self - other) / distance²` over the separation set.
    pub repulsion: Vector<D>,
    pub separation_count: usize,
    pub velocity_sum: Vector<D>,
    pub alignment_count: usize,
    pub position_sum: Vector<D>,
    pub cohesion_count: usize,
}

impl<const D: usize> Neighborhood<D> {
    /// Scans every other agent once. Agents at distance zero (the agent
    /// itself, or anything stacked on top of it) belong to no set.
    pub fn survey(
        index: usize,
        positions: &[Vector<D>],
        velocities: &[Vector<D>],
        config: &FlockConfig,
    ) -> Self {
        let position = positions[index];
        let mut neighborhood = Self {
            repulsion: Vector::zero(),
            separation_count: 0,
            velocity_sum: Vector::zero(),
            alignment_count: 0,
            position_sum: Vector::zero(),
            cohesion_count: 0,
        };

        for (other_position, other_velocity) in positions.iter().zip(velocities.iter()) {
            let offset = position - *other_position;
            let distance = offset.magnitude();
            if distance <= 0.0 {
                continue;
            }

            if distance < config.separation_radius {
                neighborhood.repulsion += offset / (distance * distance);
                neighborhood.separation_count += 1;
            }
            if distance < config.alignment_radius {
                neighborhood.velocity_sum += *other_velocity;
                neighborhood.alignment_count += 1;
            }
            if distance < config.cohesion_radius {
                neighborhood.position_sum += *other_position;
                neighborhood.cohesion_count += 1;
            }
        }

        neighborhood
    }

    pub fn separation(&self, velocity: Vector<D>, config: &FlockConfig) -> Vector<D> {
        if self.separation_count == 0 {
            return Vector::zero();
        }
        steer(self.repulsion, velocity, config.max_speed, config.max_force)
    }

    pub fn alignment(&self, velocity: Vector<D>, config: &FlockConfig) -> Vector<D> {
        if self.alignment_count == 0 {
            return Vector::zero();
        }
        let mean_velocity = self.velocity_sum / self.alignment_count as f32;
        steer(mean_velocity, velocity, config.max_speed, config.max_force)
    }

    pub fn cohesion(
        &self,
        position: Vector<D>,
        velocity: Vector<D>,
        config: &FlockConfig,
    ) -> Vector<D> {
        if self.cohesion_count == 0 {
            return Vector::zero();
        }
        let centroid = self.position_sum / self.cohesion_count as f32;
        steer(centroid - position, velocity, config.max_speed, config.max_force)
    }
}

/// Pushes an agent back toward the interior when it is inside the margin
/// band of any wall. The push per axis is a flat `max_speed`, not scaled by
/// how deep into the band the agent is. The lower wall wins when an agent
/// is in both bands at once.
pub fn boundary<const D: usize>(
    position: Vector<D>,
    velocity: Vector<D>,
    config: &FlockConfig,
) -> Vector<D> {
    let mut push = Vector::<D>::zero();
    for axis in 0..D {
        if position[axis] < BOUNDARY_MARGIN {
            push[axis] = config.max_speed;
        } else if position[axis] > config.world_size - BOUNDARY_MARGIN {
            push[axis] = -config.max_speed;
        }
    }

    if push.is_zero() {
        return Vector::zero();
    }
    steer(push, velocity, config.max_speed, config.max_force)
}

/// The four rule outputs for one agent, before weighting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringForces<const D: usize> {
    pub separation: Vector<D>,
    pub alignment: Vector<D>,
    pub cohesion: Vector<D>,
    pub boundary: Vector<D>,
}

impl<const D: usize> SteeringForces<D> {
    /// Computes every rule for agent `index` against a read-only snapshot.
    pub fn compute(
        index: usize,
        positions: &[Vector<D>],
        velocities: &[Vector<D>],
        config: &FlockConfig,
    ) -> Self {
        let position = positions[index];
        let velocity = velocities[index];
        let neighborhood = Neighborhood::survey(index, positions, velocities, config);

        Self {
            separation: neighborhood.separation(velocity, config),
            alignment: neighborhood.alignment(velocity, config),
            cohesion: neighborhood.cohesion(position, velocity, config),
            boundary: boundary(position, velocity, config),
        }
    }

    /// Weighted blend used as the agent's acceleration.
    pub fn total(&self, config: &FlockConfig) -> Vector<D> {
        self.separation * config.separation_weight
            + self.alignment * config.alignment_weight
            + self.cohesion * config.cohesion_weight
            + self.boundary * BOUNDARY_WEIGHT
    }
}
