use alloc::vec::Vec;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::behavior::SteeringForces;
use crate::config::{FlockConfig, MIN_HEADING_SPEED};
use crate::error::{FlockError, FlockResult};
use crate::vector::{sqrt, Vector, EPSILON};

/// A flock of agents in a `[0, world_size]^D` box.
///
/// Positions and velocities are only ever written by [`FlockSimulation::step`];
/// everything else is a read-only view for whoever draws the flock.
#[derive(Debug, Clone)]
pub struct FlockSimulation<const D: usize> {
    config: FlockConfig,
    positions: Vec<Vector<D>>,
    velocities: Vec<Vector<D>>,
    accelerations: Vec<Vector<D>>,
    tick: u64,
}

pub type Flock2D = FlockSimulation<2>;
pub type Flock3D = FlockSimulation<3>;

impl<const D: usize> FlockSimulation<D> {
    /// Builds a flock with uniformly random positions and headings, every
    /// agent starting at `max_speed`.
    pub fn new<R: Rng + ?Sized>(config: FlockConfig, rng: &mut R) -> FlockResult<Self> {
        config.validate()?;

        let mut positions = Vec::with_capacity(config.agent_count);
        let mut velocities = Vec::with_capacity(config.agent_count);
        for _ in 0..config.agent_count {
            positions.push(Vector(core::array::from_fn(|_| {
                rng.gen_range(0.0..=config.world_size)
            })));
            velocities.push(random_direction(rng) * config.max_speed);
        }

        log::debug!(
            "Created {}D flock with {} agents in a world of size {}",
            D,
            config.agent_count,
            config.world_size
        );

        Ok(Self::assemble(config, positions, velocities))
    }

    /// Same as [`FlockSimulation::new`] with a deterministic generator, so two
    /// flocks built from the same seed follow identical trajectories.
    pub fn with_seed(config: FlockConfig, seed: u64) -> FlockResult<Self> {
        log::debug!("Seeding flock with {}", seed);
        let mut rng = SmallRng::seed_from_u64(seed);
        Self::new(config, &mut rng)
    }

    #[cfg(feature = "std")]
    pub fn from_entropy(config: FlockConfig) -> FlockResult<Self> {
        log::debug!("Seeding flock from OS entropy");
        let mut rng = SmallRng::from_entropy();
        Self::new(config, &mut rng)
    }

    /// Places agents explicitly. Positions outside the world are clamped
    /// into it and velocities above `max_speed` are capped. Any NaN or
    /// infinite component is rejected.
    pub fn from_state(
        config: FlockConfig,
        positions: Vec<Vector<D>>,
        velocities: Vec<Vector<D>>,
    ) -> FlockResult<Self> {
        config.validate()?;
        if positions.len() != config.agent_count || velocities.len() != config.agent_count {
            return Err(FlockError::AgentCountMismatch {
                expected: config.agent_count,
                positions: positions.len(),
                velocities: velocities.len(),
            });
        }
        reject_non_finite("positions", &positions)?;
        reject_non_finite("velocities", &velocities)?;

        let positions = positions
            .into_iter()
            .map(|p| p.clamp(0.0, config.world_size))
            .collect();
        let velocities = velocities
            .into_iter()
            .map(|v| v.limit(config.max_speed))
            .collect();

        Ok(Self::assemble(config, positions, velocities))
    }

    fn assemble(config: FlockConfig, positions: Vec<Vector<D>>, velocities: Vec<Vector<D>>) -> Self {
        Self {
            accelerations: alloc::vec![Vector::zero(); positions.len()],
            config,
            positions,
            velocities,
            tick: 0,
        }
    }

    /// Advances every agent by one tick.
    ///
    /// All accelerations are computed from the pre-step snapshot before any
    /// agent moves, so the result does not depend on iteration order.
    pub fn step(&mut self) {
        let config = self.config;

        for (index, acceleration) in self.accelerations.iter_mut().enumerate() {
            *acceleration =
                SteeringForces::compute(index, &self.positions, &self.velocities, &config)
                    .total(&config);
        }

        for ((position, velocity), acceleration) in self
            .positions
            .iter_mut()
            .zip(self.velocities.iter_mut())
            .zip(self.accelerations.iter())
        {
            *velocity = (*velocity + *acceleration).limit(config.max_speed);
            *position = (*position + *velocity).clamp(0.0, config.world_size);
        }

        self.tick += 1;
        log::trace!("Flock advanced to tick {}", self.tick);
    }

    pub fn step_n(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.step();
        }
    }

    /// Per-rule forces agent `index` would receive from the current state.
    pub fn forces_of(&self, index: usize) -> Option<SteeringForces<D>> {
        if index >= self.positions.len() {
            return None;
        }
        Some(SteeringForces::compute(
            index,
            &self.positions,
            &self.velocities,
            &self.config,
        ))
    }

    pub fn position_of(&self, index: usize) -> Option<Vector<D>> {
        self.positions.get(index).copied()
    }

    pub fn velocity_of(&self, index: usize) -> Option<Vector<D>> {
        self.velocities.get(index).copied()
    }

    /// Unit heading of agent `index`, or `None` when it is too slow for the
    /// direction to be meaningful.
    pub fn direction_of(&self, index: usize) -> Option<Vector<D>> {
        let velocity = self.velocities.get(index)?;
        let speed = velocity.magnitude();
        if speed > MIN_HEADING_SPEED {
            Some(*velocity / speed)
        } else {
            None
        }
    }

    pub fn positions(&self) -> &[Vector<D>] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Vector<D>] {
        &self.velocities
    }

    pub fn agent_count(&self) -> usize {
        self.positions.len()
    }

    pub fn world_size(&self) -> f32 {
        self.config.world_size
    }

    pub fn config(&self) -> &FlockConfig {
        &self.config
    }

    /// Number of completed steps.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub const fn dimensions(&self) -> usize {
        D
    }
}

impl FlockSimulation<2> {
    /// Heading of agent `index` in radians from the positive x axis.
    pub fn heading_angle(&self, index: usize) -> Option<f32> {
        self.direction_of(index).map(|direction| direction.angle())
    }
}

fn reject_non_finite<const D: usize>(name: &'static str, vectors: &[Vector<D>]) -> FlockResult<()> {
    let bad = vectors
        .iter()
        .flat_map(|v| v.0.iter())
        .find(|c| !c.is_finite());
    match bad {
        Some(value) => Err(FlockError::InvalidParameter {
            name,
            value: *value,
            reason: "every component must be finite",
        }),
        None => Ok(()),
    }
}

/// Uniformly distributed unit vector. Samples the cube `[-1, 1]^D`, keeps
/// only points inside the unit ball and redraws degenerate near-zero ones.
fn random_direction<const D: usize, R: Rng + ?Sized>(rng: &mut R) -> Vector<D> {
    loop {
        let candidate = Vector::<D>(core::array::from_fn(|_| rng.gen_range(-1.0f32..=1.0)));
        let length_squared = candidate.magnitude_squared();
        if length_squared > EPSILON && length_squared <= 1.0 {
            return candidate / sqrt(length_squared);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::Vector2D;

    fn small_config() -> FlockConfig {
        FlockConfig::default().with_agent_count(20).with_world_size(60.0)
    }

    #[test]
    fn test_flock_creation() {
        let flock = Flock2D::with_seed(small_config(), 7).unwrap();
        assert_eq!(flock.agent_count(), 20);
        assert_eq!(flock.positions().len(), 20);
        assert_eq!(flock.velocities().len(), 20);
        assert_eq!(flock.world_size(), 60.0);
        assert_eq!(flock.tick(), 0);
        assert_eq!(flock.dimensions(), 2);
    }

    #[test]
    fn test_initial_state_within_world_at_full_speed() {
        let flock = Flock3D::with_seed(small_config(), 11).unwrap();
        for (position, velocity) in flock.positions().iter().zip(flock.velocities()) {
            assert!(position.0.iter().all(|c| (0.0..=60.0).contains(c)));
            assert!((velocity.magnitude() - 2.0).abs() < 0.0001);
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = Flock2D::with_seed(small_config().with_max_force(0.0), 1);
        assert!(matches!(
            result,
            Err(FlockError::InvalidParameter { name: "max_force", .. })
        ));
    }

    #[test]
    fn test_from_state_length_mismatch() {
        let config = small_config().with_agent_count(2);
        let result = Flock2D::from_state(config, vec![Vector2D::zero(); 2], vec![Vector2D::zero()]);
        assert_eq!(
            result.unwrap_err(),
            FlockError::AgentCountMismatch {
                expected: 2,
                positions: 2,
                velocities: 1,
            }
        );
    }

    #[test]
    fn test_from_state_rejects_non_finite() {
        let config = small_config().with_agent_count(2);

        let result = Flock2D::from_state(
            config,
            vec![Vector2D::new(f32::NAN, 50.0), Vector2D::new(40.0, 40.0)],
            vec![Vector2D::new(1.0, 0.0); 2],
        );
        assert!(matches!(
            result,
            Err(FlockError::InvalidParameter { name: "positions", .. })
        ));

        let result = Flock2D::from_state(
            config,
            vec![Vector2D::new(20.0, 50.0), Vector2D::new(40.0, 40.0)],
            vec![Vector2D::new(f32::INFINITY, 0.0), Vector2D::new(1.0, 0.0)],
        );
        assert!(matches!(
            result,
            Err(FlockError::InvalidParameter { name: "velocities", .. })
        ));
    }

    #[test]
    fn test_huge_speed_cap_is_not_zeroed() {
        let config = small_config().with_max_speed(1e20).with_world_size(1e30);
        let mut flock = Flock2D::with_seed(config, 13).unwrap();

        flock.step();

        for velocity in flock.velocities() {
            let speed = velocity.magnitude();
            assert!(speed.is_finite());
            assert!(speed > 0.5e20, "speed collapsed to {speed}");
            assert!(speed <= 1e20 * 1.0001);
        }
    }

    #[test]
    fn test_from_state_clamps_and_caps() {
        let config = small_config().with_agent_count(1);
        let flock = Flock2D::from_state(
            config,
            vec![Vector2D::new(-5.0, 80.0)],
            vec![Vector2D::new(30.0, 40.0)],
        )
        .unwrap();

        assert_eq!(flock.position_of(0), Some(Vector2D::new(0.0, 60.0)));
        let velocity = flock.velocity_of(0).unwrap();
        assert!((velocity.magnitude() - 2.0).abs() < 0.0001);
    }

    #[test]
    fn test_flock_update() {
        let mut flock = Flock2D::with_seed(small_config(), 3).unwrap();
        let initial_positions = flock.positions().to_vec();

        flock.step();

        assert_eq!(flock.tick(), 1);
        assert!(flock
            .positions()
            .iter()
            .zip(initial_positions.iter())
            .any(|(now, before)| now != before));
    }

    #[test]
    fn test_accessors_out_of_range() {
        let flock = Flock2D::with_seed(small_config(), 5).unwrap();
        assert_eq!(flock.position_of(20), None);
        assert_eq!(flock.velocity_of(20), None);
        assert_eq!(flock.direction_of(20), None);
        assert!(flock.forces_of(20).is_none());
    }

    #[test]
    fn test_direction_needs_minimum_speed() {
        let config = small_config().with_agent_count(2);
        let flock = Flock2D::from_state(
            config,
            vec![Vector2D::new(30.0, 30.0), Vector2D::new(40.0, 40.0)],
            vec![Vector2D::new(0.005, 0.0), Vector2D::new(0.0, -1.5)],
        )
        .unwrap();

        assert_eq!(flock.direction_of(0), None);
        assert_eq!(flock.heading_angle(0), None);
        assert_eq!(flock.direction_of(1), Some(Vector2D::new(0.0, -1.0)));
        let angle = flock.heading_angle(1).unwrap();
        assert!((angle + core::f32::consts::FRAC_PI_2).abs() < 0.0001);
    }

    #[test]
    fn test_step_matches_forces_of() {
        let mut flock = Flock2D::with_seed(small_config(), 21).unwrap();
        let config = *flock.config();
        let expected: Vec<_> = (0..flock.agent_count())
            .map(|i| {
                let force = flock.forces_of(i).unwrap().total(&config);
                let velocity = (flock.velocity_of(i).unwrap() + force).limit(config.max_speed);
                (flock.position_of(i).unwrap() + velocity).clamp(0.0, config.world_size)
            })
            .collect();

        flock.step();

        assert_eq!(flock.positions(), expected.as_slice());
    }

    #[test]
    fn test_random_direction_is_unit_length() {
        let mut rng = SmallRng::seed_from_u64(99);
        for _ in 0..100 {
            let direction: Vector<3> = random_direction(&mut rng);
            assert!((direction.magnitude() - 1.0).abs() < 0.0001);
        }
    }
}
