//! Configuration types for the simulation.

use crate::float::Float;
use crate::vec::Vec2;

/// Standard gravity in m/s^2.
pub const STANDARD_GRAVITY: f64 = 9.80665;

/// World parameters shared by every particle and link in a simulation.
///
/// # Builder Pattern
/// ```
/// use evosim_physics::config::SimulationConfig;
/// use evosim_physics::vec::Vec2;
///
/// let config: SimulationConfig<f32> = SimulationConfig::new()
///     .with_gravity(Vec2::new(0.0, -9.81))
///     .with_ground_level(-1.0)
///     .with_collision_slop(0.01)
///     .with_collision_baumgarte(0.8)
///     .with_solve_iterations(8);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig<F: Float> {
    /// Acceleration applied to every particle. Default: `(0, -9.80665)`.
    pub gravity: Vec2<F>,
    /// Height of the ground line. Default: 0.
    pub ground_level: F,
    /// Penetration tolerated before a particle is pushed out. Default: 0.
    pub collision_slop: F,
    /// Fraction of the penetration removed per relaxation pass, in [0, 1].
    /// Default: 1.
    pub collision_baumgarte: F,
    /// Relaxation passes per step when none is given explicitly. Default: 5.
    pub solve_iterations: usize,
}

impl<F: Float> SimulationConfig<F> {
    /// Create a new config with default values.
    pub fn new() -> Self {
        SimulationConfig {
            gravity: Vec2::new(F::zero(), -F::from_f64(STANDARD_GRAVITY)),
            ground_level: F::zero(),
            collision_slop: F::zero(),
            collision_baumgarte: F::one(),
            solve_iterations: 5,
        }
    }

    /// Set the global acceleration.
    pub fn with_gravity(mut self, gravity: Vec2<F>) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_ground_level(mut self, ground_level: F) -> Self {
        self.ground_level = ground_level;
        self
    }

    pub fn with_collision_slop(mut self, slop: F) -> Self {
        self.collision_slop = slop;
        self
    }

    /// Set the collision correction factor, clamped to [0, 1].
    pub fn with_collision_baumgarte(mut self, baumgarte: F) -> Self {
        self.collision_baumgarte = baumgarte.clamp(F::zero(), F::one());
        self
    }

    /// Set the default number of relaxation passes.
    pub fn with_solve_iterations(mut self, iterations: usize) -> Self {
        self.solve_iterations = iterations;
        self
    }
}

impl<F: Float> Default for SimulationConfig<F> {
    fn default() -> Self {
        Self::new()
    }
}
