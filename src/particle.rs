//! Verlet point masses.

use crate::error::SimulationError;
use crate::float::Float;
use crate::vec::Vec2;

/// Stable handle to a particle owned by a [`Simulation`](crate::Simulation).
///
/// Handles are minted by the simulation on insertion and are never reused,
/// so a handle to a removed particle stays dead.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticleId(pub(crate) usize);

impl ParticleId {
    /// Insertion index of the particle within its simulation.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A Verlet particle. Velocity is implicit in `position - previous_position`.
///
/// The ground contact flag is only written by the simulation step; it is
/// recomputed every step and goes stale as soon as the particle is moved by
/// hand.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle<F: Float> {
    position: Vec2<F>,
    previous_position: Vec2<F>,
    radius: F,
    mass: F,
    friction: F,
    touching_ground: bool,
}

impl<F: Float> Particle<F> {
    /// A particle at the origin with zero radius and unit mass.
    pub fn new(friction: F) -> Self {
        debug_assert!(friction >= F::zero(), "friction must not be negative");
        Particle {
            position: Vec2::zero(),
            previous_position: Vec2::zero(),
            radius: F::zero(),
            mass: F::one(),
            friction,
            touching_ground: false,
        }
    }

    /// Place the particle at rest at `position`.
    pub fn at(mut self, position: Vec2<F>) -> Self {
        self.set_position(position);
        self
    }

    pub fn with_radius(mut self, radius: F) -> Self {
        debug_assert!(radius >= F::zero(), "radius must not be negative");
        self.radius = radius;
        self
    }

    /// Set the mass. Fails with [`SimulationError::InvalidMass`] unless the
    /// mass is positive and finite.
    pub fn with_mass(mut self, mass: F) -> Result<Self, SimulationError> {
        if !(mass > F::zero() && mass.is_finite()) {
            return Err(SimulationError::InvalidMass);
        }
        self.mass = mass;
        Ok(self)
    }

    /// Teleport to `value` and stop: both current and previous position are set,
    /// so the next integration starts from zero velocity.
    pub fn set_position(&mut self, value: Vec2<F>) {
        self.position = value;
        self.previous_position = value;
    }

    /// Teleport to `value` keeping the current implicit velocity.
    pub fn set_position_conservative(&mut self, value: Vec2<F>) {
        let dp = self.position - self.previous_position;
        self.position = value;
        self.previous_position = value - dp;
    }

    /// Add `delta` to the per-step displacement by moving the previous position.
    pub fn apply_impulse(&mut self, delta: Vec2<F>) {
        self.previous_position = self.previous_position - delta;
    }

    pub fn position(&self) -> Vec2<F> { self.position }
    pub fn previous_position(&self) -> Vec2<F> { self.previous_position }
    pub fn radius(&self) -> F { self.radius }
    pub fn mass(&self) -> F { self.mass }
    pub fn friction(&self) -> F { self.friction }

    /// Ground contact as of the last completed step.
    pub fn is_touching_ground(&self) -> bool { self.touching_ground }

    /// Displacement over the last step.
    pub fn displacement(&self) -> Vec2<F> {
        self.position - self.previous_position
    }

    /// Velocity estimate for a step of length `dt`.
    pub fn velocity(&self, dt: F) -> Vec2<F> {
        if dt.is_near_zero(F::from_f32(1e-30)) {
            return Vec2::zero();
        }
        self.displacement().scale(F::one() / dt)
    }

    /// Verlet step: `x' = 2x - x_prev + a*dt^2`. Clears ground contact.
    pub(crate) fn integrate(&mut self, acceleration: Vec2<F>, dt_sq: F) {
        let p0 = self.position;
        self.position = p0.scale(F::two()) - self.previous_position + acceleration.scale(dt_sq);
        self.previous_position = p0;
        self.touching_ground = false;
    }

    /// Push the particle out of the ground plane. Returns true on contact.
    pub(crate) fn solve_ground(&mut self, ground_level: F, slop: F, baumgarte: F) -> bool {
        let depth = ground_level - (self.position.y - self.radius);
        if depth >= slop {
            self.position.y = self.position.y + baumgarte * (depth - slop);
            self.touching_ground = true;
            true
        } else {
            false
        }
    }

    /// Damp tangential motion of a grounded particle.
    ///
    /// The damping is applied to the position itself, not to the implicit
    /// velocity, so a grounded particle slides `(1 - friction)` times as far
    /// each step.
    pub(crate) fn apply_friction(&mut self) {
        if self.touching_ground {
            let vt = self.position.x - self.previous_position.x;
            self.position.x = self.position.x - vt * self.friction;
        }
    }

    pub(crate) fn reset(&mut self) {
        self.set_position(Vec2::zero());
        self.touching_ground = false;
    }

    pub(crate) fn position_mut(&mut self) -> &mut Vec2<F> {
        &mut self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_position_zeroes_velocity() {
        let mut p = Particle::new(0.5f32);
        p.apply_impulse(Vec2::new(1.0, 2.0));
        p.set_position(Vec2::new(3.0, 4.0));
        assert_eq!(p.position(), Vec2::new(3.0, 4.0));
        assert_eq!(p.previous_position(), Vec2::new(3.0, 4.0));
        assert_eq!(p.displacement(), Vec2::zero());
    }

    #[test]
    fn conservative_teleport_keeps_velocity() {
        let mut p = Particle::new(0.0f64).at(Vec2::new(1.0, 1.0));
        p.apply_impulse(Vec2::new(0.25, -0.5));
        p.set_position_conservative(Vec2::new(10.0, 20.0));
        assert_eq!(p.position(), Vec2::new(10.0, 20.0));
        assert_eq!(p.displacement(), Vec2::new(0.25, -0.5));
    }

    #[test]
    fn integrate_uses_previous_position() {
        let mut p = Particle::new(0.0f32);
        p.apply_impulse(Vec2::new(1.0, 0.0));
        p.integrate(Vec2::zero(), 0.0);
        assert_eq!(p.position(), Vec2::new(1.0, 0.0));
        assert_eq!(p.previous_position(), Vec2::zero());
    }

    #[test]
    fn ground_solve_respects_slop() {
        let mut p = Particle::new(0.0f32).at(Vec2::new(0.0, -0.05));
        assert!(!p.solve_ground(0.0, 0.1, 1.0));
        assert_eq!(p.position().y, -0.05);
        assert!(p.solve_ground(0.0, 0.0, 1.0));
        assert_eq!(p.position().y, 0.0);
        assert!(p.is_touching_ground());
    }

    #[test]
    fn radius_lifts_contact_point() {
        let mut p = Particle::new(0.0f32).with_radius(0.5).at(Vec2::new(0.0, 0.25));
        assert!(p.solve_ground(0.0, 0.0, 1.0));
        assert!((p.position().y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn with_mass_rejects_degenerate_values() {
        for mass in [0.0f32, -1.0, f32::NAN, f32::INFINITY] {
            assert_eq!(Particle::new(0.0f32).with_mass(mass).unwrap_err(), SimulationError::InvalidMass);
        }
        let p = Particle::new(0.0f32).with_mass(2.5).unwrap();
        assert_eq!(p.mass(), 2.5);
    }

    #[test]
    fn velocity_zero_dt() {
        let mut p = Particle::new(0.0f32);
        p.apply_impulse(Vec2::new(1.0, 0.0));
        assert_eq!(p.velocity(0.0), Vec2::zero());
        assert_eq!(p.velocity(0.5), Vec2::new(2.0, 0.0));
    }
}
