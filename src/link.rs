//! Oscillating length constraints ("muscles") between two particles.
//!
//! A link pulls its endpoints towards a target length that swings around the
//! rest length. The swing is driven by a bounded angle that travels back and
//! forth between `-pi/2` and `pi/2`; the target length is
//! `rest_length * (1 + contraction * sin(angle))`.

use crate::error::SimulationError;
use crate::float::Float;
use crate::particle::{Particle, ParticleId};
use crate::vec::Vec2;

/// Stable handle to a link owned by a [`Simulation`](crate::Simulation).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinkId(pub(crate) usize);

impl LinkId {
    /// Insertion index of the link within its simulation.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Direction the oscillator angle is travelling in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Angle increasing, link lengthening.
    Rising,
    /// Angle decreasing, link shortening.
    Falling,
}

impl Phase {
    fn sign<F: Float>(self) -> F {
        match self {
            Phase::Rising => F::one(),
            Phase::Falling => -F::one(),
        }
    }
}

/// A distance constraint with an oscillating target length.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleLink<F: Float> {
    a: ParticleId,
    b: ParticleId,
    pub rest_length: F,
    pub contraction_coefficient: F,
    /// Oscillations per second.
    pub frequency: F,
    target_angle: F,
    phase: Phase,
    target_oscillation_scale: F,
}

impl<F: Float> ParticleLink<F> {
    /// Link two distinct particles.
    ///
    /// Oscillator state stays neutral until the link is added to a simulation,
    /// which measures the real distance between the endpoints.
    pub fn new(
        a: ParticleId,
        b: ParticleId,
        rest_length: F,
        frequency: F,
        contraction_coefficient: F,
    ) -> Result<Self, SimulationError> {
        if a == b {
            return Err(SimulationError::SelfLink { id: a });
        }
        Ok(ParticleLink {
            a,
            b,
            rest_length,
            contraction_coefficient,
            frequency,
            target_angle: F::zero(),
            phase: Phase::Rising,
            target_oscillation_scale: F::zero(),
        })
    }

    /// Unit rest length, one oscillation per second, 20% contraction.
    pub fn with_defaults(a: ParticleId, b: ParticleId) -> Result<Self, SimulationError> {
        Self::new(a, b, F::one(), F::one(), F::from_f32(0.2))
    }

    pub fn particles(&self) -> (ParticleId, ParticleId) { (self.a, self.b) }
    pub fn target_angle(&self) -> F { self.target_angle }
    pub fn phase(&self) -> Phase { self.phase }
    pub fn target_oscillation_scale(&self) -> F { self.target_oscillation_scale }

    pub fn connects(&self, id: ParticleId) -> bool {
        self.a == id || self.b == id
    }

    /// Length the link currently pulls towards.
    pub fn target_length(&self) -> F {
        let max_oscillation = self.contraction_coefficient * self.rest_length;
        self.rest_length + self.target_oscillation_scale * max_oscillation
    }

    /// `asin` of the normalized stretch, or `None` when the stretch is
    /// undefined (zero rest length or zero contraction).
    fn angle_for_distance(&self, distance: F) -> Option<F> {
        let diff = (distance - self.rest_length) / (self.rest_length * self.contraction_coefficient);
        if diff.is_finite() {
            Some(diff.clamp(-F::one(), F::one()).asin())
        } else {
            None
        }
    }

    /// Seed angle and phase from the measured endpoint distance.
    pub(crate) fn init_oscillator(&mut self, distance: F) {
        match self.angle_for_distance(distance) {
            Some(angle) => {
                self.target_angle = angle;
                self.phase = if angle <= F::zero() { Phase::Rising } else { Phase::Falling };
            }
            None => {
                self.target_angle = F::zero();
                self.phase = Phase::Rising;
            }
        }
        self.target_oscillation_scale = self.target_angle.sin();
    }

    /// Re-anchor the angle on the realized distance. Phase is kept.
    pub(crate) fn sync_angle(&mut self, distance: F) {
        self.target_angle = self.angle_for_distance(distance).unwrap_or_else(F::zero);
    }

    /// Move the angle along its phase and reflect it at `±pi/2`.
    pub(crate) fn advance_oscillator(&mut self, dt: F) {
        let two_pi = F::two() * F::pi();
        let bound = F::frac_pi_2();

        let mut angle = self.target_angle + self.phase.sign::<F>() * self.frequency * dt * two_pi;
        if !angle.is_finite() {
            angle = F::zero();
        } else if angle.abs() > two_pi {
            // the reflected motion repeats every 2pi of unfolded travel
            angle = angle.fmod(two_pi);
        }

        // A single advance larger than half a swing folds more than once.
        loop {
            if angle <= -bound {
                let overshoot = -angle - bound;
                angle = -bound + overshoot;
                self.phase = Phase::Rising;
                if angle <= bound {
                    break;
                }
            } else if angle >= bound {
                let overshoot = angle - bound;
                angle = bound - overshoot;
                self.phase = Phase::Falling;
                if angle >= -bound {
                    break;
                }
            } else {
                break;
            }
        }

        self.target_angle = angle;
        self.target_oscillation_scale = angle.sin();
    }

    /// Positional Gauss-Seidel correction of both endpoints, weighted by
    /// inverse mass. Coincident endpoints are pushed apart along +x.
    pub(crate) fn solve(&self, first: &mut Particle<F>, second: &mut Particle<F>) {
        let diff = first.position() - second.position();
        let cur_length = diff.length();
        let mut normal = Vec2::new(diff.x / cur_length, diff.y / cur_length);
        if cur_length.is_near_zero(F::from_f32(1e-10)) || !normal.is_finite() {
            normal = Vec2::unit_x();
        }

        let error = cur_length - self.target_length();

        let inv_m1 = F::one() / first.mass();
        let inv_m2 = F::one() / second.mass();
        let inv_m = F::one() / (inv_m1 + inv_m2);

        let p1 = first.position_mut();
        *p1 = *p1 - normal.scale(inv_m1 * inv_m * error);
        let p2 = second.position_mut();
        *p2 = *p2 + normal.scale(inv_m2 * inv_m * error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::FRAC_PI_2;

    fn link(rest: f32, freq: f32, contraction: f32) -> ParticleLink<f32> {
        ParticleLink::new(ParticleId(0), ParticleId(1), rest, freq, contraction).unwrap()
    }

    #[test]
    fn self_link_rejected() {
        let err = ParticleLink::<f32>::new(ParticleId(3), ParticleId(3), 1.0, 1.0, 0.2).unwrap_err();
        assert_eq!(err, SimulationError::SelfLink { id: ParticleId(3) });
    }

    #[test]
    fn init_from_stretched_distance() {
        let mut l = link(2.0, 1.0, 0.5);
        // diff = (2.5 - 2) / 1 = 0.5
        l.init_oscillator(2.5);
        assert!((l.target_angle() - libm::asinf(0.5)).abs() < 1e-6);
        assert_eq!(l.phase(), Phase::Falling);
    }

    #[test]
    fn init_from_compressed_distance_clamps() {
        let mut l = link(2.0, 1.0, 0.5);
        l.init_oscillator(0.0);
        assert!((l.target_angle() + FRAC_PI_2).abs() < 1e-6);
        assert_eq!(l.phase(), Phase::Rising);
    }

    #[test]
    fn init_with_zero_contraction_falls_back() {
        let mut l = link(2.0, 1.0, 0.0);
        l.init_oscillator(0.0);
        assert_eq!(l.target_angle(), 0.0);
        assert_eq!(l.phase(), Phase::Rising);
        assert_eq!(l.target_oscillation_scale(), 0.0);
    }

    #[test]
    fn advance_reflects_at_upper_bound() {
        let mut l = link(1.0, 10.0, 0.2);
        l.init_oscillator(1.0);
        // 10 Hz * 0.02 s * 2pi ~= 1.2566 rad, then again past pi/2.
        l.advance_oscillator(0.02);
        assert_eq!(l.phase(), Phase::Rising);
        l.advance_oscillator(0.02);
        assert_eq!(l.phase(), Phase::Falling);
        assert!(l.target_angle() <= FRAC_PI_2);
        assert!(l.target_angle() >= -FRAC_PI_2);
    }

    #[test]
    fn advance_reflects_at_lower_bound() {
        let mut l = link(1.0, 10.0, 0.2);
        l.init_oscillator(1.0);
        // 0 -> 1.2566 -> reflect to 0.6283 -> -0.6283 -> reflect to -1.2566
        l.advance_oscillator(0.02);
        l.advance_oscillator(0.02);
        assert_eq!(l.phase(), Phase::Falling);
        l.advance_oscillator(0.02);
        assert_eq!(l.phase(), Phase::Falling);
        assert!(l.target_angle() < 0.0);
        l.advance_oscillator(0.02);
        assert_eq!(l.phase(), Phase::Rising);
        assert!(l.target_angle() > -FRAC_PI_2);
        assert!((l.target_angle() + 0.4 * core::f32::consts::PI).abs() < 1e-5);
    }

    #[test]
    fn advance_landing_exactly_on_bound_flips_phase() {
        // 0.25 Hz over one second is exactly a quarter turn.
        let mut l = ParticleLink::new(ParticleId(0), ParticleId(1), 1.0f64, 0.25, 0.2).unwrap();
        l.init_oscillator(1.0);
        l.advance_oscillator(1.0);
        assert_eq!(l.target_angle(), core::f64::consts::FRAC_PI_2);
        assert_eq!(l.phase(), Phase::Falling);

        l.advance_oscillator(1.0);
        assert_eq!(l.target_angle(), 0.0);
        assert_eq!(l.phase(), Phase::Falling);

        l.advance_oscillator(1.0);
        assert_eq!(l.target_angle(), -core::f64::consts::FRAC_PI_2);
        assert_eq!(l.phase(), Phase::Rising);
    }

    #[test]
    fn advance_folds_huge_steps_into_range() {
        let mut l = link(1.0, 1000.0, 0.2);
        l.init_oscillator(1.0);
        for _ in 0..50 {
            l.advance_oscillator(0.02);
            assert!(l.target_angle() <= FRAC_PI_2 && l.target_angle() >= -FRAC_PI_2);
            assert!(l.target_oscillation_scale().is_finite());
        }
    }

    #[test]
    fn sync_keeps_phase() {
        let mut l = link(2.0, 1.0, 0.5);
        l.init_oscillator(2.5);
        assert_eq!(l.phase(), Phase::Falling);
        l.sync_angle(1.5);
        assert!((l.target_angle() + libm::asinf(0.5)).abs() < 1e-6);
        assert_eq!(l.phase(), Phase::Falling);
    }

    #[test]
    fn solve_splits_error_by_inverse_mass() {
        let l = link(2.0, 0.0, 0.0);
        let mut a = Particle::new(0.0f32).at(Vec2::new(0.0, 0.0));
        let mut b = Particle::new(0.0f32).at(Vec2::new(3.0, 0.0)).with_mass(3.0).unwrap();
        l.solve(&mut a, &mut b);
        // inv masses 1 and 1/3, error 1: a moves 0.75, b moves 0.25
        assert!((a.position().x - 0.75).abs() < 1e-6);
        assert!((b.position().x - 2.75).abs() < 1e-6);
    }

    #[test]
    fn solve_coincident_endpoints_uses_x_axis() {
        let l = link(2.0, 0.0, 0.0);
        let mut a = Particle::new(0.0f32);
        let mut b = Particle::new(0.0f32);
        l.solve(&mut a, &mut b);
        assert!(a.position().is_finite() && b.position().is_finite());
        assert!((a.position().x - 1.0).abs() < 1e-6);
        assert!((b.position().x + 1.0).abs() < 1e-6);
        assert!((a.position().distance(b.position()) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn solve_subnormal_separation_uses_x_axis() {
        // the squared length is subnormal, so the divided normal is finite
        // but far from unit length
        let l = link(2.0, 0.0, 0.0);
        let mut a = Particle::new(0.0f32).at(Vec2::new(3e-23, 0.0));
        let mut b = Particle::new(0.0f32);
        l.solve(&mut a, &mut b);
        assert!((a.position().x - 1.0).abs() < 1e-6);
        assert!((b.position().x + 1.0).abs() < 1e-6);
        assert_eq!(a.position().y, 0.0);
    }
}
