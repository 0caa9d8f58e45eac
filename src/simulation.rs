//! Fixed-step simulation of particles, oscillating links and a ground plane.

use alloc::vec::Vec;

use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::float::Float;
use crate::link::{LinkId, ParticleLink};
use crate::observer::{NoOpStepObserver, StepObserver};
use crate::particle::{Particle, ParticleId};
use crate::vec::Vec2;

/// Owns a set of particles and the links between them and advances them in
/// fixed steps.
///
/// Particles and links live in insertion-ordered slots addressed by
/// [`ParticleId`] and [`LinkId`]. Removed slots stay empty and are never
/// reused, so handles never alias and iteration order (which is also the
/// relaxation order) is stable.
///
/// Because slots are not recycled, storage grows with every add and a long
/// add/remove churn leaves dead slots behind. Counts and iteration walk those
/// slots too, so a simulation is best built once per evaluated body.
///
/// A simulation shares no state with any other instance; separate instances
/// can be stepped on separate threads.
#[derive(Clone, Debug)]
pub struct Simulation<F: Float> {
    pub config: SimulationConfig<F>,
    particles: Vec<Option<Particle<F>>>,
    links: Vec<Option<ParticleLink<F>>>,
}

impl<F: Float> Simulation<F> {
    pub fn new() -> Self {
        Self::with_config(SimulationConfig::new())
    }

    pub fn with_config(config: SimulationConfig<F>) -> Self {
        Simulation {
            config,
            particles: Vec::with_capacity(10),
            links: Vec::with_capacity(20),
        }
    }

    /// Take ownership of a particle and return its handle.
    pub fn add_particle(&mut self, particle: Particle<F>) -> ParticleId {
        let id = ParticleId(self.particles.len());
        self.particles.push(Some(particle));
        id
    }

    /// Take ownership of a link.
    ///
    /// Both endpoints must be live particles of this simulation. The link's
    /// oscillator is seeded from the current distance between them.
    pub fn add_link(&mut self, mut link: ParticleLink<F>) -> Result<LinkId, SimulationError> {
        let distance = self.endpoint_distance(&link)?;
        link.init_oscillator(distance);

        let id = LinkId(self.links.len());
        self.links.push(Some(link));
        Ok(id)
    }

    /// Remove a particle and every link attached to it.
    ///
    /// Returns the particle and the cascaded links, in link order, or `None`
    /// if the handle is not live.
    pub fn remove_particle(&mut self, id: ParticleId) -> Option<(Particle<F>, Vec<ParticleLink<F>>)> {
        let particle = self.particles.get_mut(id.0)?.take()?;
        let mut removed = Vec::new();
        for slot in self.links.iter_mut() {
            if slot.as_ref().is_some_and(|l| l.connects(id)) {
                removed.extend(slot.take());
            }
        }
        Some((particle, removed))
    }

    /// Remove a single link. Its particles stay in the simulation.
    pub fn remove_link(&mut self, id: LinkId) -> Option<ParticleLink<F>> {
        self.links.get_mut(id.0)?.take()
    }

    /// Move every particle to the origin at rest and re-seed every oscillator.
    pub fn reset(&mut self) {
        for p in self.particles.iter_mut().flatten() {
            p.reset();
        }
        for link in self.links.iter_mut().flatten() {
            let (a, b) = link.particles();
            let distance = distance_between(&self.particles, a, b).unwrap_or_else(F::zero);
            link.init_oscillator(distance);
        }
    }

    /// Advance by `dt` seconds with `config.solve_iterations` relaxation passes.
    pub fn step(&mut self, dt: F) {
        let iterations = self.config.solve_iterations;
        self.step_observed(dt, iterations, &mut NoOpStepObserver);
    }

    /// Advance by `dt` seconds with an explicit number of relaxation passes.
    pub fn step_with_iterations(&mut self, dt: F, solve_iterations: usize) {
        self.step_observed(dt, solve_iterations, &mut NoOpStepObserver);
    }

    /// Advance by `dt` seconds, reporting each phase to `observer`.
    ///
    /// Phases run in a fixed order: integrate, advance oscillators, relax
    /// links and ground contacts `solve_iterations` times, apply friction,
    /// then re-anchor link angles on the resulting geometry.
    pub fn step_observed<O: StepObserver>(&mut self, dt: F, solve_iterations: usize, observer: &mut O) {
        self.integrate(dt);
        observer.on_integrate();

        self.advance_oscillators(dt);
        observer.on_oscillators_advanced();

        for i in 0..solve_iterations {
            self.solve_links();
            self.solve_collisions();
            observer.on_relax_iteration(i);
        }

        self.apply_friction();
        observer.on_friction();

        self.sync_link_angles();
        observer.on_step_complete();
    }

    fn integrate(&mut self, dt: F) {
        let dt_sq = dt * dt;
        let gravity = self.config.gravity;
        for p in self.particles.iter_mut().flatten() {
            p.integrate(gravity, dt_sq);
        }
    }

    fn advance_oscillators(&mut self, dt: F) {
        for link in self.links.iter_mut().flatten() {
            link.advance_oscillator(dt);
        }
    }

    /// One Gauss-Seidel pass: later links see the corrections of earlier ones.
    fn solve_links(&mut self) {
        for link in self.links.iter().flatten() {
            let (a, b) = link.particles();
            if let Some((first, second)) = pair_mut(&mut self.particles, a.0, b.0) {
                link.solve(first, second);
            }
        }
    }

    fn solve_collisions(&mut self) {
        let SimulationConfig { ground_level, collision_slop, collision_baumgarte, .. } = self.config;
        for p in self.particles.iter_mut().flatten() {
            p.solve_ground(ground_level, collision_slop, collision_baumgarte);
        }
    }

    fn apply_friction(&mut self) {
        for p in self.particles.iter_mut().flatten() {
            p.apply_friction();
        }
    }

    fn sync_link_angles(&mut self) {
        for link in self.links.iter_mut().flatten() {
            let (a, b) = link.particles();
            if let Some(distance) = distance_between(&self.particles, a, b) {
                link.sync_angle(distance);
            }
        }
    }

    fn endpoint_distance(&self, link: &ParticleLink<F>) -> Result<F, SimulationError> {
        let (a, b) = link.particles();
        let pa = self.particle(a).ok_or(SimulationError::UnknownParticle { id: a })?;
        let pb = self.particle(b).ok_or(SimulationError::UnknownParticle { id: b })?;
        Ok(pa.position().distance(pb.position()))
    }

    pub fn particle(&self, id: ParticleId) -> Option<&Particle<F>> {
        self.particles.get(id.0)?.as_ref()
    }

    /// Mutable access for placing particles. Ground contact stays read-only.
    pub fn particle_mut(&mut self, id: ParticleId) -> Option<&mut Particle<F>> {
        self.particles.get_mut(id.0)?.as_mut()
    }

    pub fn link(&self, id: LinkId) -> Option<&ParticleLink<F>> {
        self.links.get(id.0)?.as_ref()
    }

    pub fn contains_particle(&self, id: ParticleId) -> bool {
        self.particle(id).is_some()
    }

    pub fn contains_link(&self, id: LinkId) -> bool {
        self.link(id).is_some()
    }

    /// Live particles in insertion order.
    pub fn particles(&self) -> impl Iterator<Item = (ParticleId, &Particle<F>)> + '_ {
        self.particles
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|p| (ParticleId(i), p)))
    }

    /// Live links in insertion order.
    pub fn links(&self) -> impl Iterator<Item = (LinkId, &ParticleLink<F>)> + '_ {
        self.links
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|l| (LinkId(i), l)))
    }

    /// Handles of the live particles in insertion order.
    pub fn particle_ids(&self) -> impl Iterator<Item = ParticleId> + '_ {
        self.particles().map(|(id, _)| id)
    }

    pub fn particle_count(&self) -> usize {
        self.particles.iter().flatten().count()
    }

    pub fn link_count(&self) -> usize {
        self.links.iter().flatten().count()
    }

    /// Positions of the live particles in insertion order.
    pub fn positions(&self) -> Vec<Vec2<F>> {
        self.particles().map(|(_, p)| p.position()).collect()
    }
}

impl<F: Float> Default for Simulation<F> {
    fn default() -> Self {
        Self::new()
    }
}

fn distance_between<F: Float>(particles: &[Option<Particle<F>>], a: ParticleId, b: ParticleId) -> Option<F> {
    let pa = particles.get(a.0)?.as_ref()?;
    let pb = particles.get(b.0)?.as_ref()?;
    Some(pa.position().distance(pb.position()))
}

/// Disjoint mutable borrows of two distinct slots, in argument order.
fn pair_mut<F: Float>(
    particles: &mut [Option<Particle<F>>],
    a: usize,
    b: usize,
) -> Option<(&mut Particle<F>, &mut Particle<F>)> {
    if a < b {
        let (lo, hi) = particles.split_at_mut(b);
        Some((lo.get_mut(a)?.as_mut()?, hi.first_mut()?.as_mut()?))
    } else if b < a {
        let (lo, hi) = particles.split_at_mut(a);
        let second = lo.get_mut(b)?.as_mut()?;
        let first = hi.first_mut()?.as_mut()?;
        Some((first, second))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weightless() -> Simulation<f32> {
        Simulation::with_config(SimulationConfig::new().with_gravity(Vec2::zero()))
    }

    #[test]
    fn solve_links_halves_error_for_equal_masses() {
        let mut sim = weightless();
        let a = sim.add_particle(Particle::new(0.0).at(Vec2::new(0.0, 10.0)));
        let b = sim.add_particle(Particle::new(0.0).at(Vec2::new(3.0, 10.0)));
        sim.add_link(ParticleLink::new(a, b, 2.0, 0.0, 0.0).unwrap()).unwrap();

        sim.solve_links();
        assert!((sim.particle(a).unwrap().position().x - 0.5).abs() < 1e-6);
        assert!((sim.particle(b).unwrap().position().x - 2.5).abs() < 1e-6);
    }

    #[test]
    fn gauss_seidel_order_matters() {
        // a - b - c chain, both links stretched: the second link sees the
        // first link's correction of b within the same pass.
        let mut sim = weightless();
        let a = sim.add_particle(Particle::new(0.0).at(Vec2::new(0.0, 10.0)));
        let b = sim.add_particle(Particle::new(0.0).at(Vec2::new(2.0, 10.0)));
        let c = sim.add_particle(Particle::new(0.0).at(Vec2::new(4.0, 10.0)));
        sim.add_link(ParticleLink::new(a, b, 1.0, 0.0, 0.0).unwrap()).unwrap();
        sim.add_link(ParticleLink::new(b, c, 1.0, 0.0, 0.0).unwrap()).unwrap();

        sim.solve_links();
        // link ab: error 1, a -> 0.5, b -> 1.5
        // link bc: distance 2.5, error 1.5, b -> 2.25, c -> 3.25
        let xs: Vec<f32> = sim.positions().iter().map(|p| p.x).collect();
        assert!((xs[0] - 0.5).abs() < 1e-6);
        assert!((xs[1] - 2.25).abs() < 1e-6);
        assert!((xs[2] - 3.25).abs() < 1e-6);
    }

    #[test]
    fn collision_pass_lifts_and_flags() {
        let mut sim = weightless();
        let id = sim.add_particle(Particle::new(0.0).at(Vec2::new(0.0, -1.0)));
        sim.solve_collisions();
        let p = sim.particle(id).unwrap();
        assert_eq!(p.position().y, 0.0);
        assert!(p.is_touching_ground());
    }

    #[test]
    fn pair_mut_rejects_same_index() {
        let mut slots = vec![Some(Particle::new(0.0f32)), Some(Particle::new(0.0f32))];
        assert!(pair_mut(&mut slots, 1, 1).is_none());
        let (first, second) = pair_mut(&mut slots, 1, 0).unwrap();
        first.set_position(Vec2::new(1.0, 0.0));
        second.set_position(Vec2::new(0.0, 1.0));
        assert_eq!(slots[1].as_ref().unwrap().position(), Vec2::new(1.0, 0.0));
        assert_eq!(slots[0].as_ref().unwrap().position(), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn simulation_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Simulation<f32>>();
        assert_send_sync::<Simulation<f64>>();
    }
}
