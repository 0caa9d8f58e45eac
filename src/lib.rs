//! Deterministic 2D particle physics for evolving walking bodies.
//!
//! `evosim-physics` simulates small articulated bodies: point masses joined by
//! links whose target length oscillates like a muscle, under gravity, against a
//! single ground line with friction. It is built to be the inner loop of an
//! optimizer that scores bodies by how they move.
//!
//! # Features
//!
//! - **Verlet integration**: implicit velocity from current and previous position
//! - **Oscillating links**: bounded reflecting oscillator per link, re-anchored on
//!   the realized geometry after every step
//! - **Gauss-Seidel relaxation**: sequential positional link solving, weighted by
//!   inverse mass
//! - **Ground contact**: slop and Baumgarte-style penetration correction, friction
//! - **Stable handles**: particles and links addressed by ids, never by reference
//! - **Observable**: monitor step phases via the `StepObserver` trait
//! - **Parallel evaluation**: batches of bodies on `rayon` (`parallel` feature)
//! - **`no_std` core**: everything but the harness builds without `std`
//!
//! # Example
//!
//! ```
//! use evosim_physics::{Particle, ParticleLink, Simulation, Vec2};
//!
//! let mut sim: Simulation<f32> = Simulation::new();
//! let a = sim.add_particle(Particle::new(0.8).at(Vec2::new(0.0, 1.0)));
//! let b = sim.add_particle(Particle::new(0.8).at(Vec2::new(1.0, 1.0)));
//! sim.add_link(ParticleLink::new(a, b, 1.0, 1.5, 0.4).unwrap()).unwrap();
//!
//! for _ in 0..50 {
//!     sim.step(0.02);
//! }
//! assert!(sim.particle(a).unwrap().position().y >= 0.0);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod float;
pub mod vec;
pub mod particle;
pub mod link;
pub mod simulation;
pub mod body;
pub mod observer;
pub mod config;
pub mod error;
#[cfg(feature = "std")]
pub mod harness;

// Re-export primary API
pub use float::Float;
pub use vec::Vec2;
pub use particle::{Particle, ParticleId};
pub use link::{LinkId, ParticleLink, Phase};
pub use simulation::Simulation;
pub use body::{Body, BodyPlan, Connection};
pub use config::{SimulationConfig, STANDARD_GRAVITY};
pub use observer::{StepObserver, NoOpStepObserver};
pub use error::SimulationError;
