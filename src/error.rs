//! Error types for simulation setup.
//!
//! These are caller contract violations. Numerical trouble inside a step
//! (coincident particles, rounding outside the arcsine domain) is recovered
//! in place and never shows up here.

use core::fmt;

use crate::particle::ParticleId;

/// Errors raised when building or editing a simulation.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// A link was given the same particle for both endpoints.
    SelfLink { id: ParticleId },
    /// The particle is not (or no longer) part of this simulation.
    UnknownParticle { id: ParticleId },
    /// Mass must be positive and finite.
    InvalidMass,
    /// A body plan refers to a node it does not have.
    NodeOutOfBounds { index: usize, count: usize },
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::SelfLink { id } => {
                write!(f, "cannot link particle {} with itself", id.index())
            }
            SimulationError::UnknownParticle { id } => {
                write!(f, "particle {} is not in the simulation", id.index())
            }
            SimulationError::InvalidMass => write!(f, "mass must be positive and finite"),
            SimulationError::NodeOutOfBounds { index, count } => {
                write!(f, "node index {} out of bounds (count: {})", index, count)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SimulationError {}
