//! Bodies assembled from a flat list of nodes and connections.
//!
//! A [`BodyPlan`] is what an optimizer mutates: per-node friction and
//! per-connection muscle parameters. Building it yields a [`Body`] that owns a
//! private [`Simulation`].

use alloc::vec::Vec;

use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::float::Float;
use crate::link::ParticleLink;
use crate::particle::{Particle, ParticleId};
use crate::simulation::Simulation;

/// A muscle between two nodes of a plan.
#[derive(Clone, Debug, PartialEq)]
pub struct Connection<F: Float> {
    pub from: usize,
    pub to: usize,
    pub rest_length: F,
    pub contraction: F,
    pub frequency: F,
}

/// Description of a body: node frictions plus connections between nodes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BodyPlan<F: Float> {
    pub nodes: Vec<F>,
    pub connections: Vec<Connection<F>>,
}

impl<F: Float> BodyPlan<F> {
    pub fn new() -> Self {
        BodyPlan { nodes: Vec::new(), connections: Vec::new() }
    }

    /// Append a node with the given friction and return its index.
    pub fn node(&mut self, friction: F) -> usize {
        self.nodes.push(friction);
        self.nodes.len() - 1
    }

    /// Append a connection between two existing nodes.
    pub fn connect(&mut self, from: usize, to: usize, rest_length: F, contraction: F, frequency: F) -> &mut Self {
        self.connections.push(Connection { from, to, rest_length, contraction, frequency });
        self
    }

    /// Build the simulation. All particles start at rest at the origin.
    pub fn build(&self, config: SimulationConfig<F>) -> Result<Body<F>, SimulationError> {
        let mut simulation = Simulation::with_config(config);
        let nodes: Vec<ParticleId> = self
            .nodes
            .iter()
            .map(|&friction| simulation.add_particle(Particle::new(friction)))
            .collect();

        let count = nodes.len();
        let lookup = |index: usize| {
            nodes
                .get(index)
                .copied()
                .ok_or(SimulationError::NodeOutOfBounds { index, count })
        };

        for c in &self.connections {
            let link = ParticleLink::new(lookup(c.from)?, lookup(c.to)?, c.rest_length, c.frequency, c.contraction)?;
            simulation.add_link(link)?;
        }

        Ok(Body { simulation, nodes })
    }
}

/// A built body: its simulation and the particle behind each plan node.
#[derive(Clone, Debug)]
pub struct Body<F: Float> {
    pub simulation: Simulation<F>,
    nodes: Vec<ParticleId>,
}

impl<F: Float> Body<F> {
    /// Particle handle of plan node `index`.
    pub fn node(&self, index: usize) -> Option<ParticleId> {
        self.nodes.get(index).copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Current x coordinate of plan node `index`.
    pub fn node_x(&self, index: usize) -> Option<F> {
        let id = self.node(index)?;
        Some(self.simulation.particle(id)?.position().x)
    }
}
