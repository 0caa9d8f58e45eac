//! Fixed-step evaluation of many bodies.
//!
//! Every body owns its own [`Simulation`](crate::Simulation), so a batch can be
//! advanced in parallel without any shared solver state. With the `parallel`
//! feature the batch is spread over the `rayon` thread pool.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::body::{Body, BodyPlan};
use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::float::Float;

/// Length of one simulation step in milliseconds.
pub const FIXED_TIMESTEP_MS: u32 = 20;

/// Number of fixed steps covering `seconds` of simulated time.
pub fn step_count(seconds: f64) -> usize {
    let steps = (seconds * 1000.0 / f64::from(FIXED_TIMESTEP_MS)).round();
    if steps.is_finite() && steps > 0.0 {
        steps as usize
    } else {
        0
    }
}

/// Build one body per plan, all sharing the same world parameters.
pub fn setup_simulations<F: Float>(
    plans: &[BodyPlan<F>],
    config: &SimulationConfig<F>,
) -> Result<Vec<Body<F>>, SimulationError> {
    ftlog::info!("Building {} bodies", plans.len());
    plans.iter().map(|plan| plan.build(config.clone())).collect()
}

/// Reset `body` to its canonical start and run it for `seconds`.
pub fn simulate<F: Float>(body: &mut Body<F>, seconds: f64) {
    let steps = step_count(seconds);
    let dt = F::from_f64(f64::from(FIXED_TIMESTEP_MS) / 1000.0);

    body.simulation.reset();
    for _ in 0..steps {
        body.simulation.step(dt);
    }
    ftlog::debug!(
        "Simulated body with {} nodes for {} steps",
        body.node_count(),
        steps
    );
}

/// Run every body for `seconds`, each from its canonical start.
pub fn simulate_all<F: Float>(bodies: &mut [Body<F>], seconds: f64) {
    ftlog::info!(
        "Simulating {} bodies for {} s ({} steps each)",
        bodies.len(),
        seconds,
        step_count(seconds)
    );

    #[cfg(feature = "parallel")]
    bodies.par_iter_mut().for_each(|body| simulate(body, seconds));

    #[cfg(not(feature = "parallel"))]
    bodies.iter_mut().for_each(|body| simulate(body, seconds));

    ftlog::info!("Finished simulating {} bodies", bodies.len());
}

/// Run every body and score it with `fitness`. Scores come back in body order.
pub fn evaluate_all<F, S>(bodies: &mut [Body<F>], seconds: f64, fitness: S) -> Vec<F>
where
    F: Float,
    S: Fn(&Body<F>) -> F + Sync,
{
    simulate_all(bodies, seconds);

    #[cfg(feature = "parallel")]
    let scores: Vec<F> = bodies.par_iter().map(|body| fitness(body)).collect();

    #[cfg(not(feature = "parallel"))]
    let scores: Vec<F> = bodies.iter().map(|body| fitness(body)).collect();

    for (i, score) in scores.iter().enumerate() {
        if !score.is_finite() {
            ftlog::warn!("Body {} produced a non-finite fitness {}", i, score);
        }
    }
    scores
}

/// Fitness that reads the final x of `node`. A body without that node
/// scores zero.
pub fn terminal_x<F: Float>(node: usize) -> impl Fn(&Body<F>) -> F + Sync {
    move |body| body.node_x(node).unwrap_or_else(F::zero)
}
