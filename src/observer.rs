//! Step observer trait for monitoring simulation progress.

/// Trait for observing simulation steps.
///
/// Hooks fire in step order. All methods have default no-op implementations.
pub trait StepObserver {
    /// Called after all particles have been integrated (Verlet step).
    fn on_integrate(&mut self) {}

    /// Called after every link oscillator has been advanced.
    fn on_oscillators_advanced(&mut self) {}

    /// Called after each link + ground relaxation pass.
    fn on_relax_iteration(&mut self, _iteration: usize) {}

    /// Called after ground friction has been applied.
    fn on_friction(&mut self) {}

    /// Called when a simulation step is fully complete.
    fn on_step_complete(&mut self) {}
}

/// A no-op observer that does nothing. Use as default when no observation needed.
pub struct NoOpStepObserver;

impl StepObserver for NoOpStepObserver {}
