//! Entry point for rendering and input collaborators

use crate::config::SimulationConfig;
use crate::error::Result;
use crate::motion::{MotionController, MotionSettings, RunReport, RunState};
use crate::physics::{Field, Scalar, SharedField, Snapshot};
use std::sync::Arc;
use tracing::debug;

/// A field plus the controller that settles it.
///
/// Input code calls [`inject_impulse`](Self::inject_impulse) with an already
/// resolved node index; rendering code calls [`snapshot`](Self::snapshot) as
/// often as it likes from any thread.
pub struct Simulation {
    field: SharedField,
    controller: MotionController,
}

impl Simulation {
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        let field = config.field.build()?;
        let settings = config.motion.settings();
        Self::from_parts(field, settings)
    }

    pub fn from_parts(field: Field, settings: MotionSettings) -> Result<Self> {
        Ok(Self {
            field: field.into_shared(),
            controller: MotionController::new(settings)?,
        })
    }

    /// Kick node `index` and make sure a run is settling the field.
    ///
    /// Returns `true` if this call started a new run, `false` if the impulse
    /// was layered onto the active one. On `OutOfRange` neither the field nor
    /// the run state changes.
    pub fn inject_impulse(&self, index: usize, magnitude: Scalar) -> Result<bool> {
        let mut field = self.field.lock();
        field.apply_impulse(index, magnitude)?;
        debug!(index, magnitude, tick = field.ticks(), "impulse applied");

        // Still holding the field: a run cannot finish between the impulse
        // and the running check
        Ok(self.controller.start(&self.field))
    }

    pub fn snapshot(&self) -> Snapshot {
        self.field.lock().snapshot()
    }

    pub fn len(&self) -> usize {
        self.field.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.field.lock().is_empty()
    }

    pub fn center_index(&self) -> usize {
        self.field.lock().center_index()
    }

    pub fn is_running(&self) -> bool {
        self.controller.is_running()
    }

    pub fn state(&self) -> RunState {
        self.controller.state()
    }

    pub fn controller(&self) -> &MotionController {
        &self.controller
    }

    /// Handle for readers that outlive a borrow of the simulation.
    pub fn field(&self) -> SharedField {
        Arc::clone(&self.field)
    }

    /// Block until the active run converges, times out or is stopped.
    pub fn wait(&self) -> Option<RunReport> {
        self.controller.wait()
    }

    /// Cancel the active run, if any, and wait for its thread to exit.
    pub fn stop(&self) -> Option<RunReport> {
        self.controller.stop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimulationError;
    use crate::motion::Termination;
    use crate::physics::{FieldLayout, FieldParameters};
    use std::time::Duration;

    fn simulation(max_ms: u64) -> Simulation {
        let field = Field::new(
            FieldLayout {
                width: 20,
                sample_interval: 2,
            },
            FieldParameters::default(),
        )
        .unwrap();
        Simulation::from_parts(
            field,
            MotionSettings {
                tick_interval: Duration::from_millis(1),
                max_duration: Duration::from_millis(max_ms),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_from_default_config() {
        let simulation = Simulation::new(&SimulationConfig::default()).unwrap();
        assert_eq!(simulation.len(), 400);
        assert_eq!(simulation.center_index(), 200);
        assert_eq!(simulation.state(), RunState::Idle);
    }

    #[test]
    fn test_out_of_range_does_not_start_a_run() {
        let simulation = simulation(50);

        assert_eq!(
            simulation.inject_impulse(10, 200.0),
            Err(SimulationError::OutOfRange { index: 10, len: 10 })
        );
        assert_eq!(simulation.state(), RunState::Idle);
        assert_eq!(simulation.controller().runs_started(), 0);
        assert!(simulation.snapshot().is_flat());
    }

    #[test]
    fn test_impulse_starts_a_run() {
        let simulation = simulation(20);

        assert_eq!(simulation.inject_impulse(4, 200.0), Ok(true));
        let report = simulation.wait().unwrap();

        assert_eq!(report.termination, Termination::TimedOut);
        assert_eq!(report.ticks, 20);
        assert_eq!(simulation.snapshot().tick, 20);
    }
}
