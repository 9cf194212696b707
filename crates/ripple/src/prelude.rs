//! Commonly used types, re-exported to reduce import boilerplate

pub use crate::config::{FieldConfig, MotionConfig, SimulationConfig, SplashConfig};
pub use crate::error::{Result, SimulationError};
pub use crate::motion::{MotionController, MotionSettings, RunReport, RunState, Termination};
pub use crate::physics::integrators::{Integrator, IntegratorRegistry};
pub use crate::physics::{
    ConvergenceCriterion, Field, FieldLayout, FieldParameters, Sample, Scalar, SharedField,
    Snapshot,
};
pub use crate::rng::SplashRng;
pub use crate::simulation::Simulation;
