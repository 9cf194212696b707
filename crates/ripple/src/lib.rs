//! Ripple library
//!
//! A one-dimensional water surface made of damped springs coupled to their
//! neighbors. A background thread settles the surface after a splash while
//! any number of readers take consistent snapshots of it.

pub mod cli;
pub mod config;
pub mod error;
pub mod motion;
pub mod physics;
pub mod prelude;
pub mod rng;
pub mod simulation;

pub use config::SimulationConfig;
pub use error::{Result, SimulationError};
pub use motion::{MotionController, MotionSettings, RunReport, RunState, Termination};
pub use physics::{Field, FieldLayout, FieldParameters, Scalar, SharedField, Snapshot};
pub use simulation::Simulation;
