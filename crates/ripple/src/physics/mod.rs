//! Height-field model and the numerical pieces that advance it

pub mod convergence;
pub mod diffusion;
pub mod field;
pub mod integrators;
pub mod math;
pub mod node;

pub use convergence::ConvergenceCriterion;
pub use diffusion::DiffusionPass;
pub use field::{Field, FieldLayout, FieldParameters, Sample, SharedField, Snapshot};
pub use math::{Position, Scalar};
pub use node::Node;
