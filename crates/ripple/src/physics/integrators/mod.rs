//! Per-node spring integration schemes

use super::math::Scalar;
use super::node::Node;
use std::fmt::Debug;

pub mod explicit_euler;
pub mod registry;
pub mod semi_implicit_euler;

pub use explicit_euler::ExplicitEuler;
pub use registry::IntegratorRegistry;
pub use semi_implicit_euler::SemiImplicitEuler;

/// Spring constants shared by every node of a field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    /// Stiffness pulling a node back toward its rest height
    pub tension: Scalar,
    /// Fraction of velocity lost per step
    pub dampening: Scalar,
}

impl Spring {
    /// Acceleration felt by a node: restoring force minus velocity decay.
    pub fn acceleration(&self, node: &Node) -> Scalar {
        self.tension * node.displacement() - node.velocity * self.dampening
    }
}

/// Base trait for all integrators.
///
/// An integrator advances one node by one tick. It sees nothing but the node
/// and the spring constants, so nodes can be stepped in any order.
pub trait Integrator: Send + Sync + Debug {
    /// Create a boxed copy, used by the registry to hand out instances
    fn clone_box(&self) -> Box<dyn Integrator>;

    /// Advance a single node by one tick
    fn step(&self, node: &mut Node, spring: Spring);

    /// Canonical name used in configuration files
    fn name(&self) -> &'static str;

    /// Alternative names accepted by the registry
    fn aliases(&self) -> Vec<&'static str> {
        Vec::new()
    }
}

impl Clone for Box<dyn Integrator> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
