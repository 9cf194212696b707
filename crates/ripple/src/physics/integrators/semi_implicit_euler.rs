//! Damped spring relaxation, velocity first

use super::{Integrator, Spring};
use crate::physics::node::Node;

/// Default integrator for the height field.
///
/// ```text
/// displacement = rest - height
/// velocity    += tension * displacement - velocity * dampening
/// height      += velocity          (the updated velocity)
/// ```
///
/// Unit time step, no clamping. Parameters far outside the shipped ranges
/// can diverge and are not corrected here.
#[derive(Debug, Clone, Copy, Default)]
pub struct SemiImplicitEuler;

impl Integrator for SemiImplicitEuler {
    fn clone_box(&self) -> Box<dyn Integrator> {
        Box::new(*self)
    }

    fn step(&self, node: &mut Node, spring: Spring) {
        node.velocity += spring.acceleration(node);
        node.height += node.velocity;
    }

    fn name(&self) -> &'static str {
        "semi_implicit_euler"
    }

    fn aliases(&self) -> Vec<&'static str> {
        vec!["euler", "symplectic_euler"]
    }
}
