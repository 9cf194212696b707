//! Damped spring relaxation, height first
//!
//! Less stable than [`SemiImplicitEuler`](super::SemiImplicitEuler) for a
//! lightly damped spring; kept for comparison runs.

use super::{Integrator, Spring};
use crate::physics::node::Node;

/// Forward Euler: height moves with the velocity from the start of the tick,
/// then velocity is updated from the original displacement.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplicitEuler;

impl Integrator for ExplicitEuler {
    fn clone_box(&self) -> Box<dyn Integrator> {
        Box::new(*self)
    }

    fn step(&self, node: &mut Node, spring: Spring) {
        let acceleration = spring.acceleration(node);
        node.height += node.velocity;
        node.velocity += acceleration;
    }

    fn name(&self) -> &'static str {
        "explicit_euler"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_uses_old_velocity() {
        let spring = Spring {
            tension: 0.025,
            dampening: 0.020,
        };
        let mut node = Node::at_rest(0, 200.0);
        node.height = 240.0;
        node.velocity = 2.0;

        ExplicitEuler.step(&mut node, spring);

        // Height moved by the old velocity
        assert!((node.height - 242.0).abs() < 1e-12);
        // a = 0.025 * -40 - 2 * 0.02 = -1.04
        assert!((node.velocity - 0.96).abs() < 1e-12);
    }

    #[test]
    fn test_undamped_energy_grows() {
        let spring = Spring {
            tension: 0.025,
            dampening: 0.0,
        };
        let mut node = Node::at_rest(0, 0.0);
        node.height = 10.0;

        let energy =
            |n: &Node| 0.5 * n.velocity * n.velocity + 0.5 * spring.tension * n.height * n.height;
        let initial = energy(&node);

        for _ in 0..500 {
            ExplicitEuler.step(&mut node, spring);
        }

        assert!(
            energy(&node) > initial * 1.5,
            "forward Euler should gain energy on an undamped spring"
        );
    }
}
