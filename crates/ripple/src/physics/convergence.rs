//! Rest detection

use super::math::Scalar;
use super::node::Node;
use serde::{Deserialize, Serialize};

/// When a field counts as settled.
///
/// `Truncated` is the default: velocity and displacement are truncated toward
/// zero before comparison, so any residual motion under one unit counts as
/// rest. A field can be declared settled while a small fractional oscillation
/// persists; the motion loop then snaps it back to rest.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvergenceCriterion {
    #[default]
    Truncated,
    /// Both magnitudes strictly below `tolerance`
    Epsilon { tolerance: Scalar },
}

impl ConvergenceCriterion {
    pub fn node_at_rest(&self, node: &Node) -> bool {
        let velocity = node.velocity;
        let displacement = node.displacement();
        match *self {
            Self::Truncated => velocity.trunc() == 0.0 && displacement.trunc() == 0.0,
            Self::Epsilon { tolerance } => {
                velocity.abs() < tolerance && displacement.abs() < tolerance
            }
        }
    }

    pub fn field_at_rest(&self, nodes: &[Node]) -> bool {
        nodes.iter().all(|node| self.node_at_rest(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(height: Scalar, velocity: Scalar) -> Node {
        let mut node = Node::at_rest(0, 200.0);
        node.height = height;
        node.velocity = velocity;
        node
    }

    #[test]
    fn test_truncation_treats_fractions_as_rest() {
        let criterion = ConvergenceCriterion::Truncated;
        assert!(criterion.node_at_rest(&node(200.0, 0.0)));
        assert!(criterion.node_at_rest(&node(200.9, -0.99)));
        assert!(criterion.node_at_rest(&node(199.1, 0.5)));
        assert!(!criterion.node_at_rest(&node(201.0, 0.0)));
        assert!(!criterion.node_at_rest(&node(200.0, -1.0)));
    }

    #[test]
    fn test_epsilon_is_stricter() {
        let criterion = ConvergenceCriterion::Epsilon { tolerance: 0.01 };
        assert!(criterion.node_at_rest(&node(200.005, 0.001)));
        assert!(!criterion.node_at_rest(&node(200.5, 0.0)));
        assert!(!criterion.node_at_rest(&node(200.0, 0.02)));
    }

    #[test]
    fn test_non_finite_never_rests() {
        for criterion in [
            ConvergenceCriterion::Truncated,
            ConvergenceCriterion::Epsilon { tolerance: 1.0 },
        ] {
            assert!(!criterion.node_at_rest(&node(Scalar::NAN, 0.0)));
            assert!(!criterion.node_at_rest(&node(200.0, Scalar::INFINITY)));
        }
    }

    #[test]
    fn test_field_requires_every_node() {
        let nodes = [node(200.0, 0.0), node(200.0, 3.0), node(200.0, 0.0)];
        assert!(!ConvergenceCriterion::Truncated.field_at_rest(&nodes));
        assert!(ConvergenceCriterion::Truncated.field_at_rest(&nodes[..1]));
    }
}
