//! Neighbor coupling that turns independent springs into a travelling wave
//!
//! Each iteration is a synchronized sweep: every delta is computed from the
//! heights as they stood before the iteration, and only then applied. The two
//! buffers are cleared and refilled on every iteration.
//!
//! ```text
//! left_delta[i]  = spread * (h[i] - h[i-1])   -> v[i-1], h[i-1]
//! right_delta[i] = spread * (h[i] - h[i+1])   -> v[i+1], h[i+1]
//! ```
//!
//! The first node has no left pair and the last has no right pair; edges are
//! free boundaries.

use super::math::Scalar;
use super::node::Node;

#[derive(Debug, Clone, Default)]
pub struct DiffusionPass {
    left_delta: Vec<Scalar>,
    right_delta: Vec<Scalar>,
}

impl DiffusionPass {
    pub fn with_capacity(len: usize) -> Self {
        Self {
            left_delta: vec![0.0; len],
            right_delta: vec![0.0; len],
        }
    }

    /// Run `iterations` coupling sweeps over `nodes`.
    pub fn apply(&mut self, nodes: &mut [Node], spread: Scalar, iterations: usize) {
        for _ in 0..iterations {
            self.sweep(nodes, spread);
        }
    }

    fn sweep(&mut self, nodes: &mut [Node], spread: Scalar) {
        let len = nodes.len();
        self.left_delta.clear();
        self.left_delta.resize(len, 0.0);
        self.right_delta.clear();
        self.right_delta.resize(len, 0.0);

        // Heights are not touched until every delta exists
        for i in 0..len {
            if i > 0 {
                let delta = spread * (nodes[i].height - nodes[i - 1].height);
                self.left_delta[i] = delta;
                nodes[i - 1].velocity += delta;
            }
            if i + 1 < len {
                let delta = spread * (nodes[i].height - nodes[i + 1].height);
                self.right_delta[i] = delta;
                nodes[i + 1].velocity += delta;
            }
        }

        for i in 0..len {
            if i > 0 {
                nodes[i - 1].height += self.left_delta[i];
            }
            if i + 1 < len {
                nodes[i + 1].height += self.right_delta[i];
            }
        }
    }
}
