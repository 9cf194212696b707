//! The height field: ordered nodes plus the parameters that drive them

use super::convergence::ConvergenceCriterion;
use super::diffusion::DiffusionPass;
use super::integrators::{Integrator, SemiImplicitEuler, Spring};
use super::math::{Position, Scalar};
use super::node::Node;
use crate::error::{Result, SimulationError};
use parking_lot::Mutex;
use std::sync::Arc;

/// A field shared between the motion loop and its readers.
///
/// The lock is held for one complete tick at a time, so a reader either sees
/// the state before a tick or after it.
pub type SharedField = Arc<Mutex<Field>>;

/// Horizontal sampling of the surface.
///
/// Nodes sit at `0, sample_interval, 2 * sample_interval, ...` strictly below
/// `width`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLayout {
    pub width: u32,
    pub sample_interval: u32,
}

impl FieldLayout {
    pub fn node_count(&self) -> usize {
        if self.sample_interval == 0 {
            return 0;
        }
        self.width.div_ceil(self.sample_interval) as usize
    }

    fn positions(&self) -> impl Iterator<Item = Position> {
        (0..self.width).step_by(self.sample_interval.max(1) as usize)
    }

    fn validate(&self) -> Result<()> {
        if self.sample_interval == 0 {
            return Err(SimulationError::invalid("sample interval must be positive"));
        }
        let count = self.node_count();
        if count < 2 {
            return Err(SimulationError::invalid(format!(
                "a field needs at least 2 nodes, width {} with interval {} gives {}",
                self.width, self.sample_interval, count
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldParameters {
    /// Height every node relaxes toward and is reset to
    pub target_height: Scalar,
    pub tension: Scalar,
    pub dampening: Scalar,
    /// Fraction of a height difference passed to a neighbor per sweep
    pub spread: Scalar,
    pub diffusion_iterations: usize,
    pub convergence: ConvergenceCriterion,
}

impl Default for FieldParameters {
    fn default() -> Self {
        Self {
            target_height: 200.0,
            tension: 0.025,
            dampening: 0.020,
            spread: 0.25,
            diffusion_iterations: 5,
            convergence: ConvergenceCriterion::Truncated,
        }
    }
}

impl FieldParameters {
    pub fn validate(&self) -> Result<()> {
        if !self.target_height.is_finite() {
            return Err(SimulationError::invalid("target height must be finite"));
        }
        if !(self.tension.is_finite() && self.tension > 0.0) {
            return Err(SimulationError::invalid(format!(
                "tension must be positive, got {}",
                self.tension
            )));
        }
        if !(self.dampening.is_finite() && self.dampening >= 0.0) {
            return Err(SimulationError::invalid(format!(
                "dampening must not be negative, got {}",
                self.dampening
            )));
        }
        if !(0.0..=1.0).contains(&self.spread) {
            return Err(SimulationError::invalid(format!(
                "spread must lie in [0, 1], got {}",
                self.spread
            )));
        }
        if self.diffusion_iterations == 0 {
            return Err(SimulationError::invalid(
                "diffusion iterations must be positive",
            ));
        }
        if let ConvergenceCriterion::Epsilon { tolerance } = self.convergence {
            if !(tolerance.is_finite() && tolerance > 0.0) {
                return Err(SimulationError::invalid(format!(
                    "convergence tolerance must be positive, got {tolerance}"
                )));
            }
        }
        Ok(())
    }

    pub fn spring(&self) -> Spring {
        Spring {
            tension: self.tension,
            dampening: self.dampening,
        }
    }
}

/// One node as seen by a reader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub position: Position,
    pub height: Scalar,
    pub velocity: Scalar,
}

/// Owned, point-in-time copy of the field.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Completed ticks when the copy was taken
    pub tick: u64,
    pub target_height: Scalar,
    pub samples: Vec<Sample>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn heights(&self) -> impl Iterator<Item = Scalar> + '_ {
        self.samples.iter().map(|s| s.height)
    }

    /// Largest distance of any node from the target height.
    pub fn max_displacement(&self) -> Scalar {
        self.samples
            .iter()
            .map(|s| (s.height - self.target_height).abs())
            .fold(0.0, Scalar::max)
    }

    /// Sum of `v² / 2` over all nodes (unit mass).
    pub fn kinetic_energy(&self) -> Scalar {
        self.samples
            .iter()
            .map(|s| 0.5 * s.velocity * s.velocity)
            .sum()
    }

    pub fn is_flat(&self) -> bool {
        self.samples
            .iter()
            .all(|s| s.height == self.target_height && s.velocity == 0.0)
    }
}

#[derive(Debug)]
pub struct Field {
    nodes: Vec<Node>,
    parameters: FieldParameters,
    integrator: Box<dyn Integrator>,
    diffusion: DiffusionPass,
    ticks: u64,
}

impl Field {
    /// Build a field at rest. Every node starts at the target height.
    pub fn new(layout: FieldLayout, parameters: FieldParameters) -> Result<Self> {
        layout.validate()?;
        parameters.validate()?;

        let nodes: Vec<Node> = layout
            .positions()
            .map(|x| Node::at_rest(x, parameters.target_height))
            .collect();

        Ok(Self {
            diffusion: DiffusionPass::with_capacity(nodes.len()),
            nodes,
            parameters,
            integrator: Box::new(SemiImplicitEuler),
            ticks: 0,
        })
    }

    pub fn with_integrator(mut self, integrator: Box<dyn Integrator>) -> Self {
        self.integrator = integrator;
        self
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn parameters(&self) -> &FieldParameters {
        &self.parameters
    }

    pub fn integrator(&self) -> &dyn Integrator {
        self.integrator.as_ref()
    }

    /// Completed ticks over the field's lifetime
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn center_index(&self) -> usize {
        self.nodes.len() / 2
    }

    /// Set the velocity of one node. The field is untouched on error.
    pub fn apply_impulse(&mut self, index: usize, magnitude: Scalar) -> Result<()> {
        let len = self.nodes.len();
        let node = self
            .nodes
            .get_mut(index)
            .ok_or(SimulationError::OutOfRange { index, len })?;
        node.velocity = magnitude;
        Ok(())
    }

    /// Integrate every node, run the diffusion sweeps, and report whether the
    /// field is now at rest. The caller decides what to do about rest.
    pub fn advance(&mut self) -> bool {
        let spring = self.parameters.spring();
        for node in &mut self.nodes {
            self.integrator.step(node, spring);
        }

        self.diffusion.apply(
            &mut self.nodes,
            self.parameters.spread,
            self.parameters.diffusion_iterations,
        );

        self.ticks += 1;
        self.is_at_rest()
    }

    pub fn is_at_rest(&self) -> bool {
        self.parameters.convergence.field_at_rest(&self.nodes)
    }

    pub fn reset_to_rest(&mut self) {
        let target = self.parameters.target_height;
        for node in &mut self.nodes {
            node.reset_to_rest(target);
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.ticks,
            target_height: self.parameters.target_height,
            samples: self
                .nodes
                .iter()
                .map(|node| Sample {
                    position: node.position(),
                    height: node.height,
                    velocity: node.velocity,
                })
                .collect(),
        }
    }

    pub fn into_shared(self) -> SharedField {
        Arc::new(Mutex::new(self))
    }
}
