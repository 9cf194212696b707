use super::math::{Position, Scalar};

/// One sampled column of the height field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    position: Position,
    pub height: Scalar,
    pub velocity: Scalar,
    rest_height: Scalar,
}

impl Node {
    /// A node sitting at its rest height with no motion.
    pub fn at_rest(position: Position, rest_height: Scalar) -> Self {
        Self {
            position,
            height: rest_height,
            velocity: 0.0,
            rest_height,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn rest_height(&self) -> Scalar {
        self.rest_height
    }

    /// Signed distance from the current height back to rest.
    pub fn displacement(&self) -> Scalar {
        self.rest_height - self.height
    }

    /// The only way `rest_height` changes.
    pub fn reset_to_rest(&mut self, rest_height: Scalar) {
        self.rest_height = rest_height;
        self.height = rest_height;
        self.velocity = 0.0;
    }
}
