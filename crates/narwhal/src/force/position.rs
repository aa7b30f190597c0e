//! Forces pulling nodes toward a fixed coordinate or circle.

use crate::error::Result;
use crate::force::Force;
use crate::node::Node;
use crate::param::NodeParam;
use crate::random::RandomSource;

/// Pulls each node's `x` toward a target. Nodes whose target is `NaN` are left alone.
#[derive(Debug)]
pub struct PositionX<D> {
    target: NodeParam<D>,
    strength: NodeParam<D>,
    targets: Vec<f64>,
    strengths: Vec<f64>,
}

/// Pulls each node's `y` toward a target. Nodes whose target is `NaN` are left alone.
#[derive(Debug)]
pub struct PositionY<D> {
    target: NodeParam<D>,
    strength: NodeParam<D>,
    targets: Vec<f64>,
    strengths: Vec<f64>,
}

macro_rules! axis_force {
    ($ty:ident, $pos:ident, $vel:ident) => {
        impl<D> Default for $ty<D> {
            fn default() -> Self {
                Self::new(0.0)
            }
        }

        impl<D> $ty<D> {
            pub fn new(target: impl Into<NodeParam<D>>) -> Self {
                Self {
                    target: target.into(),
                    strength: NodeParam::Constant(0.1),
                    targets: Vec::new(),
                    strengths: Vec::new(),
                }
            }

            pub fn strength(mut self, strength: impl Into<NodeParam<D>>) -> Self {
                self.strength = strength.into();
                self
            }

            pub fn targets(&self) -> &[f64] {
                &self.targets
            }
        }

        impl<D> Force<D> for $ty<D> {
            fn initialize(&mut self, nodes: &[Node<D>]) -> Result<()> {
                self.targets = self.target.resolve(nodes);
                self.strengths = self.strength.resolve(nodes);
                for (s, t) in self.strengths.iter_mut().zip(&self.targets) {
                    if t.is_nan() {
                        *s = 0.0;
                    }
                }
                Ok(())
            }

            fn apply(&mut self, nodes: &mut [Node<D>], alpha: f64, _rng: &mut dyn RandomSource) {
                for (i, node) in nodes.iter_mut().enumerate() {
                    if node.fixed || self.strengths[i] == 0.0 {
                        continue;
                    }
                    node.$vel += (self.targets[i] - node.$pos) * self.strengths[i] * alpha;
                }
            }
        }
    };
}

axis_force!(PositionX, x, vx);
axis_force!(PositionY, y, vy);

/// Pulls nodes toward a circle of per-node radius around a center.
#[derive(Debug)]
pub struct Radial<D> {
    x: f64,
    y: f64,
    radius: NodeParam<D>,
    strength: NodeParam<D>,
    radii: Vec<f64>,
    strengths: Vec<f64>,
}

impl<D> Default for Radial<D> {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl<D> Radial<D> {
    pub fn new(radius: impl Into<NodeParam<D>>) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            radius: radius.into(),
            strength: NodeParam::Constant(0.1),
            radii: Vec::new(),
            strengths: Vec::new(),
        }
    }

    pub fn center(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn strength(mut self, strength: impl Into<NodeParam<D>>) -> Self {
        self.strength = strength.into();
        self
    }
}

impl<D> Force<D> for Radial<D> {
    fn initialize(&mut self, nodes: &[Node<D>]) -> Result<()> {
        self.radii = self.radius.resolve(nodes);
        self.strengths = self.strength.resolve(nodes);
        Ok(())
    }

    fn apply(&mut self, nodes: &mut [Node<D>], alpha: f64, _rng: &mut dyn RandomSource) {
        for (i, node) in nodes.iter_mut().enumerate() {
            if node.fixed {
                continue;
            }
            let mut dx = node.x - self.x;
            let mut dy = node.y - self.y;
            if dx == 0.0 {
                dx = 1e-6;
            }
            if dy == 0.0 {
                dy = 1e-6;
            }
            let r = (dx * dx + dy * dy).sqrt();
            let k = (self.radii[i] - r) * self.strengths[i] * alpha / r;
            node.vx += dx * k;
            node.vy += dy * k;
        }
    }
}
