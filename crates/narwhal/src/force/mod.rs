//! Pluggable velocity-mutating behaviors.

mod collide;
mod link;
mod many_body;
mod position;

pub use collide::{Collide, CollideData};
pub use link::{Link, LinkForce};
pub use many_body::{ManyBody, ManyBodyData};
pub use position::{PositionX, PositionY, Radial};

use crate::error::Result;
use crate::node::Node;
use crate::random::RandomSource;

/// A force registered with a [`Simulation`](crate::Simulation).
///
/// `initialize` runs once when the force is registered (after node indices are assigned) and again
/// whenever the simulation is re-initialized. `apply` runs once per tick and must only touch
/// velocities; positions are integrated by the simulation after every force has run.
pub trait Force<D> {
    fn initialize(&mut self, nodes: &[Node<D>]) -> Result<()>;

    fn apply(&mut self, nodes: &mut [Node<D>], alpha: f64, rng: &mut dyn RandomSource);
}

impl<D> std::fmt::Debug for dyn Force<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Force")
    }
}
