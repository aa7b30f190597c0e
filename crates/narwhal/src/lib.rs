#![forbid(unsafe_code)]

//! Headless force-directed layout simulation.
//!
//! `narwhal` integrates node velocities under a set of pluggable [`Force`]s, cooling a global
//! `alpha` each tick until the layout settles. Many-body repulsion uses a Barnes-Hut quadtree and
//! collision uses the same index to prune candidate pairs. The crate computes coordinates only;
//! drawing is left to the host.
//!
//! ```
//! use narwhal::{Collide, ManyBody, Node, Simulation, SimulationOptions};
//!
//! let nodes = vec![Node::new(0.0, 0.0), Node::new(1.0, 0.0), Node::unplaced()];
//! let mut sim = Simulation::new(nodes, SimulationOptions::default());
//! sim.add_force("charge", ManyBody::new()).unwrap();
//! sim.add_force("collide", Collide::new(4.0)).unwrap();
//! sim.tick(50);
//! assert!(sim.find(0.0, 0.0, None).is_some());
//! ```

pub mod error;
pub mod force;
pub mod graph;
mod graph_layout;
pub mod node;
pub mod param;
pub mod quadtree;
pub mod random;
pub mod simulation;

pub use error::{Error, Result};
pub use force::{
    Collide, CollideData, Force, Link, LinkForce, ManyBody, ManyBodyData, PositionX, PositionY,
    Radial,
};
pub use graph::{Edge, Graph, GraphNode, LayoutResult};
pub use graph_layout::LayoutOptions;
pub use node::{Bounds, Node, Point};
pub use param::{LinkParam, NodeParam};
pub use quadtree::{Quad, QuadId, QuadPoint, QuadTree, Rect};
pub use random::{RandomSource, XorShift64Star};
pub use simulation::{Simulation, SimulationOptions};

/// Headless graph layout entry point.
///
/// Runs a link + many-body + collision + centering simulation to convergence and returns the
/// final center of every node, keyed by id.
pub fn layout(graph: &Graph, opts: &LayoutOptions) -> Result<LayoutResult> {
    graph_layout::layout(graph, opts)
}
