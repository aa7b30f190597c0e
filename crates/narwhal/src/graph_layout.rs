use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::force::{Collide, Link, LinkForce, ManyBody, PositionX, PositionY};
use crate::graph::{Graph, LayoutResult};
use crate::node::{Bounds, Node, Point};
use crate::param::NodeParam;
use crate::simulation::{Simulation, SimulationOptions};

/// Force mix used by [`layout`](crate::layout).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutOptions {
    pub simulation: SimulationOptions,
    /// Rest length of every edge.
    pub link_distance: f64,
    /// Many-body strength per node; negative repels.
    pub charge_strength: f64,
    pub theta: f64,
    /// Pull toward the origin on each axis.
    pub center_strength: f64,
    /// Disable to let node boxes overlap.
    pub collide: bool,
    /// Extra clearance added to each node's collision radius.
    pub collide_padding: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            simulation: SimulationOptions::default(),
            link_distance: 30.0,
            charge_strength: -30.0,
            theta: 0.9,
            center_strength: 0.1,
            collide: true,
            collide_padding: 2.0,
        }
    }
}

pub fn layout(graph: &Graph, opts: &LayoutOptions) -> Result<LayoutResult> {
    graph.validate()?;

    let nodes: Vec<Node<String>> = graph
        .nodes
        .iter()
        .map(|n| {
            let mut node = Node::with_data(
                n.x.unwrap_or(f64::NAN),
                n.y.unwrap_or(f64::NAN),
                n.id.clone(),
            );
            if n.width > 0.0 && n.height > 0.0 {
                node.bounds = Some(Bounds::centered(n.width, n.height));
            }
            node
        })
        .collect();
    let links: Vec<Link<String>> = graph
        .edges
        .iter()
        .map(|e| Link::new(e.source.clone(), e.target.clone()))
        .collect();

    let mut sim = Simulation::new(nodes, opts.simulation.clone());
    sim.add_force(
        "link",
        LinkForce::with_identity(links, |n: &Node<String>| n.data.clone())
            .distance(opts.link_distance),
    )?;
    sim.add_force(
        "charge",
        ManyBody::new()
            .strength(opts.charge_strength)
            .theta(opts.theta),
    )?;
    if opts.collide {
        let padding = opts.collide_padding;
        let radius = NodeParam::per_node(move |n: &Node<String>, _, _| {
            n.bounds
                .map_or(0.0, |b| b.width().hypot(b.height()) / 2.0)
                + padding
        });
        sim.add_force("collide", Collide::new(radius))?;
    }
    sim.add_force("x", PositionX::new(0.0).strength(opts.center_strength))?;
    sim.add_force("y", PositionY::new(0.0).strength(opts.center_strength))?;

    let ticks = sim.run();
    tracing::debug!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        ticks,
        "graph layout finished"
    );

    let positions = sim
        .into_nodes()
        .into_iter()
        .map(|n| (n.data, Point { x: n.x, y: n.y }))
        .collect();
    Ok(LayoutResult { positions })
}
