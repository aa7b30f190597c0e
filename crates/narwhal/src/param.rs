//! Constant-or-callable force parameters.
//!
//! Parameters are resolved once, when a force is initialized, into a plain `Vec<f64>` indexed by
//! node (or link) index. Callbacks are never re-evaluated per tick.

use crate::force::Link;
use crate::node::Node;

type NodeFn<D> = dyn Fn(&Node<D>, usize, &[Node<D>]) -> f64;
type LinkFn<K> = dyn Fn(&Link<K>, usize) -> f64;

/// A per-node parameter: a constant, or a function of `(node, index, nodes)`.
pub enum NodeParam<D> {
    Constant(f64),
    PerNode(Box<NodeFn<D>>),
}

impl<D> NodeParam<D> {
    pub fn per_node(f: impl Fn(&Node<D>, usize, &[Node<D>]) -> f64 + 'static) -> Self {
        Self::PerNode(Box::new(f))
    }

    pub fn eval(&self, node: &Node<D>, i: usize, nodes: &[Node<D>]) -> f64 {
        match self {
            Self::Constant(v) => *v,
            Self::PerNode(f) => f(node, i, nodes),
        }
    }

    /// One value per node, stored at `node.index`.
    pub(crate) fn resolve(&self, nodes: &[Node<D>]) -> Vec<f64> {
        let mut out = vec![0.0; nodes.len()];
        for (i, node) in nodes.iter().enumerate() {
            debug_assert_eq!(node.index, i, "node index not assigned before initialize");
            out[node.index] = self.eval(node, i, nodes);
        }
        out
    }
}

impl<D> From<f64> for NodeParam<D> {
    fn from(v: f64) -> Self {
        Self::Constant(v)
    }
}

impl<D> std::fmt::Debug for NodeParam<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Constant(v) => f.debug_tuple("Constant").field(v).finish(),
            Self::PerNode(_) => f.write_str("PerNode(<fn>)"),
        }
    }
}

/// A per-link parameter: a constant, or a function of `(link, index)`.
pub enum LinkParam<K> {
    Constant(f64),
    PerLink(Box<LinkFn<K>>),
}

impl<K> LinkParam<K> {
    pub fn per_link(f: impl Fn(&Link<K>, usize) -> f64 + 'static) -> Self {
        Self::PerLink(Box::new(f))
    }

    pub fn eval(&self, link: &Link<K>, i: usize) -> f64 {
        match self {
            Self::Constant(v) => *v,
            Self::PerLink(f) => f(link, i),
        }
    }
}

impl<K> From<f64> for LinkParam<K> {
    fn from(v: f64) -> Self {
        Self::Constant(v)
    }
}

impl<K> std::fmt::Debug for LinkParam<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Constant(v) => f.debug_tuple("Constant").field(v).finish(),
            Self::PerLink(_) => f.write_str("PerLink(<fn>)"),
        }
    }
}
