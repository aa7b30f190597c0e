use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::force::Force;
use crate::node::Node;
use crate::param::LinkParam;
use crate::random::RandomSource;

/// An edge between two node identities.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Link<K> {
    pub source: K,
    pub target: K,
}

impl<K> Link<K> {
    pub fn new(source: K, target: K) -> Self {
        Self { source, target }
    }
}

type IdentityFn<D, K> = dyn Fn(&Node<D>) -> K;

/// Spring force pulling linked nodes toward a rest distance.
///
/// Links name their endpoints by identity; `initialize` resolves them to node indices through the
/// identity function (the node index by default). The correction is split between the endpoints
/// by degree, so hubs move less than leaves.
pub struct LinkForce<D, K = usize> {
    links: Vec<Link<K>>,
    identity: Box<IdentityFn<D, K>>,
    /// `None` selects `1 / min(degree(source), degree(target))`.
    strength: Option<LinkParam<K>>,
    distance: LinkParam<K>,

    endpoints: Vec<(usize, usize)>,
    bias: Vec<f64>,
    strengths: Vec<f64>,
    distances: Vec<f64>,
}

impl<D: 'static> LinkForce<D, usize> {
    pub fn new(links: Vec<Link<usize>>) -> Self {
        Self::with_identity(links, |n: &Node<D>| n.index)
    }
}

impl<D, K> LinkForce<D, K>
where
    K: Eq + Hash + fmt::Debug,
{
    pub fn with_identity(links: Vec<Link<K>>, identity: impl Fn(&Node<D>) -> K + 'static) -> Self {
        Self {
            links,
            identity: Box::new(identity),
            strength: None,
            distance: LinkParam::Constant(30.0),
            endpoints: Vec::new(),
            bias: Vec::new(),
            strengths: Vec::new(),
            distances: Vec::new(),
        }
    }

    pub fn strength(mut self, strength: impl Into<LinkParam<K>>) -> Self {
        self.strength = Some(strength.into());
        self
    }

    pub fn distance(mut self, distance: impl Into<LinkParam<K>>) -> Self {
        self.distance = distance.into();
        self
    }

    pub fn links(&self) -> &[Link<K>] {
        &self.links
    }

    /// Resolved `(source, target)` node indices, one per link.
    pub fn endpoints(&self) -> &[(usize, usize)] {
        &self.endpoints
    }

    pub fn strengths(&self) -> &[f64] {
        &self.strengths
    }

    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    fn lookup(&self, by_id: &FxHashMap<K, usize>, id: &K) -> Result<usize> {
        by_id
            .get(id)
            .copied()
            .ok_or_else(|| Error::UnresolvedReference {
                id: format!("{id:?}"),
            })
    }
}

impl<D, K> Force<D> for LinkForce<D, K>
where
    K: Eq + Hash + fmt::Debug,
{
    fn initialize(&mut self, nodes: &[Node<D>]) -> Result<()> {
        let mut by_id: FxHashMap<K, usize> = FxHashMap::default();
        for node in nodes {
            by_id.insert((self.identity)(node), node.index);
        }

        let mut endpoints = Vec::with_capacity(self.links.len());
        let mut count = vec![0.0_f64; nodes.len()];
        for link in &self.links {
            let s = self.lookup(&by_id, &link.source)?;
            let t = self.lookup(&by_id, &link.target)?;
            count[s] += 1.0;
            count[t] += 1.0;
            endpoints.push((s, t));
        }

        self.bias = endpoints
            .iter()
            .map(|&(s, t)| count[s] / (count[s] + count[t]))
            .collect();
        self.strengths = self
            .links
            .iter()
            .zip(&endpoints)
            .enumerate()
            .map(|(i, (link, &(s, t)))| match &self.strength {
                Some(p) => p.eval(link, i),
                None => 1.0 / count[s].min(count[t]),
            })
            .collect();
        self.distances = self
            .links
            .iter()
            .enumerate()
            .map(|(i, link)| self.distance.eval(link, i))
            .collect();
        self.endpoints = endpoints;

        tracing::debug!(links = self.links.len(), "link force initialized");
        Ok(())
    }

    fn apply(&mut self, nodes: &mut [Node<D>], alpha: f64, rng: &mut dyn RandomSource) {
        for (i, &(s, t)) in self.endpoints.iter().enumerate() {
            let mut x = nodes[t].x + nodes[t].vx - nodes[s].x - nodes[s].vx;
            let mut y = nodes[t].y + nodes[t].vy - nodes[s].y - nodes[s].vy;
            if x == 0.0 {
                x = rng.jiggle();
            }
            if y == 0.0 {
                y = rng.jiggle();
            }

            let l = (x * x + y * y).sqrt();
            let k = (l - self.distances[i]) / l * alpha * self.strengths[i];
            x *= k;
            y *= k;

            let b = self.bias[i];
            if !nodes[t].fixed {
                nodes[t].vx -= x * b;
                nodes[t].vy -= y * b;
            }
            let b = 1.0 - b;
            if !nodes[s].fixed {
                nodes[s].vx += x * b;
                nodes[s].vy += y * b;
            }
        }
    }
}

impl<D, K: fmt::Debug> fmt::Debug for LinkForce<D, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkForce")
            .field("links", &self.links)
            .field("strength", &self.strength)
            .field("distance", &self.distance)
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}
