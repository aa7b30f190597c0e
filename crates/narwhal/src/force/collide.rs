use crate::error::Result;
use crate::force::Force;
use crate::node::Node;
use crate::param::NodeParam;
use crate::quadtree::{QuadPoint, QuadTree, Rect};
use crate::random::{RandomSource, jiggle_zero};

/// Per-quadrant aggregate: the largest collision reach (radius or extent) below the quadrant.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CollideData {
    pub radius: f64,
}

/// Pushes apart nodes whose circles (or bounding extents) overlap.
///
/// Positions are projected one step ahead (`x + vx`) before testing, so the correction lands on
/// the velocity that is about to be integrated. Unlike the other forces, the result is not scaled
/// by alpha.
#[derive(Debug)]
pub struct Collide<D> {
    radius: NodeParam<D>,
    strength: NodeParam<D>,
    radii: Vec<f64>,
    strengths: Vec<f64>,
}

impl<D> Default for Collide<D> {
    fn default() -> Self {
        Self {
            radius: NodeParam::Constant(1.0),
            strength: NodeParam::Constant(1.0),
            radii: Vec::new(),
            strengths: Vec::new(),
        }
    }
}

impl<D> Collide<D> {
    pub fn new(radius: impl Into<NodeParam<D>>) -> Self {
        Self {
            radius: radius.into(),
            ..Self::default()
        }
    }

    pub fn strength(mut self, strength: impl Into<NodeParam<D>>) -> Self {
        self.strength = strength.into();
        self
    }

    /// Resolved per-node radii, indexed by node index.
    pub fn radii(&self) -> &[f64] {
        &self.radii
    }

    fn resolve_pair(
        &self,
        nodes: &mut [Node<D>],
        i: usize,
        j: usize,
        (xi, yi): (f64, f64),
        rng: &mut dyn RandomSource,
    ) {
        let ri = self.radii[i];
        let rj = self.radii[j];
        let r = ri + rj;

        let xj = nodes[j].x + nodes[j].vx;
        let yj = nodes[j].y + nodes[j].vy;
        let mut x = xi - xj;
        let mut y = yi - yj;
        let l = x * x + y * y;

        if l < r * r {
            let l = jiggle_zero(&mut x, &mut y, l, rng).sqrt();
            let k = (r - l) / l * self.strengths[i];
            x *= k;
            y *= k;
        } else {
            // Circles clear: fall back to the extents at the projected positions.
            let a = nodes[i].bounds.map(|b| b.at(xi, yi));
            let b = nodes[j].bounds.map(|b| b.at(xj, yj));
            let Some((tx, ty)) = extent_separation(a, (xi, yi), b, (xj, yj), rng) else {
                return;
            };
            x = tx * self.strengths[i];
            y = ty * self.strengths[i];
        }

        let rj2 = rj * rj;
        let denom = ri * ri + rj2;
        let share = if denom > 0.0 { rj2 / denom } else { 0.5 };
        if !nodes[i].fixed {
            nodes[i].vx += x * share;
            nodes[i].vy += y * share;
        }
        let share = 1.0 - share;
        if !nodes[j].fixed {
            nodes[j].vx -= x * share;
            nodes[j].vy -= y * share;
        }
    }
}

/// Distance from the node's anchor to the farthest corner of its extent.
fn extent_reach<D>(node: &Node<D>) -> f64 {
    node.bounds.map_or(0.0, |b| {
        let dx = b.x_min.abs().max(b.x_max.abs());
        let dy = b.y_min.abs().max(b.y_max.abs());
        dx.hypot(dy)
    })
}

/// Minimum translation of node `i` (extent `a`, anchor `pa`) that ends its overlap with node `j`.
///
/// Two extents separate along the axis of least penetration. A bare point inside an extent leaves
/// through the nearest edge. `None` when nothing overlaps.
fn extent_separation(
    a: Option<Rect>,
    pa: (f64, f64),
    b: Option<Rect>,
    pb: (f64, f64),
    rng: &mut dyn RandomSource,
) -> Option<(f64, f64)> {
    match (a, b) {
        (Some(a), Some(b)) if a.intersects(&b) => {
            let ox = a.right().min(b.right()) - a.x.max(b.x);
            let oy = a.bottom().min(b.bottom()) - a.y.max(b.y);
            let (ax, ay) = a.center();
            let (bx, by) = b.center();
            if ox <= oy {
                Some((ox * away(ax - bx, rng), 0.0))
            } else {
                Some((0.0, oy * away(ay - by, rng)))
            }
        }
        (Some(a), None) if a.contains(pb.0, pb.1) => {
            let (ex, ey) = escape(&a, pb);
            Some((-ex, -ey))
        }
        (None, Some(b)) if b.contains(pa.0, pa.1) => Some(escape(&b, pa)),
        _ => None,
    }
}

/// Shortest move taking `(px, py)` out of `rect` through its nearest edge.
fn escape(rect: &Rect, (px, py): (f64, f64)) -> (f64, f64) {
    let left = px - rect.x;
    let right = rect.right() - px;
    let top = py - rect.y;
    let bottom = rect.bottom() - py;
    let depth = left.min(right).min(top).min(bottom);
    if depth == left {
        (-left, 0.0)
    } else if depth == right {
        (right, 0.0)
    } else if depth == top {
        (0.0, -top)
    } else {
        (0.0, bottom)
    }
}

/// Unit sign pointing along `offset`, jittered when the offset is exactly zero.
fn away(offset: f64, rng: &mut dyn RandomSource) -> f64 {
    if offset == 0.0 {
        rng.jiggle().signum()
    } else {
        offset.signum()
    }
}

impl<D> Force<D> for Collide<D> {
    fn initialize(&mut self, nodes: &[Node<D>]) -> Result<()> {
        self.radii = self.radius.resolve(nodes);
        self.strengths = self.strength.resolve(nodes);
        Ok(())
    }

    fn apply(&mut self, nodes: &mut [Node<D>], _alpha: f64, rng: &mut dyn RandomSource) {
        let points: Vec<QuadPoint> = nodes
            .iter()
            .map(|n| QuadPoint::new(n.x + n.vx, n.y + n.vy, n.index))
            .collect();
        let mut tree: QuadTree<CollideData> = QuadTree::from_points(&points);

        // Pruning reach covers both the circle and the whole extent.
        let reach: Vec<f64> = nodes
            .iter()
            .map(|n| self.radii[n.index].max(extent_reach(n)))
            .collect();
        tree.visit_after(|tree, id| {
            let quad = tree.quad(id);
            let radius = match quad.children() {
                Some(children) => children
                    .iter()
                    .map(|&c| tree.quad(c).data.radius)
                    .fold(0.0, f64::max),
                None => quad
                    .points()
                    .iter()
                    .map(|p| reach[p.index])
                    .fold(0.0, f64::max),
            };
            tree.quad_mut(id).data.radius = radius;
        });

        for i in 0..nodes.len() {
            let xi = nodes[i].x + nodes[i].vx;
            let yi = nodes[i].y + nodes[i].vy;
            let ri = reach[i];

            tree.visit(|_, quad| {
                let r = ri + quad.data.radius;
                if !quad.is_leaf() {
                    let rect = quad.rect;
                    return rect.x > xi + r
                        || rect.right() < xi - r
                        || rect.y > yi + r
                        || rect.bottom() < yi - r;
                }
                for p in quad.points() {
                    // Each unordered pair once; never against itself.
                    if p.index > i {
                        self.resolve_pair(nodes, i, p.index, (xi, yi), rng);
                    }
                }
                true
            });
        }
    }
}
