use crate::error::Result;
use crate::force::Force;
use crate::node::Node;
use crate::param::NodeParam;
use crate::quadtree::{QuadId, QuadPoint, QuadTree};
use crate::random::{RandomSource, jiggle_zero};

/// Per-quadrant aggregate for the Barnes-Hut pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ManyBodyData {
    /// Signed sum of the strengths below this quadrant.
    pub value: f64,
    /// |strength|-weighted centroid. Unset (zero) when `value` is zero.
    pub x: f64,
    pub y: f64,
}

/// Barnes-Hut approximation of pairwise attraction (positive strength) or repulsion (negative).
#[derive(Debug)]
pub struct ManyBody<D> {
    strength: NodeParam<D>,
    strengths: Vec<f64>,
    theta2: f64,
    distance_min2: f64,
    distance_max2: f64,
}

impl<D> Default for ManyBody<D> {
    fn default() -> Self {
        Self {
            strength: NodeParam::Constant(-30.0),
            strengths: Vec::new(),
            theta2: 0.81,
            distance_min2: 1.0,
            distance_max2: f64::INFINITY,
        }
    }
}

impl<D> ManyBody<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strength(mut self, strength: impl Into<NodeParam<D>>) -> Self {
        self.strength = strength.into();
        self
    }

    /// Opening criterion: a quadrant of width `w` at distance `l` is treated as a single body
    /// when `w / l < theta`.
    pub fn theta(mut self, theta: f64) -> Self {
        self.theta2 = theta * theta;
        self
    }

    pub fn distance_min(mut self, distance: f64) -> Self {
        self.distance_min2 = distance * distance;
        self
    }

    pub fn distance_max(mut self, distance: f64) -> Self {
        self.distance_max2 = distance * distance;
        self
    }

    pub fn theta2(&self) -> f64 {
        self.theta2
    }

    /// Resolved per-node strengths, indexed by node index.
    pub fn strengths(&self) -> &[f64] {
        &self.strengths
    }

    fn accumulate(&self, tree: &mut QuadTree<ManyBodyData>, id: QuadId) {
        let quad = tree.quad(id);
        let mut value = 0.0;
        let mut weight = 0.0;
        let mut x = 0.0;
        let mut y = 0.0;

        match quad.children() {
            Some(children) => {
                for child in children {
                    let d = tree.quad(child).data;
                    let c = d.value.abs();
                    if c != 0.0 {
                        value += d.value;
                        weight += c;
                        x += c * d.x;
                        y += c * d.y;
                    }
                }
            }
            None => {
                for p in quad.points() {
                    let s = self.strengths[p.index];
                    let c = s.abs();
                    value += s;
                    weight += c;
                    x += c * p.x;
                    y += c * p.y;
                }
            }
        }

        if weight > 0.0 {
            x /= weight;
            y /= weight;
        }
        tree.quad_mut(id).data = ManyBodyData { value, x, y };
    }

    /// Velocity change for the node at `(nx, ny)`.
    fn field_at(
        &self,
        tree: &QuadTree<ManyBodyData>,
        index: usize,
        nx: f64,
        ny: f64,
        alpha: f64,
        rng: &mut dyn RandomSource,
    ) -> (f64, f64) {
        let mut dvx = 0.0;
        let mut dvy = 0.0;

        tree.visit(|_, quad| {
            let data = quad.data;
            if data.value == 0.0 {
                return true;
            }

            let mut x = data.x - nx;
            let mut y = data.y - ny;
            let mut l = x * x + y * y;
            let w = quad.rect.width;

            if w * w / self.theta2 < l {
                if l < self.distance_max2 {
                    l = self.clamp(jiggle_zero(&mut x, &mut y, l, rng));
                    dvx += x * data.value * alpha / l;
                    dvy += y * data.value * alpha / l;
                }
                return true;
            }

            if !quad.is_leaf() {
                return false;
            }
            if l >= self.distance_max2 {
                return true;
            }

            // Near-field leaf: interact with each point individually.
            for p in quad.points() {
                if p.index == index {
                    continue;
                }
                let mut x = p.x - nx;
                let mut y = p.y - ny;
                let mut l = x * x + y * y;
                if l >= self.distance_max2 {
                    continue;
                }
                l = self.clamp(jiggle_zero(&mut x, &mut y, l, rng));
                let k = self.strengths[p.index] * alpha / l;
                dvx += x * k;
                dvy += y * k;
            }
            true
        });

        (dvx, dvy)
    }

    fn clamp(&self, l: f64) -> f64 {
        if l < self.distance_min2 {
            (self.distance_min2 * l).sqrt()
        } else {
            l
        }
    }
}

impl<D> Force<D> for ManyBody<D> {
    fn initialize(&mut self, nodes: &[Node<D>]) -> Result<()> {
        self.strengths = self.strength.resolve(nodes);
        Ok(())
    }

    fn apply(&mut self, nodes: &mut [Node<D>], alpha: f64, rng: &mut dyn RandomSource) {
        let points: Vec<QuadPoint> = nodes
            .iter()
            .map(|n| QuadPoint::new(n.x, n.y, n.index))
            .collect();
        let mut tree: QuadTree<ManyBodyData> = QuadTree::from_points(&points);
        tree.visit_after(|tree, id| self.accumulate(tree, id));
        tracing::trace!(quads = tree.len(), alpha, "many-body tree aggregated");

        for node in nodes.iter_mut() {
            if node.fixed {
                continue;
            }
            let (dvx, dvy) = self.field_at(&tree, node.index, node.x, node.y, alpha, rng);
            node.vx += dvx;
            node.vy += dvy;
        }
    }
}
