//! Adaptive 2-D spatial index over simulation points.
//!
//! The tree is an arena of [`Quad`]s addressed by [`QuadId`]. Forces build a fresh tree from the
//! current positions on every application, run a bottom-up aggregation with
//! [`QuadTree::visit_after`], then prune per node with [`QuadTree::visit`].

mod rect;

pub use rect::Rect;

/// Points a leaf holds before it subdivides.
pub const LEAF_CAPACITY: usize = 4;

/// Quadrants whose width or height is at or below this size never subdivide; points accumulate
/// in an oversized leaf instead, bounding the depth of the tree.
pub const MIN_CELL_SIZE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuadId(usize);

impl QuadId {
    pub const ROOT: QuadId = QuadId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// An indexed position. `index` refers back to the owning node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadPoint {
    pub x: f64,
    pub y: f64,
    pub index: usize,
}

impl QuadPoint {
    pub fn new(x: f64, y: f64, index: usize) -> Self {
        Self { x, y, index }
    }
}

#[derive(Debug, Clone)]
pub struct Quad<A> {
    pub rect: Rect,
    pub level: usize,
    /// Aggregate payload filled in by a bottom-up pass.
    pub data: A,
    children: Option<[QuadId; 4]>,
    points: Vec<QuadPoint>,
}

impl<A: Default> Quad<A> {
    fn empty(rect: Rect, level: usize) -> Self {
        Self {
            rect,
            level,
            data: A::default(),
            children: None,
            points: Vec::new(),
        }
    }
}

impl<A> Quad<A> {
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Children in NW, NE, SW, SE order.
    pub fn children(&self) -> Option<[QuadId; 4]> {
        self.children
    }

    /// Points stored directly in this quadrant (always empty for internal quadrants).
    pub fn points(&self) -> &[QuadPoint] {
        &self.points
    }
}

#[derive(Debug, Clone)]
pub struct QuadTree<A = ()> {
    quads: Vec<Quad<A>>,
}

impl<A: Default> QuadTree<A> {
    pub fn new(bounds: Rect) -> Self {
        Self {
            quads: vec![Quad::empty(bounds, 0)],
        }
    }

    /// Padded root rectangle covering every point.
    ///
    /// Each side spans at least 2 units plus a 1-unit pad, and the box is pushed out by another
    /// unit on every side so that the maximum coordinates are strictly inside.
    pub fn extents(points: &[QuadPoint]) -> Rect {
        if points.is_empty() {
            return Rect::new(-1.0, -1.0, 4.0, 4.0);
        }

        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        let width = (max_x - min_x).max(2.0) + 1.0;
        let height = (max_y - min_y).max(2.0) + 1.0;
        Rect::new(min_x - 1.0, min_y - 1.0, width + 1.0, height + 1.0)
    }

    pub fn from_points(points: &[QuadPoint]) -> Self {
        let mut tree = Self::new(Self::extents(points));
        for &p in points {
            let inserted = tree.insert(p, true);
            assert!(
                inserted,
                "point {p:?} escaped quadtree bounds derived from the same point set"
            );
        }
        tree
    }

    /// Inserts a point, optionally growing the root to cover it.
    ///
    /// Returns `false` only when the point is out of bounds and `allow_expand` is unset.
    pub fn insert(&mut self, point: QuadPoint, allow_expand: bool) -> bool {
        if !self.root().rect.contains(point.x, point.y) {
            if !allow_expand {
                return false;
            }
            self.expand_to_cover(point.x, point.y);
            if !self.root().rect.contains(point.x, point.y) {
                panic!(
                    "quadtree root {:?} still excludes point {point:?} after expansion",
                    self.root().rect
                );
            }
        }
        self.insert_into(QuadId::ROOT, point);
        true
    }

    fn insert_into(&mut self, mut id: QuadId, point: QuadPoint) {
        loop {
            let quad = &mut self.quads[id.0];
            if let Some(children) = quad.children {
                id = children[quad.rect.quadrant_of(point.x, point.y)];
                continue;
            }
            if quad.points.len() < LEAF_CAPACITY
                || quad.rect.width <= MIN_CELL_SIZE
                || quad.rect.height <= MIN_CELL_SIZE
            {
                quad.points.push(point);
                return;
            }
            self.subdivide(id);
        }
    }

    fn subdivide(&mut self, id: QuadId) {
        let (rects, level, points) = {
            let quad = &mut self.quads[id.0];
            debug_assert!(quad.is_leaf(), "subdivide called on internal quadrant");
            (
                quad.rect.quadrants(),
                quad.level + 1,
                std::mem::take(&mut quad.points),
            )
        };

        let first = self.quads.len();
        self.quads
            .extend(rects.into_iter().map(|r| Quad::empty(r, level)));
        let children = [
            QuadId(first),
            QuadId(first + 1),
            QuadId(first + 2),
            QuadId(first + 3),
        ];
        self.quads[id.0].children = Some(children);

        for p in points {
            self.insert_into(id, p);
        }
    }

    /// Grows the root toward `(px, py)` and re-indexes every stored point under it.
    fn expand_to_cover(&mut self, px: f64, py: f64) {
        let old = self.root().rect;
        let mut rect = old;

        if px < old.x {
            rect.x = px - old.width / 2.0;
            rect.width = old.right() - rect.x + 1.0;
        } else if px >= old.right() {
            rect.width = (px - old.x) + old.width / 2.0 + 1.0;
        }

        if py < old.y {
            rect.y = py - old.height / 2.0;
            rect.height = old.bottom() - rect.y + 1.0;
        } else if py >= old.bottom() {
            rect.height = (py - old.y) + old.height / 2.0 + 1.0;
        }

        let points: Vec<QuadPoint> = self.points().copied().collect();
        self.quads.clear();
        self.quads.push(Quad::empty(rect, 0));
        for p in points {
            self.insert_into(QuadId::ROOT, p);
        }
    }
}

impl<A> QuadTree<A> {
    pub fn root(&self) -> &Quad<A> {
        &self.quads[QuadId::ROOT.0]
    }

    pub fn bounds(&self) -> Rect {
        self.root().rect
    }

    pub fn quad(&self, id: QuadId) -> &Quad<A> {
        &self.quads[id.0]
    }

    pub fn quad_mut(&mut self, id: QuadId) -> &mut Quad<A> {
        &mut self.quads[id.0]
    }

    /// Number of quadrants, internal and leaf.
    pub fn len(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points().next().is_none()
    }

    pub fn points(&self) -> impl Iterator<Item = &QuadPoint> + '_ {
        self.quads.iter().flat_map(|q| q.points.iter())
    }

    /// All points inside `range`, taken from every quadrant that intersects it.
    pub fn query_range(&self, range: &Rect) -> Vec<QuadPoint> {
        let mut out = Vec::new();
        self.visit(|_, quad| {
            if !quad.rect.intersects(range) {
                return true;
            }
            out.extend(
                quad.points
                    .iter()
                    .filter(|p| range.contains(p.x, p.y))
                    .copied(),
            );
            false
        });
        out
    }

    /// The deepest quadrant containing `(x, y)`.
    pub fn query_point(&self, x: f64, y: f64) -> Option<QuadId> {
        let mut id = QuadId::ROOT;
        if !self.quads[id.0].rect.contains(x, y) {
            return None;
        }
        while let Some(children) = self.quads[id.0].children {
            id = children[self.quads[id.0].rect.quadrant_of(x, y)];
        }
        Some(id)
    }

    /// Pre-order traversal. Returning `true` from `f` skips the quadrant's children.
    ///
    /// Children are visited in NW, NE, SW, SE order.
    pub fn visit(&self, mut f: impl FnMut(QuadId, &Quad<A>) -> bool) {
        let mut stack = vec![QuadId::ROOT];
        while let Some(id) = stack.pop() {
            let quad = &self.quads[id.0];
            if f(id, quad) {
                continue;
            }
            if let Some(children) = quad.children {
                stack.extend(children.iter().rev());
            }
        }
    }

    /// Post-order traversal: every child is visited before its parent.
    ///
    /// The callback receives the whole tree so it can read child aggregates while writing the
    /// parent's.
    pub fn visit_after(&mut self, mut f: impl FnMut(&mut Self, QuadId)) {
        let mut order = Vec::with_capacity(self.quads.len());
        let mut stack = vec![QuadId::ROOT];
        while let Some(id) = stack.pop() {
            if let Some(children) = self.quads[id.0].children {
                stack.extend(children);
            }
            order.push(id);
        }
        for id in order.into_iter().rev() {
            f(self, id);
        }
    }
}
