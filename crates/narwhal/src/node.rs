use crate::quadtree::Rect;

/// A simulated point entity.
///
/// `x`/`y` may be `NaN` to request a spiral start position, and `vx`/`vy` stay `NaN` until
/// [`Simulation`](crate::Simulation) initializes them.
#[derive(Debug, Clone, PartialEq)]
pub struct Node<D = ()> {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    /// Fixed-axis overrides. When set, the axis snaps to this value every tick.
    pub fx: Option<f64>,
    pub fy: Option<f64>,
    /// Frozen node: never integrated and never pushed by forces.
    pub fixed: bool,
    /// Dense 0-based index, assigned by the simulation.
    pub index: usize,
    /// Rectangular extent used by collision, relative to `(x, y)`.
    pub bounds: Option<Bounds>,
    pub data: D,
}

impl Node<()> {
    pub fn new(x: f64, y: f64) -> Self {
        Self::with_data(x, y, ())
    }

    pub fn unplaced() -> Self {
        Self::with_data(f64::NAN, f64::NAN, ())
    }
}

impl<D> Node<D> {
    pub fn with_data(x: f64, y: f64, data: D) -> Self {
        Self {
            x,
            y,
            vx: f64::NAN,
            vy: f64::NAN,
            fx: None,
            fy: None,
            fixed: false,
            index: 0,
            bounds: None,
            data,
        }
    }

    pub fn velocity(mut self, vx: f64, vy: f64) -> Self {
        self.vx = vx;
        self.vy = vy;
        self
    }

    pub fn pin_x(mut self, fx: f64) -> Self {
        self.fx = Some(fx);
        self
    }

    pub fn pin_y(mut self, fy: f64) -> Self {
        self.fy = Some(fy);
        self
    }

    pub fn frozen(mut self) -> Self {
        self.fixed = true;
        self
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn position(&self) -> Point {
        Point {
            x: self.x,
            y: self.y,
        }
    }

    /// Bounding rectangle in world coordinates, if the node has an extent.
    pub fn rect(&self) -> Option<Rect> {
        self.bounds.map(|b| b.at(self.x, self.y))
    }

    /// Whether the bounding extents of two nodes overlap.
    ///
    /// With a single extent, the other node's position must fall inside it; without any extent
    /// nodes never overlap.
    pub fn overlaps<E>(&self, other: &Node<E>) -> bool {
        match (self.rect(), other.rect()) {
            (Some(a), Some(b)) => a.intersects(&b),
            (Some(a), None) => a.contains(other.x, other.y),
            (None, Some(b)) => b.contains(self.x, self.y),
            (None, None) => false,
        }
    }
}

/// Axis-aligned extent expressed relative to its node's position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl Bounds {
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// A `width` x `height` box centered on the node.
    pub fn centered(width: f64, height: f64) -> Self {
        let hw = width / 2.0;
        let hh = height / 2.0;
        Self::new(-hw, -hh, hw, hh)
    }

    /// Builds a relative extent from an absolute box anchored at `(anchor_x, anchor_y)`.
    pub fn from_anchored(
        x_min: f64,
        y_min: f64,
        x_max: f64,
        y_max: f64,
        anchor_x: f64,
        anchor_y: f64,
    ) -> Self {
        Self::new(
            x_min - anchor_x,
            y_min - anchor_y,
            x_max - anchor_x,
            y_max - anchor_y,
        )
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    pub fn at(&self, x: f64, y: f64) -> Rect {
        Rect::new(x + self.x_min, y + self.y_min, self.width(), self.height())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}
