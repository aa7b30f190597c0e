/// Axis-aligned rectangle anchored at its top-left corner.
///
/// Containment is half-open: `x <= px < x + width`, so sibling quadrants never share a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        self.x <= px && px < self.right() && self.y <= py && py < self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// The four half-size children in NW, NE, SW, SE order.
    pub(crate) fn quadrants(&self) -> [Rect; 4] {
        let hw = self.width / 2.0;
        let hh = self.height / 2.0;
        [
            Rect::new(self.x, self.y, hw, hh),
            Rect::new(self.x + hw, self.y, hw, hh),
            Rect::new(self.x, self.y + hh, hw, hh),
            Rect::new(self.x + hw, self.y + hh, hw, hh),
        ]
    }

    /// Child slot for a point already known to lie inside this rectangle.
    ///
    /// Splits on the midpoint, so every contained point lands in exactly one child.
    pub(crate) fn quadrant_of(&self, px: f64, py: f64) -> usize {
        let east = px >= self.x + self.width / 2.0;
        let south = py >= self.y + self.height / 2.0;
        usize::from(east) + 2 * usize::from(south)
    }
}
