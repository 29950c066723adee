//! Planar geometry shared by movement, raycasting and reward shaping.
//!
//! Angles are in degrees. A rotation of 0° faces +y and 90° faces +x, so the
//! unit vector for a rotation is `(sin θ, cos θ)`.

/// Euclidean distance between two points.
#[must_use]
pub fn distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    f64::hypot(x1 - x2, y1 - y2)
}

/// Unit vector pointing along `degrees`.
///
/// Components within `1e-12` of zero are snapped to zero, so axis-aligned
/// motion stays exactly on the grid.
///
/// ```
/// use airsoft_engine::geometry::forward_vector;
///
/// let (dx, dy) = forward_vector(90.0);
/// assert!((dx - 1.0).abs() < 1e-9);
/// assert!(dy.abs() < 1e-9);
/// ```
#[must_use]
pub fn forward_vector(degrees: f64) -> (f64, f64) {
    const SNAP: f64 = 1e-12;
    let snap = |v: f64| if v.abs() < SNAP { 0.0 } else { v };
    let radians = degrees.to_radians();
    (snap(radians.sin()), snap(radians.cos()))
}

/// Rotation in `[0, 360)` that faces from `(x1, y1)` towards `(x2, y2)`.
///
/// Inverse of [`forward_vector`]: `forward_vector(bearing(..))` points at the target.
#[must_use]
pub fn bearing(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    f64::atan2(x2 - x1, y2 - y1)
        .to_degrees()
        .rem_euclid(360.0)
}

/// Smallest absolute difference between two rotations, in `[0, 180]`.
#[must_use]
pub fn angle_difference(a: f64, b: f64) -> f64 {
    let diff = (a - b).rem_euclid(360.0);
    diff.min(360.0 - diff)
}

/// Axis-aligned box used for collision tests.
///
/// Two boxes overlap when their anchors are closer than half their combined
/// extent on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        let x_overlap = (self.x - other.x).abs() * 2.0 < self.width + other.width;
        let y_overlap = (self.y - other.y).abs() * 2.0 < self.height + other.height;
        x_overlap && y_overlap
    }

    /// Whether a circle centered at `(cx, cy)` reaches into the box spanned
    /// from the anchor to `(x + width, y + height)`.
    #[must_use]
    pub fn touches_circle(&self, cx: f64, cy: f64, radius: f64) -> bool {
        let nearest_x = cx.clamp(self.x, self.x + self.width);
        let nearest_y = cy.clamp(self.y, self.y + self.height);
        distance(cx, cy, nearest_x, nearest_y) < radius
    }
}
