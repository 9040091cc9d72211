//! Page-space geometry shared by layers and the interaction controller.

use serde::{Deserialize, Serialize};

/// A point in page (or screen) coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Angle of `self` around `center`, in degrees.
    #[must_use]
    pub fn angle_from(self, center: Self) -> f32 {
        (self.y - center.y).atan2(self.x - center.x).to_degrees()
    }

    /// Rotate around `center` by `degrees`.
    #[must_use]
    pub fn rotated_around(self, center: Self, degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let dx = self.x - center.x;
        let dy = self.y - center.y;
        Self {
            x: center.x + dx * cos - dy * sin,
            y: center.y + dx * sin + dy * cos,
        }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// The transformable envelope every layer carries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Distance from the page's left edge.
    pub left: f32,
    /// Distance from the page's top edge.
    pub top: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Rotation in degrees, clockwise, around the center. Not canonicalized.
    #[serde(default)]
    pub rotation: f32,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: 100.0,
            height: 100.0,
            rotation: 0.0,
        }
    }
}

impl Geometry {
    /// Create an unrotated geometry.
    #[must_use]
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
            rotation: 0.0,
        }
    }

    /// Set the rotation.
    #[must_use]
    pub const fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Center of the box.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(
            self.left + self.width / 2.0,
            self.top + self.height / 2.0,
        )
    }

    /// Unrotated axis-aligned bounds.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        Bounds {
            x1: self.left,
            y1: self.top,
            x2: self.left + self.width,
            y2: self.top + self.height,
        }
    }

    /// Same geometry shifted by a delta.
    #[must_use]
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            ..*self
        }
    }

    /// Map a page-space point into the layer's unrotated frame.
    #[must_use]
    pub fn to_local(&self, point: Point) -> Point {
        if self.rotation == 0.0 {
            point
        } else {
            point.rotated_around(self.center(), -self.rotation)
        }
    }

    /// Map a point in the unrotated frame back into page space.
    #[must_use]
    pub fn to_page(&self, point: Point) -> Point {
        if self.rotation == 0.0 {
            point
        } else {
            point.rotated_around(self.center(), self.rotation)
        }
    }

    /// Whether a page-space point lies inside the rotated box.
    #[must_use]
    pub fn contains_point(&self, point: Point) -> bool {
        self.bounds().contains(self.to_local(point))
    }

    /// Display rotation in `[0, 360)`.
    #[must_use]
    pub fn normalized_rotation(&self) -> f32 {
        self.rotation.rem_euclid(360.0)
    }

    /// Whether every field is a finite number.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.left.is_finite()
            && self.top.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.rotation.is_finite()
    }
}

/// An axis-aligned rectangle with `x1 <= x2` and `y1 <= y2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Left edge.
    pub x1: f32,
    /// Top edge.
    pub y1: f32,
    /// Right edge.
    pub x2: f32,
    /// Bottom edge.
    pub y2: f32,
}

impl Bounds {
    /// Rectangle spanned by two arbitrary corners.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x1: a.x.min(b.x),
            y1: a.y.min(b.y),
            x2: a.x.max(b.x),
            y2: a.y.max(b.y),
        }
    }

    /// Strict overlap test; touching edges do not intersect.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.x1 < other.x2 && self.x2 > other.x1 && self.y1 < other.y2 && self.y2 > other.y1
    }

    /// Inclusive point containment.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x1 && point.x <= self.x2 && point.y >= self.y1 && point.y <= self.y2
    }

    /// Width of the rectangle.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    /// Height of the rectangle.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }
}
