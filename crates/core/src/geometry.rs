//! Basic geometric types. All coordinates here are in **pixel space**: a flat
//! Cartesian plane where `(0, 0)` is the top-left corner of the image, `x`
//! grows to the right and `y` grows downward.

use derive_more::{
    Add, AddAssign, Display, Div, DivAssign, From, Into, Mul, MulAssign, Neg,
    Sub, SubAssign, Sum,
};
use serde::{Deserialize, Serialize};
use std::{error::Error, f64::consts::FRAC_PI_3};

/// A parameter handed to the grid geometry was unusable: a scale that isn't
/// strictly positive, or a coordinate that isn't finite. These would
/// otherwise lead to zero-length pitches (and with them, endless grid
/// enumeration) or meaningless containment results.
#[derive(Clone, Debug, Display, PartialEq)]
#[display(fmt = "invalid parameter `{}`: {}", "self.name", "self.reason")]
pub struct InvalidParameter {
    /// Name of the offending parameter
    pub name: &'static str,
    /// Human-readable description of what was wrong with it
    pub reason: String,
}

impl InvalidParameter {
    pub fn new(name: &'static str, reason: impl Into<String>) -> Self {
        Self {
            name,
            reason: reason.into(),
        }
    }
}

impl Error for InvalidParameter {}

/// A 2D point in pixel space.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Display,
    PartialEq,
    PartialOrd,
    From,
    Into,
    Neg,
    Add,
    Sub,
    Mul,
    Div,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    Sum,
    Serialize,
    Deserialize,
)]
#[display(fmt = "({}, {})", "self.x", "self.y")]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Is each component a real number (not NaN or infinite)?
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn distance_to(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// The six vertices of one hexagon, in canonical order.
pub type HexVertices = [Point2; 6];

/// Compute the vertices of a flat-topped hexagon. Vertex `i` sits at an angle
/// of `i * 60°` from the positive x axis, so vertices 0 and 3 lie on the
/// horizontal line through the center and the top and bottom edges are flat.
/// Since `y` grows downward in pixel space, increasing angles run clockwise
/// on screen. This order is used for every stroke and containment check.
pub fn hex_vertices(center: Point2, radius: f64) -> HexVertices {
    let mut vertices = [center; 6];
    for (i, vertex) in vertices.iter_mut().enumerate() {
        let theta = FRAC_PI_3 * i as f64;
        vertex.x += radius * theta.cos();
        vertex.y += radius * theta.sin();
    }
    vertices
}

/// Test if a point is inside a polygon, using ray casting with the even-odd
/// rule. A ray is cast from the point in the +x direction and each polygon
/// edge it crosses toggles the result.
///
/// Points exactly on the boundary get whatever answer the strict comparisons
/// below produce. That answer is stable for identical inputs, but no promises
/// beyond that. Anything with fewer than 3 vertices contains nothing.
pub fn point_in_polygon(point: Point2, vertices: &[Point2]) -> bool {
    let n = vertices.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let vi = vertices[i];
        let vj = vertices[j];
        // An edge only counts if it straddles the ray's height. A horizontal
        // edge never straddles, so the division can't hit zero
        if (vi.y > point.y) != (vj.y > point.y) {
            let x_intercept =
                (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x;
            if point.x < x_intercept {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// A closed region in pixel space, defined by its boundary. Vertices are in
/// boundary order, and the last vertex connects back to the first.
///
/// A polygon with fewer than 3 vertices is still representable (it's a path
/// someone is in the middle of drawing), but it isn't a region. It contains
/// no points and is ignored by masking.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point2>,
}

impl Polygon {
    /// Build a polygon from its boundary vertices. Returns an error if any
    /// coordinate is NaN or infinite.
    pub fn new(vertices: Vec<Point2>) -> Result<Self, InvalidParameter> {
        if let Some((i, vertex)) =
            vertices.iter().enumerate().find(|(_, v)| !v.is_finite())
        {
            return Err(InvalidParameter::new(
                "vertices",
                format!("vertex {} is not finite: {}", i, vertex),
            ));
        }
        Ok(Self { vertices })
    }

    pub fn vertices(&self) -> &[Point2] {
        &self.vertices
    }

    /// Does this polygon enclose any area? Only regions take part in masking.
    pub fn is_region(&self) -> bool {
        self.vertices.len() >= 3
    }

    /// Get the bounding box as `(min, max)` corners. `None` if the polygon
    /// has no vertices at all.
    pub fn bounding_box(&self) -> Option<(Point2, Point2)> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().fold((first, first), |(min, max), v| {
            (
                Point2::new(min.x.min(v.x), min.y.min(v.y)),
                Point2::new(max.x.max(v.x), max.y.max(v.y)),
            )
        }))
    }

    /// Is the point inside this polygon? See [point_in_polygon] for the exact
    /// rule.
    pub fn contains(&self, point: Point2) -> bool {
        // Bounding box rejection. Ray casting can only count a crossing when
        // the point's y is strictly within the y range of some edge and its x
        // is strictly left of that edge, so anything outside the box is out
        match self.bounding_box() {
            Some((min, max))
                if point.y >= min.y && point.y < max.y && point.x < max.x =>
            {
                point_in_polygon(point, &self.vertices)
            }
            _ => false,
        }
    }
}
