//! Epipolar guide-line and corridor geometry
//!
//! A guide line `ax + by + c = 0` in source space is clipped against the
//! visible viewport, either as a single segment or, when a channel width is
//! given, as the two shaded "outside the corridor" polygons. The polygons
//! are built with a half-plane clip of the viewport rectangle against each
//! offset line, which handles every line orientation uniformly, including
//! purely horizontal and vertical lines.
//!
//! Viewport edges follow the pixel convention `x ∈ [0, w−1]`,
//! `y ∈ [0, h−1]`, both inclusive.

use crate::domain::{Point, TargetRole};
use crate::error::OverlayError;

/// Coefficients of a line `ax + by + c = 0` in source-image space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineEq {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl LineEq {
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    /// Signed value of `ax + by + c` at a point
    pub fn eval(&self, p: Point) -> f64 {
        self.a * p.x + self.b * p.y + self.c
    }

    /// Euclidean norm of the line direction, `sqrt(a² + b²)`
    pub fn norm(&self) -> f64 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    /// Whether the coefficients define no direction at all
    pub fn is_degenerate(&self) -> bool {
        self.a == 0.0 && self.b == 0.0
    }

    /// The two lines at perpendicular Euclidean distance `distance` on
    /// either side: constants `c − d·‖(a,b)‖` and `c + d·‖(a,b)‖`
    pub fn offset(&self, distance: f64) -> (LineEq, LineEq) {
        let shift = distance * self.norm();
        (
            LineEq::new(self.a, self.b, self.c - shift),
            LineEq::new(self.a, self.b, self.c + shift),
        )
    }

    /// Solve for `y` at a given `x`; requires `b != 0`
    fn y_at(&self, x: f64) -> Option<f64> {
        (self.b != 0.0).then(|| -(self.a * x + self.c) / self.b)
    }

    /// Solve for `x` at a given `y`; requires `a != 0`
    fn x_at(&self, y: f64) -> Option<f64> {
        (self.a != 0.0).then(|| -(self.b * y + self.c) / self.a)
    }
}

/// An installed epipolar guide for one target role
///
/// The clipped segment or corridor polygons are derived on every viewport
/// change, never stored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpipolarSpec {
    /// Which target point this guide corresponds to
    pub owner: TargetRole,
    pub line: LineEq,
    /// `0` draws a single guide line, `> 0` a corridor of this half-width
    pub channel_width: f64,
}

/// Clip a line to the viewport, producing the visible segment
///
/// Returns `None` when the line misses the viewport entirely and
/// [`OverlayError::GeometryDegenerate`] when the coefficients define no
/// line.
pub fn clip_segment(
    line: &LineEq,
    width: u32,
    height: u32,
) -> Result<Option<(Point, Point)>, OverlayError> {
    if line.is_degenerate() {
        return Err(OverlayError::GeometryDegenerate);
    }
    let x_max = (width.saturating_sub(1)) as f64;
    let y_max = (height.saturating_sub(1)) as f64;

    let mut candidates: Vec<Point> = Vec::with_capacity(4);
    let mut push = |p: Point| {
        // Edges share corners exactly once.
        if !candidates.iter().any(|q| p.distance(*q) < 1e-9) {
            candidates.push(p);
        }
    };

    for x in [0.0, x_max] {
        if let Some(y) = line.y_at(x)
            && (0.0..=y_max).contains(&y)
        {
            push(Point::new(x, y));
        }
    }
    for y in [0.0, y_max] {
        if let Some(x) = line.x_at(y)
            && (0.0..=x_max).contains(&x)
        {
            push(Point::new(x, y));
        }
    }

    if candidates.len() < 2 {
        return Ok(None);
    }

    // More than two candidates only happens with near-corner crossings;
    // take the farthest-apart pair.
    let mut best = (candidates[0], candidates[1]);
    let mut best_d = best.0.distance(best.1);
    for i in 0..candidates.len() {
        for j in (i + 1)..candidates.len() {
            let d = candidates[i].distance(candidates[j]);
            if d > best_d {
                best = (candidates[i], candidates[j]);
                best_d = d;
            }
        }
    }
    Ok(Some(best))
}

/// The two shaded polygons outside an epipolar corridor
///
/// For a channel of perpendicular half-width `half_width`, the returned
/// polygons cover the viewport regions beyond each offset line; the corridor
/// between them stays unshaded. Either polygon may be empty when that side
/// of the corridor misses the viewport.
pub fn corridor_polygons(
    line: &LineEq,
    half_width: f64,
    width: u32,
    height: u32,
) -> Result<(Vec<Point>, Vec<Point>), OverlayError> {
    if line.is_degenerate() {
        return Err(OverlayError::GeometryDegenerate);
    }
    let (lower, upper) = line.offset(half_width);
    let viewport = viewport_corners(width, height);

    // Beyond the lower offset line: eval(p) ≥ half_width·norm ⟺ lower.eval ≥ 0.
    let first = clip_half_plane(&viewport, |p| lower.eval(p));
    // Beyond the upper offset line: eval(p) ≤ −half_width·norm ⟺ upper.eval ≤ 0.
    let second = clip_half_plane(&viewport, |p| -upper.eval(p));
    Ok((first, second))
}

fn viewport_corners(width: u32, height: u32) -> [Point; 4] {
    let x_max = (width.saturating_sub(1)) as f64;
    let y_max = (height.saturating_sub(1)) as f64;
    [
        Point::new(0.0, 0.0),
        Point::new(x_max, 0.0),
        Point::new(x_max, y_max),
        Point::new(0.0, y_max),
    ]
}

/// Sutherland–Hodgman clip of a convex polygon against the half-plane
/// `f(p) ≥ 0`
fn clip_half_plane(polygon: &[Point], f: impl Fn(Point) -> f64) -> Vec<Point> {
    let mut out = Vec::with_capacity(polygon.len() + 1);
    for (i, &current) in polygon.iter().enumerate() {
        let previous = polygon[(i + polygon.len() - 1) % polygon.len()];
        let fc = f(current);
        let fp = f(previous);
        if fc >= 0.0 {
            if fp < 0.0 {
                out.push(edge_crossing(previous, current, fp, fc));
            }
            out.push(current);
        } else if fp >= 0.0 {
            out.push(edge_crossing(previous, current, fp, fc));
        }
    }
    out
}

/// Point where `f` changes sign along the segment, by linear interpolation
fn edge_crossing(from: Point, to: Point, f_from: f64, f_to: f64) -> Point {
    let t = f_from / (f_from - f_to);
    Point::new(
        from.x + t * (to.x - from.x),
        from.y + t * (to.y - from.y),
    )
}
