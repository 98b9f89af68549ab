//! Geometry primitives shared by the quality metrics.
//!
//! Coordinates use a top-left origin: x grows rightward, y grows downward and
//! `Rect::x`/`Rect::y` is the top-left corner. Every function here is total:
//! degenerate (zero-size) rectangles and zero-length segments never panic.

use serde::{Deserialize, Serialize};

const ORIENTATION_EPS: f64 = 1e-9;
const ON_SEGMENT_EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y).min(f64::MAX)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    fn approx_eq(&self, other: Point) -> bool {
        (self.x - other.x).abs() <= ON_SEGMENT_EPS && (self.y - other.y).abs() <= ON_SEGMENT_EPS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
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

    pub fn from_parts(position: Point, size: Size) -> Self {
        Self::new(position.x, position.y, size.width, size.height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Bounding union of two rectangles.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, (right - x).min(f64::MAX), (bottom - y).min(f64::MAX))
    }

    pub fn inflate(&self, pad: f64) -> Rect {
        if pad <= 0.0 {
            return *self;
        }
        Rect::new(
            self.x - pad,
            self.y - pad,
            self.width + pad * 2.0,
            self.height + pad * 2.0,
        )
    }
}

/// True when the two rectangles share an intersection of positive area.
/// Touching edges do not count.
pub fn rectangles_overlap(a: &Rect, b: &Rect) -> bool {
    if a.is_degenerate() || b.is_degenerate() {
        return false;
    }
    overlap_area(a, b) > 0.0
}

pub fn overlap_area(a: &Rect, b: &Rect) -> f64 {
    let x0 = a.x.max(b.x);
    let y0 = a.y.max(b.y);
    let x1 = a.right().min(b.right());
    let y1 = a.bottom().min(b.bottom());
    let w = (x1 - x0).max(0.0);
    let h = (y1 - y0).max(0.0);
    w * h
}

/// True when `inner` lies within `outer` expanded by `tolerance` on every side.
///
/// A zero-size rectangle only contains an identical zero-size rectangle.
pub fn rectangle_contains(outer: &Rect, inner: &Rect, tolerance: f64) -> bool {
    if outer.is_degenerate() {
        return inner.is_degenerate()
            && Point::new(outer.x, outer.y).approx_eq(Point::new(inner.x, inner.y))
            && (outer.width - inner.width).abs() <= ON_SEGMENT_EPS
            && (outer.height - inner.height).abs() <= ON_SEGMENT_EPS;
    }
    containment_overflow(outer, inner) <= tolerance.max(0.0)
}

/// Largest distance by which `inner` pokes out of `outer` on any side,
/// 0 when fully inside.
pub fn containment_overflow(outer: &Rect, inner: &Rect) -> f64 {
    let left = outer.x - inner.x;
    let top = outer.y - inner.y;
    let right = inner.right() - outer.right();
    let bottom = inner.bottom() - outer.bottom();
    left.max(top).max(right).max(bottom).clamp(0.0, f64::MAX)
}

/// Edge-to-edge separation: the larger of the horizontal and vertical gaps,
/// floored at 0 for rectangles that touch or overlap.
pub fn rect_gap(a: &Rect, b: &Rect) -> f64 {
    let dx = a.x.max(b.x) - a.right().min(b.right());
    let dy = a.y.max(b.y) - a.bottom().min(b.bottom());
    dx.max(dy).clamp(0.0, f64::MAX)
}

pub(crate) fn orientation(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn point_on_segment(point: Point, a: Point, b: Point) -> bool {
    point.x >= a.x.min(b.x) - ON_SEGMENT_EPS
        && point.x <= a.x.max(b.x) + ON_SEGMENT_EPS
        && point.y >= a.y.min(b.y) - ON_SEGMENT_EPS
        && point.y <= a.y.max(b.y) + ON_SEGMENT_EPS
}

/// Standard orientation test; collinear overlapping segments intersect.
pub fn segments_intersect(p1: Point, p2: Point, p3: Point, p4: Point) -> bool {
    let o1 = orientation(p1, p2, p3);
    let o2 = orientation(p1, p2, p4);
    let o3 = orientation(p3, p4, p1);
    let o4 = orientation(p3, p4, p2);
    let crosses = ((o1 > ORIENTATION_EPS && o2 < -ORIENTATION_EPS)
        || (o1 < -ORIENTATION_EPS && o2 > ORIENTATION_EPS))
        && ((o3 > ORIENTATION_EPS && o4 < -ORIENTATION_EPS)
            || (o3 < -ORIENTATION_EPS && o4 > ORIENTATION_EPS));
    if crosses {
        return true;
    }
    if o1.abs() <= ORIENTATION_EPS && point_on_segment(p3, p1, p2) {
        return true;
    }
    if o2.abs() <= ORIENTATION_EPS && point_on_segment(p4, p1, p2) {
        return true;
    }
    if o3.abs() <= ORIENTATION_EPS && point_on_segment(p1, p3, p4) {
        return true;
    }
    if o4.abs() <= ORIENTATION_EPS && point_on_segment(p2, p3, p4) {
        return true;
    }
    false
}

/// Both segments lie on the same line.
pub(crate) fn segments_collinear(p1: Point, p2: Point, p3: Point, p4: Point) -> bool {
    orientation(p1, p2, p3).abs() <= ORIENTATION_EPS
        && orientation(p1, p2, p4).abs() <= ORIENTATION_EPS
}

/// Intersection point of two segments, assuming they intersect. Collinear
/// overlaps report the midpoint of the shared stretch.
pub(crate) fn intersection_point(p1: Point, p2: Point, p3: Point, p4: Point) -> Point {
    let d = (p2.x - p1.x) * (p4.y - p3.y) - (p2.y - p1.y) * (p4.x - p3.x);
    if d.abs() <= ORIENTATION_EPS {
        let mut shared: Vec<Point> = [p1, p2, p3, p4]
            .into_iter()
            .filter(|p| point_on_segment(*p, p1, p2) && point_on_segment(*p, p3, p4))
            .collect();
        if shared.is_empty() {
            shared.push(p1);
        }
        let n = shared.len() as f64;
        let sx: f64 = shared.iter().map(|p| p.x).sum();
        let sy: f64 = shared.iter().map(|p| p.y).sum();
        return Point::new(sx / n, sy / n);
    }
    let t = ((p3.x - p1.x) * (p4.y - p3.y) - (p3.y - p1.y) * (p4.x - p3.x)) / d;
    Point::new(p1.x + t * (p2.x - p1.x), p1.y + t * (p2.y - p1.y))
}

pub(crate) fn same_point(a: Point, b: Point) -> bool {
    a.approx_eq(b)
}
