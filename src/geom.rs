//! World-space geometric primitives and their exact predicates.
//!
//! Every predicate here is boundary-inclusive: touching counts as
//! intersecting.

use glam::{IVec2, Vec2};

/// Tolerance for "point lies on segment" tests.
pub const ON_SEGMENT_EPS: f32 = 1e-4;

/// Axis-aligned rectangle in world units (`min` is top-left, y grows down).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min: min.min(max), max: min.max(max) }
    }

    pub fn from_xywh(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(Vec2::new(x, y), Vec2::new(x + w, y + h))
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn translate(self, by: Vec2) -> Self {
        Self { min: self.min + by, max: self.max + by }
    }

    /// Inclusive containment.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Inclusive overlap: shared edges and corners count.
    pub fn touches(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// Squared distance from `p` to the closest point of the rectangle (0 inside).
    pub fn distance_sq_to_point(&self, p: Vec2) -> f32 {
        let closest = p.clamp(self.min, self.max);
        (closest - p).length_squared()
    }

    /// Corners in clockwise order starting at top-left.
    pub fn corners(&self) -> [Vec2; 4] {
        [
            self.min,
            Vec2::new(self.max.x, self.min.y),
            self.max,
            Vec2::new(self.min.x, self.max.y),
        ]
    }

    /// Boundary segments: top, right, bottom, left.
    pub fn edges(&self) -> [Segment; 4] {
        let [tl, tr, br, bl] = self.corners();
        [Segment::new(tl, tr), Segment::new(tr, br), Segment::new(br, bl), Segment::new(bl, tl)]
    }

    pub fn union(&self, other: &Rect) -> Rect {
        Rect { min: self.min.min(other.min), max: self.max.max(other.max) }
    }
}

/// Integer rectangle: pixel bounds or a half-open range of grid cells.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct IntRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl IntRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Smallest integer rect covering `r`: min floored, max ceiled.
    pub fn covering(r: &Rect) -> Self {
        let x0 = r.min.x.floor() as i32;
        let y0 = r.min.y.floor() as i32;
        let x1 = r.max.x.ceil() as i32;
        let y1 = r.max.y.ceil() as i32;
        Self::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn translate(self, by: IVec2) -> Self {
        Self { x: self.x + by.x, y: self.y + by.y, ..self }
    }

    pub fn union(&self, other: &IntRect) -> IntRect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        IntRect::new(x, y, self.right().max(other.right()) - x, self.bottom().max(other.bottom()) - y)
    }

    /// Cells `[x, right) x [y, bottom)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = IVec2> + use<> {
        let (x0, x1) = (self.x, self.right());
        (self.y..self.bottom()).flat_map(move |y| (x0..x1).map(move |x| IVec2::new(x, y)))
    }

    pub fn to_rect(&self) -> Rect {
        Rect::from_xywh(self.x as f32, self.y as f32, self.width as f32, self.height as f32)
    }
}

/// Signed area of the triangle `p, q, r` (twice). Positive when `r` is left of `p -> q`.
fn orient(p: Vec2, q: Vec2, r: Vec2) -> f32 {
    (q - p).perp_dot(r - p)
}

/// `r` lies within the bounding box of `p`-`q` (collinearity is checked by the caller).
fn within(p: Vec2, q: Vec2, r: Vec2) -> bool {
    r.x >= p.x.min(q.x) && r.x <= p.x.max(q.x) && r.y >= p.y.min(q.y) && r.y <= p.y.max(q.y)
}

/// Closed line segment.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Segment {
    pub a: Vec2,
    pub b: Vec2,
}

impl Segment {
    pub const fn new(a: Vec2, b: Vec2) -> Self {
        Self { a, b }
    }

    pub fn translate(self, by: Vec2) -> Self {
        Self { a: self.a + by, b: self.b + by }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.a, self.b)
    }

    /// Segment-segment intersection; collinear overlap and shared endpoints count.
    pub fn intersects(&self, other: &Segment) -> bool {
        let d1 = orient(other.a, other.b, self.a);
        let d2 = orient(other.a, other.b, self.b);
        let d3 = orient(self.a, self.b, other.a);
        let d4 = orient(self.a, self.b, other.b);

        let straddles = |u: f32, v: f32| (u > 0.0 && v < 0.0) || (u < 0.0 && v > 0.0);
        if straddles(d1, d2) && straddles(d3, d4) {
            return true;
        }

        (d1 == 0.0 && within(other.a, other.b, self.a))
            || (d2 == 0.0 && within(other.a, other.b, self.b))
            || (d3 == 0.0 && within(self.a, self.b, other.a))
            || (d4 == 0.0 && within(self.a, self.b, other.b))
    }

    /// Squared distance from `p` to the closest point on the segment.
    pub fn distance_sq_to_point(&self, p: Vec2) -> f32 {
        let d = self.b - self.a;
        let len_sq = d.length_squared();
        if len_sq == 0.0 {
            return (p - self.a).length_squared();
        }
        let t = ((p - self.a).dot(d) / len_sq).clamp(0.0, 1.0);
        (self.a + d * t - p).length_squared()
    }

    pub fn has_point(&self, p: Vec2) -> bool {
        self.distance_sq_to_point(p) <= ON_SEGMENT_EPS * ON_SEGMENT_EPS
    }

    pub fn intersects_circle(&self, c: &Circle) -> bool {
        self.distance_sq_to_point(c.center) <= c.radius * c.radius
    }
}

/// Closed disc.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub const fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn translate(self, by: Vec2) -> Self {
        Self { center: self.center + by, ..self }
    }

    pub fn bounds(&self) -> Rect {
        let r = Vec2::splat(self.radius);
        Rect { min: self.center - r, max: self.center + r }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        (p - self.center).length_squared() <= self.radius * self.radius
    }

    /// Squared-distance test, no square root.
    pub fn intersects_circle(&self, other: &Circle) -> bool {
        let rsum = self.radius + other.radius;
        (self.center - other.center).length_squared() <= rsum * rsum
    }

    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        // Centre inside the box.
        if rect.contains(self.center) {
            return true;
        }
        // Closest point of the box (covers the corners).
        let r_sq = self.radius * self.radius;
        if rect.distance_sq_to_point(self.center) <= r_sq {
            return true;
        }
        rect.edges().iter().any(|e| e.intersects_circle(self))
    }
}

/// Convex polygon, vertices in either winding.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    pub vertices: Vec<Vec2>,
}

impl Polygon {
    pub fn new(vertices: Vec<Vec2>) -> Self {
        Self { vertices }
    }

    pub fn from_rect(r: &Rect) -> Self {
        Self { vertices: r.corners().to_vec() }
    }

    pub fn translate(&self, by: Vec2) -> Self {
        Self { vertices: self.vertices.iter().map(|v| *v + by).collect() }
    }

    pub fn bounds(&self) -> Rect {
        let mut min = Vec2::splat(f32::INFINITY);
        let mut max = Vec2::splat(f32::NEG_INFINITY);
        for v in &self.vertices {
            min = min.min(*v);
            max = max.max(*v);
        }
        Rect { min, max }
    }

    pub fn edges(&self) -> impl Iterator<Item = Segment> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| Segment::new(self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Inclusive point-in-convex-polygon.
    pub fn contains(&self, p: Vec2) -> bool {
        let mut pos = false;
        let mut neg = false;
        for e in self.edges() {
            let o = orient(e.a, e.b, p);
            if o > 0.0 {
                pos = true;
            } else if o < 0.0 {
                neg = true;
            }
            if pos && neg {
                return false;
            }
        }
        true
    }

    /// Separating-axis test between two convex polygons.
    pub fn intersects_polygon(&self, other: &Polygon) -> bool {
        !has_separating_axis(&self.vertices, &other.vertices)
            && !has_separating_axis(&other.vertices, &self.vertices)
    }

    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        self.intersects_polygon(&Polygon::from_rect(rect))
    }

    pub fn intersects_circle(&self, c: &Circle) -> bool {
        if self.contains(c.center) {
            return true;
        }
        self.edges().any(|e| e.intersects_circle(c))
    }

    pub fn intersects_segment(&self, s: &Segment) -> bool {
        if self.contains(s.a) || self.contains(s.b) {
            return true;
        }
        self.edges().any(|e| e.intersects(s))
    }
}

/// True if some edge normal of `reference` separates the two vertex sets.
fn has_separating_axis(reference: &[Vec2], test: &[Vec2]) -> bool {
    let n = reference.len();
    for i in 0..n {
        let edge = reference[(i + 1) % n] - reference[i];
        let axis = edge.perp();
        if axis == Vec2::ZERO {
            continue;
        }
        let (min_a, max_a) = project(reference, axis);
        let (min_b, max_b) = project(test, axis);
        if max_a < min_b || max_b < min_a {
            return true;
        }
    }
    false
}

fn project(verts: &[Vec2], axis: Vec2) -> (f32, f32) {
    let mut lo = f32::INFINITY;
    let mut hi = f32::NEG_INFINITY;
    for v in verts {
        let d = v.dot(axis);
        lo = lo.min(d);
        hi = hi.max(d);
    }
    (lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    #[test]
    fn test_rect_touches_is_inclusive() {
        let a = Rect::from_xywh(0.0, 0.0, 1.0, 1.0);
        let b = Rect::from_xywh(1.0, 0.0, 1.0, 1.0);
        let c = Rect::from_xywh(1.01, 0.0, 1.0, 1.0);
        assert!(a.touches(&b));
        assert!(!a.touches(&c));
    }

    #[test]
    fn test_int_rect_covering_rounds_outward() {
        let r = IntRect::covering(&Rect::from_xywh(0.5, -0.5, 1.2, 1.0));
        assert_eq!(r, IntRect::new(0, -1, 2, 2));
        assert_eq!(r.cells().count(), 4);
    }

    #[test]
    fn test_segments_cross_and_touch() {
        let a = Segment::new(v(0.0, 0.0), v(4.0, 4.0));
        let b = Segment::new(v(0.0, 4.0), v(4.0, 0.0));
        assert!(a.intersects(&b));
        // shared endpoint
        let c = Segment::new(v(4.0, 4.0), v(8.0, 0.0));
        assert!(a.intersects(&c));
        // collinear overlap
        let d = Segment::new(v(2.0, 2.0), v(6.0, 6.0));
        assert!(a.intersects(&d));
        // collinear, disjoint
        let e = Segment::new(v(5.0, 5.0), v(6.0, 6.0));
        assert!(!a.intersects(&e));
        // parallel
        let f = Segment::new(v(0.0, 1.0), v(4.0, 5.0));
        assert!(!a.intersects(&f));
    }

    #[test]
    fn test_segment_has_point() {
        let s = Segment::new(v(0.0, 0.0), v(10.0, 0.0));
        assert!(s.has_point(v(5.0, 0.0)));
        assert!(s.has_point(v(10.0, 0.0)));
        assert!(!s.has_point(v(10.5, 0.0)));
        assert!(!s.has_point(v(5.0, 0.1)));
    }

    #[test]
    fn test_circle_rect_edge_overlap() {
        let r = Rect::from_xywh(0.0, 0.0, 10.0, 10.0);
        // centre outside, overlapping the right edge
        assert!(Circle::new(v(12.0, 5.0), 2.0).intersects_rect(&r));
        // near a corner but outside its reach
        assert!(!Circle::new(v(12.0, 12.0), 2.0).intersects_rect(&r));
        assert!(Circle::new(v(12.0, 12.0), 2.9).intersects_rect(&r));
    }

    #[test]
    fn test_polygon_containment_either_winding() {
        let cw = Polygon::new(vec![v(0.0, 0.0), v(4.0, 0.0), v(4.0, 4.0), v(0.0, 4.0)]);
        let ccw = Polygon::new(vec![v(0.0, 0.0), v(0.0, 4.0), v(4.0, 4.0), v(4.0, 0.0)]);
        for p in [&cw, &ccw] {
            assert!(p.contains(v(2.0, 2.0)));
            assert!(p.contains(v(4.0, 2.0)));
            assert!(!p.contains(v(5.0, 2.0)));
        }
    }

    #[test]
    fn test_polygon_sat() {
        let tri = Polygon::new(vec![v(0.0, 0.0), v(4.0, 0.0), v(0.0, 4.0)]);
        // Box just past the hypotenuse.
        assert!(!tri.intersects_rect(&Rect::from_xywh(2.5, 2.5, 1.0, 1.0)));
        assert!(tri.intersects_rect(&Rect::from_xywh(1.5, 1.5, 1.0, 1.0)));
        let other = tri.translate(v(4.0, 0.0));
        // shares the vertex (4, 0)
        assert!(tri.intersects_polygon(&other));
    }

    #[test]
    fn test_polygon_segment_inside() {
        let sq = Polygon::from_rect(&Rect::from_xywh(0.0, 0.0, 10.0, 10.0));
        assert!(sq.intersects_segment(&Segment::new(v(2.0, 2.0), v(3.0, 3.0))));
        assert!(!sq.intersects_segment(&Segment::new(v(11.0, 2.0), v(13.0, 3.0))));
    }
}
