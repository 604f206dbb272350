use glam::Vec2;

use crate::api::NarrowphaseApi;
use crate::geom::{Circle, Polygon, Rect, Segment};
use crate::shape::{PlacedShape, Shape, lazy_square};

/// Exact shape-pair intersection tests.
pub struct Narrowphase;

impl NarrowphaseApi for Narrowphase {
    fn point_point(a: Vec2, b: Vec2) -> bool {
        a == b
    }

    fn point_box(p: Vec2, rect: &Rect) -> bool {
        rect.contains(p)
    }

    fn point_circle(p: Vec2, circle: &Circle) -> bool {
        circle.contains(p)
    }

    fn point_line(p: Vec2, line: &Segment) -> bool {
        line.has_point(p)
    }

    fn point_polygon(p: Vec2, polygon: &Polygon) -> bool {
        polygon.contains(p)
    }

    fn line_line(a: &Segment, b: &Segment) -> bool {
        a.intersects(b)
    }

    fn line_box(line: &Segment, rect: &Rect) -> bool {
        // A segment entirely inside the box crosses none of its edges.
        if rect.contains(line.a) || rect.contains(line.b) {
            return true;
        }
        rect.edges().iter().any(|edge| edge.intersects(line))
    }

    fn line_circle(line: &Segment, circle: &Circle) -> bool {
        line.intersects_circle(circle)
    }

    fn line_polygon(line: &Segment, polygon: &Polygon) -> bool {
        polygon.intersects_segment(line)
    }

    fn box_box(a: &Rect, b: &Rect) -> bool {
        a.touches(b)
    }

    fn box_circle(rect: &Rect, circle: &Circle) -> bool {
        circle.intersects_rect(rect)
    }

    fn box_polygon(rect: &Rect, polygon: &Polygon) -> bool {
        polygon.intersects_rect(rect)
    }

    fn circle_circle(a: &Circle, b: &Circle) -> bool {
        a.intersects_circle(b)
    }

    fn circle_polygon(circle: &Circle, polygon: &Polygon) -> bool {
        polygon.intersects_circle(circle)
    }

    fn polygon_polygon(a: &Polygon, b: &Polygon) -> bool {
        a.intersects_polygon(b)
    }

    fn lazy_box(lazy: &Circle, rect: &Rect) -> bool {
        lazy_square(lazy).touches(rect)
    }

    fn segment_rect_toi(a: Vec2, b: Vec2, rect: &Rect) -> Option<f32> {
        // Slab clip of the parametric segment against both axes.
        let d = b - a;
        let mut tmin = 0.0f32;
        let mut tmax = 1.0f32;

        for axis in 0..2 {
            let (o, dir, lo, hi) = (a[axis], d[axis], rect.min[axis], rect.max[axis]);
            if dir.abs() < f32::EPSILON {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / dir;
            let mut t1 = (lo - o) * inv;
            let mut t2 = (hi - o) * inv;
            if t1 > t2 {
                core::mem::swap(&mut t1, &mut t2);
            }
            tmin = tmin.max(t1);
            tmax = tmax.min(t2);
            if tmin > tmax {
                return None;
            }
        }

        Some(tmin)
    }

    fn collides_with(shape_a: &Shape, position_a: Vec2, shape_b: &Shape, position_b: Vec2) -> bool {
        let a = shape_a.at(position_a);
        let b = shape_b.at(position_b);
        Self::collides_placed(&a, &b)
    }
}

impl Narrowphase {
    /// Dispatch over two world-space shapes. Operands are put in
    /// [`crate::shape::ShapeKind`] order first, so each unordered pair has
    /// exactly one arm.
    pub fn collides_placed(a: &PlacedShape, b: &PlacedShape) -> bool {
        use PlacedShape as P;

        let (a, b) = if a.kind() <= b.kind() { (a, b) } else { (b, a) };
        match (a, b) {
            (P::Point(p), P::Point(q)) => Self::point_point(*p, *q),
            (P::Point(p), P::Line(l)) => Self::point_line(*p, l),
            (P::Point(p), P::Box(r)) => Self::point_box(*p, r),
            (P::Point(p), P::Circle(c)) => Self::point_circle(*p, c),
            (P::Point(p), P::Polygon(poly)) => Self::point_polygon(*p, poly),
            (P::Point(p), P::Lazy(c)) => Self::point_circle(*p, c),

            (P::Line(l), P::Line(m)) => Self::line_line(l, m),
            (P::Line(l), P::Box(r)) => Self::line_box(l, r),
            (P::Line(l), P::Circle(c)) => Self::line_circle(l, c),
            (P::Line(l), P::Polygon(poly)) => Self::line_polygon(l, poly),
            (P::Line(l), P::Lazy(c)) => Self::line_circle(l, c),

            (P::Box(r), P::Box(s)) => Self::box_box(r, s),
            (P::Box(r), P::Circle(c)) => Self::box_circle(r, c),
            (P::Box(r), P::Polygon(poly)) => Self::box_polygon(r, poly),
            (P::Box(r), P::Lazy(c)) => Self::lazy_box(c, r),

            (P::Circle(c), P::Circle(d)) => Self::circle_circle(c, d),
            (P::Circle(c), P::Polygon(poly)) => Self::circle_polygon(c, poly),
            (P::Circle(c), P::Lazy(d)) => Self::circle_circle(c, d),

            (P::Polygon(p), P::Polygon(q)) => Self::polygon_polygon(p, q),
            (P::Polygon(poly), P::Lazy(c)) => Self::circle_polygon(c, poly),

            (P::Lazy(c), P::Lazy(d)) => Self::circle_circle(c, d),

            (a, b) => {
                tracing::error!(a = ?a.kind(), b = ?b.kind(), "invalid collision check");
                unreachable!("invalid collision check {:?} & {:?}", a.kind(), b.kind())
            }
        }
    }
}
