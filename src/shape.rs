//! Collider shapes in owner-local space and their world-space placements.

use glam::Vec2;

use crate::error::{CollisionError, Result, check_finite};
use crate::geom::{Circle, IntRect, Polygon, Rect, Segment};
use crate::types::CARVE_THRESHOLD;

/// Shape variant tag. Declaration order is the dispatcher's canonical
/// operand order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShapeKind {
    Point,
    Line,
    Box,
    Circle,
    Polygon,
    Lazy,
}

/// A collider shape, relative to its owner's position.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// Single point at `point`.
    Point { point: Vec2 },
    /// Segment from `start` to `end`.
    Line { start: Vec2, end: Vec2 },
    /// Axis-aligned box of `size`. `origin` is the pivot as a fraction of the
    /// size: (0,0) puts the top-left corner at `offset`, (0.5,0.5) centres it.
    Box { offset: Vec2, size: Vec2, origin: Vec2 },
    /// Disc of `radius` centred at `offset`.
    Circle { offset: Vec2, radius: f32 },
    /// Convex polygon; vertices are already owner-relative.
    Polygon { polygon: Polygon },
    /// Cheap circle substitute. Against boxes it is tested as the square of
    /// half-side `round(√2·r/2)`; against everything else as the true circle.
    Lazy { offset: Vec2, radius: f32 },
}

impl Shape {
    pub fn point(point: Vec2) -> Self {
        Shape::Point { point }
    }

    pub fn line(start: Vec2, end: Vec2) -> Self {
        Shape::Line { start, end }
    }

    /// Box whose top-left corner sits at `offset`.
    pub fn new_box(offset: Vec2, size: Vec2) -> Result<Self> {
        Self::box_with_origin(offset, size, Vec2::ZERO)
    }

    pub fn box_with_origin(offset: Vec2, size: Vec2, origin: Vec2) -> Result<Self> {
        check_finite(offset)?;
        check_finite(origin)?;
        if !(size.is_finite() && size.x >= 0.0 && size.y >= 0.0) {
            return Err(CollisionError::InvalidBoxSize { width: size.x, height: size.y });
        }
        Ok(Shape::Box { offset, size, origin })
    }

    pub fn circle(offset: Vec2, radius: f32) -> Result<Self> {
        check_finite(offset)?;
        check_radius(radius)?;
        Ok(Shape::Circle { offset, radius })
    }

    pub fn lazy(offset: Vec2, radius: f32) -> Result<Self> {
        check_finite(offset)?;
        check_radius(radius)?;
        Ok(Shape::Lazy { offset, radius })
    }

    pub fn polygon(vertices: Vec<Vec2>) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(CollisionError::DegeneratePolygon { count: vertices.len() });
        }
        for v in &vertices {
            check_finite(*v)?;
        }
        Ok(Shape::Polygon { polygon: Polygon::new(vertices) })
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Point { .. } => ShapeKind::Point,
            Shape::Line { .. } => ShapeKind::Line,
            Shape::Box { .. } => ShapeKind::Box,
            Shape::Circle { .. } => ShapeKind::Circle,
            Shape::Polygon { .. } => ShapeKind::Polygon,
            Shape::Lazy { .. } => ShapeKind::Lazy,
        }
    }

    /// Exact bounds in owner-local space.
    pub fn local_bounds(&self) -> Rect {
        match self {
            Shape::Point { point } => Rect { min: *point, max: *point },
            Shape::Line { start, end } => Rect::new(*start, *end),
            Shape::Box { offset, size, origin } => box_rect(*offset, *size, *origin, Vec2::ZERO),
            Shape::Circle { offset, radius } | Shape::Lazy { offset, radius } => {
                Circle::new(*offset, *radius).bounds()
            }
            Shape::Polygon { polygon } => polygon.bounds(),
        }
    }

    /// Integer bounds at `position`: min floored, max ceiled, so the box
    /// never under-covers the shape.
    pub fn bounding_box(&self, position: Vec2) -> IntRect {
        IntRect::covering(&self.local_bounds().translate(position))
    }

    /// This shape moved into world space by its owner's `position`.
    pub fn at(&self, position: Vec2) -> PlacedShape {
        match self {
            Shape::Point { point } => PlacedShape::Point(*point + position),
            Shape::Line { start, end } => PlacedShape::Line(Segment::new(*start + position, *end + position)),
            Shape::Box { offset, size, origin } => PlacedShape::Box(box_rect(*offset, *size, *origin, position)),
            Shape::Circle { offset, radius } => PlacedShape::Circle(Circle::new(*offset + position, *radius)),
            Shape::Polygon { polygon } => PlacedShape::Polygon(polygon.translate(position)),
            Shape::Lazy { offset, radius } => PlacedShape::Lazy(Circle::new(*offset + position, *radius)),
        }
    }
}

fn check_radius(radius: f32) -> Result<()> {
    if radius.is_finite() && radius >= 0.0 {
        Ok(())
    } else {
        Err(CollisionError::InvalidRadius { radius })
    }
}

fn box_rect(offset: Vec2, size: Vec2, origin: Vec2, position: Vec2) -> Rect {
    let min = offset + position - (origin * size).round();
    Rect { min, max: min + size }
}

/// The approximation square used for lazy shapes against boxes.
///
/// Symmetric about the centre on both axes: `[c - s, c + s]` with
/// `s = round(√2·r/2)`. The x range is not shifted to `[c - s + 1, c + s]`;
/// both axes use the same span.
pub fn lazy_square(lazy: &Circle) -> Rect {
    let half = (std::f32::consts::SQRT_2 * lazy.radius / 2.0).round();
    let h = Vec2::splat(half);
    Rect { min: lazy.center - h, max: lazy.center + h }
}

/// A shape translated into world space, ready for narrow-phase predicates.
#[derive(Clone, Debug, PartialEq)]
pub enum PlacedShape {
    Point(Vec2),
    Line(Segment),
    Box(Rect),
    Circle(Circle),
    Polygon(Polygon),
    Lazy(Circle),
}

impl PlacedShape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            PlacedShape::Point(_) => ShapeKind::Point,
            PlacedShape::Line(_) => ShapeKind::Line,
            PlacedShape::Box(_) => ShapeKind::Box,
            PlacedShape::Circle(_) => ShapeKind::Circle,
            PlacedShape::Polygon(_) => ShapeKind::Polygon,
            PlacedShape::Lazy(_) => ShapeKind::Lazy,
        }
    }

    /// Exact world-space bounds.
    pub fn bounds(&self) -> Rect {
        match self {
            PlacedShape::Point(p) => Rect { min: *p, max: *p },
            PlacedShape::Line(s) => s.bounds(),
            PlacedShape::Box(r) => *r,
            PlacedShape::Circle(c) | PlacedShape::Lazy(c) => c.bounds(),
            PlacedShape::Polygon(p) => p.bounds(),
        }
    }
}

/// The ordered shape list of one entity plus its solidity flag.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Collider {
    pub shapes: Vec<Shape>,
    /// Participates in static blocking (as opposed to sensor-only).
    pub solid: bool,
}

impl Collider {
    pub fn new(shapes: Vec<Shape>, solid: bool) -> Self {
        Self { shapes, solid }
    }

    pub fn solid(shapes: Vec<Shape>) -> Self {
        Self::new(shapes, true)
    }

    pub fn sensor(shapes: Vec<Shape>) -> Self {
        Self::new(shapes, false)
    }

    /// Union of every shape's [`Shape::bounding_box`] at `position`. An empty
    /// collider yields a zero-sized rect at the floored position.
    pub fn bounding_box(&self, position: Vec2) -> IntRect {
        let mut shapes = self.shapes.iter();
        let Some(first) = shapes.next() else {
            let p = position.floor();
            return IntRect::new(p.x as i32, p.y as i32, 0, 0);
        };
        shapes.fold(first.bounding_box(position), |acc, s| acc.union(&s.bounding_box(position)))
    }

    /// Grid cells covered by the collider, snapping each edge to the nearest
    /// grid line unless it would move by more than [`CARVE_THRESHOLD`] of a
    /// cell. Always at least one cell wide and tall.
    pub fn carve_bounding_box(&self, position: Vec2, cell_size: f32) -> IntRect {
        let rect = self.bounding_box(position);

        let floor_with_threshold = |input: f32| -> i32 {
            let floor = (input / cell_size).floor();
            let remaining = input - floor * cell_size;
            if remaining != 0.0 && remaining > cell_size * CARVE_THRESHOLD {
                (input / cell_size).ceil() as i32
            } else {
                floor as i32
            }
        };
        let ceil_with_threshold = |input: f32| -> i32 {
            let ceil = (input / cell_size).ceil();
            let remaining = ceil * cell_size - input;
            if remaining != 0.0 && remaining > cell_size * CARVE_THRESHOLD {
                (input / cell_size).floor() as i32
            } else {
                ceil as i32
            }
        };

        let left = floor_with_threshold(rect.x as f32);
        let top = floor_with_threshold(rect.y as f32);
        let right = ceil_with_threshold(rect.right() as f32);
        let bottom = ceil_with_threshold(rect.bottom() as f32);

        IntRect::new(left, top, (right - left).max(1), (bottom - top).max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_validate() {
        assert!(matches!(Shape::circle(Vec2::ZERO, -1.0), Err(CollisionError::InvalidRadius { .. })));
        assert!(matches!(Shape::lazy(Vec2::ZERO, f32::NAN), Err(CollisionError::InvalidRadius { .. })));
        assert!(matches!(
            Shape::polygon(vec![Vec2::ZERO, Vec2::X]),
            Err(CollisionError::DegeneratePolygon { count: 2 })
        ));
        assert!(matches!(
            Shape::new_box(Vec2::ZERO, Vec2::new(-1.0, 2.0)),
            Err(CollisionError::InvalidBoxSize { .. })
        ));
        assert!(matches!(
            Shape::circle(Vec2::new(f32::INFINITY, 0.0), 1.0),
            Err(CollisionError::NonFiniteCoordinate { .. })
        ));
    }

    #[test]
    fn test_box_origin_shifts_rect() {
        let b = Shape::box_with_origin(Vec2::ZERO, Vec2::new(10.0, 4.0), Vec2::splat(0.5)).unwrap();
        match b.at(Vec2::new(100.0, 100.0)) {
            PlacedShape::Box(r) => {
                assert_eq!(r.min, Vec2::new(95.0, 98.0));
                assert_eq!(r.max, Vec2::new(105.0, 102.0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_bounding_box_is_outward_conservative() {
        let c = Shape::circle(Vec2::new(0.5, 0.5), 1.25).unwrap();
        let bb = c.bounding_box(Vec2::new(10.0, 10.0));
        // exact bounds are [9.25, 11.75]
        assert_eq!(bb, IntRect::new(9, 9, 3, 3));

        let line = Shape::line(Vec2::new(-0.5, 0.0), Vec2::new(2.5, 1.0));
        assert_eq!(line.bounding_box(Vec2::ZERO), IntRect::new(-1, 0, 4, 1));
    }

    #[test]
    fn test_collider_bounding_box_unions_shapes() {
        let col = Collider::solid(vec![
            Shape::new_box(Vec2::ZERO, Vec2::new(4.0, 4.0)).unwrap(),
            Shape::point(Vec2::new(10.0, -2.0)),
        ]);
        assert_eq!(col.bounding_box(Vec2::new(1.0, 1.0)), IntRect::new(1, -1, 10, 6));
        assert_eq!(Collider::default().bounding_box(Vec2::new(3.7, 2.2)), IntRect::new(3, 2, 0, 0));
    }

    #[test]
    fn test_carve_bounding_box_snaps_with_threshold() {
        let cs = 16.0;
        let exact = Collider::solid(vec![Shape::new_box(Vec2::ZERO, Vec2::new(16.0, 16.0)).unwrap()]);
        assert_eq!(exact.carve_bounding_box(Vec2::ZERO, cs), IntRect::new(0, 0, 1, 1));

        // 30px wide: the right edge ceils to cell 2.
        let wide = Collider::solid(vec![Shape::new_box(Vec2::ZERO, Vec2::new(30.0, 16.0)).unwrap()]);
        assert_eq!(wide.carve_bounding_box(Vec2::ZERO, cs), IntRect::new(0, 0, 2, 1));

        // 17px wide: ceiling would overshoot by 15px (> 0.8 cell), so it floors.
        let barely = Collider::solid(vec![Shape::new_box(Vec2::ZERO, Vec2::new(17.0, 16.0)).unwrap()]);
        assert_eq!(barely.carve_bounding_box(Vec2::ZERO, cs), IntRect::new(0, 0, 1, 1));

        // tiny shape still carves one cell
        let tiny = Collider::solid(vec![Shape::point(Vec2::new(3.0, 3.0))]);
        assert_eq!(tiny.carve_bounding_box(Vec2::ZERO, cs).width, 1);
    }

    #[test]
    fn test_carve_bounding_box_min_edge_snaps_forward() {
        let cs = 16.0;
        let b = Collider::solid(vec![Shape::new_box(Vec2::ZERO, Vec2::new(16.0, 16.0)).unwrap()]);
        // Left edge 14px into cell 0 is past the threshold, so it moves to cell 1.
        assert_eq!(b.carve_bounding_box(Vec2::new(14.0, 0.0), cs), IntRect::new(1, 0, 1, 1));
        // 12px in stays within the threshold and keeps cell 0.
        assert_eq!(b.carve_bounding_box(Vec2::new(12.0, 0.0), cs), IntRect::new(0, 0, 2, 1));
        // Same rule on the top edge.
        assert_eq!(b.carve_bounding_box(Vec2::new(0.0, 14.0), cs), IntRect::new(0, 1, 1, 1));
    }

    #[test]
    fn test_lazy_square_rounds_half_side() {
        let sq = lazy_square(&Circle::new(Vec2::ZERO, 10.0));
        // √2·10/2 ≈ 7.07 -> 7
        assert_eq!(sq.min, Vec2::splat(-7.0));
        assert_eq!(sq.max, Vec2::splat(7.0));
    }
}
