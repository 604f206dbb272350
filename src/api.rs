use std::any::TypeId;

use glam::{IVec2, Vec2};

use crate::geom::{Circle, IntRect, Polygon, Rect, Segment};
use crate::shape::{Collider, Shape};
use crate::types::EntityId;

/// Static occupancy grid the tile broad-phase queries.
///
/// Cells are addressed by `(col, row)`; cell `(c, r)` covers world rect
/// `[c·cell, (c+1)·cell) x [r·cell, (r+1)·cell)`.
pub trait StaticGrid {
    /// Cell size in world units.
    fn cell_size(&self) -> f32;

    /// Cell range that can hold solid cells; everything outside is empty.
    fn cell_bounds(&self) -> IntRect;

    /// Whether cell `(col, row)` is statically solid. Out-of-range cells are not.
    fn has_static_collision(&self, col: i32, row: i32) -> bool;

    /// First solid cell in `[x, x+w) x [y, y+h)`, row-major, if any.
    fn has_static_collision_at(&self, x: i32, y: i32, w: i32, h: i32) -> Option<IVec2> {
        IntRect::new(x, y, w, h)
            .cells()
            .find(|c| self.has_static_collision(c.x, c.y))
    }

    /// Every solid cell inside `rect`. Lazy and restartable: call again to
    /// iterate from the start.
    fn static_collisions(&self, rect: IntRect) -> impl Iterator<Item = IVec2> + '_ {
        rect.cells().filter(move |c| self.has_static_collision(c.x, c.y))
    }
}

/// An entity as seen by the collision query layer.
///
/// Either accessor returning `None` means the entity contributes nothing to
/// a snapshot.
pub trait CollisionEntity {
    fn id(&self) -> EntityId;

    fn collider(&self) -> Option<&Collider>;

    /// Position with any parent chain already composed.
    fn global_position(&self) -> Option<Vec2>;

    /// Per-entity override that excludes a solid collider from solid-only queries.
    fn is_not_solid(&self) -> bool {
        false
    }

    /// Whether the entity carries a component of the given type.
    fn has_component(&self, _component: TypeId) -> bool {
        false
    }
}

/// Grid-adjacency enumerator for placement search. The order of the
/// returned positions decides ties, so implementations must be deterministic.
pub trait NeighbourSource {
    fn neighbours(&self, position: Vec2) -> Vec<Vec2>;
}

impl<F> NeighbourSource for F
where
    F: Fn(Vec2) -> Vec<Vec2>,
{
    fn neighbours(&self, position: Vec2) -> Vec<Vec2> {
        self(position)
    }
}

/// Narrow-phase predicates over world-space primitives plus the
/// shape-pair dispatcher. Every predicate counts touching as intersecting.
pub trait NarrowphaseApi {
    // Points ----------------------------------------------------------------

    fn point_point(a: Vec2, b: Vec2) -> bool;
    fn point_box(p: Vec2, rect: &Rect) -> bool;
    fn point_circle(p: Vec2, circle: &Circle) -> bool;
    fn point_line(p: Vec2, line: &Segment) -> bool;
    fn point_polygon(p: Vec2, polygon: &Polygon) -> bool;

    // Lines -----------------------------------------------------------------

    fn line_line(a: &Segment, b: &Segment) -> bool;
    fn line_box(line: &Segment, rect: &Rect) -> bool;
    fn line_circle(line: &Segment, circle: &Circle) -> bool;
    fn line_polygon(line: &Segment, polygon: &Polygon) -> bool;

    // Areas -----------------------------------------------------------------

    fn box_box(a: &Rect, b: &Rect) -> bool;
    fn box_circle(rect: &Rect, circle: &Circle) -> bool;
    fn box_polygon(rect: &Rect, polygon: &Polygon) -> bool;
    fn circle_circle(a: &Circle, b: &Circle) -> bool;
    fn circle_polygon(circle: &Circle, polygon: &Polygon) -> bool;
    fn polygon_polygon(a: &Polygon, b: &Polygon) -> bool;

    /// Lazy shape against a box via its approximation square.
    fn lazy_box(lazy: &Circle, rect: &Rect) -> bool;

    // Clipping --------------------------------------------------------------

    /// Entry fraction in `[0, 1]` of segment `a -> b` into the closed box, if it touches.
    fn segment_rect_toi(a: Vec2, b: Vec2, rect: &Rect) -> Option<f32>;

    // Dispatch --------------------------------------------------------------

    /// Symmetric, pure shape-vs-shape test with each shape placed at its
    /// owner's position.
    fn collides_with(shape_a: &Shape, position_a: Vec2, shape_b: &Shape, position_b: Vec2) -> bool;
}
