//! Tile broad-phase: static map collision from shape bounds.

use glam::{IVec2, Vec2};

use crate::api::{NarrowphaseApi, StaticGrid};
use crate::error::{CollisionError, Result};
use crate::geom::{IntRect, Rect};
use crate::narrowphase::Narrowphase;
use crate::shape::{Collider, PlacedShape, Shape};
use crate::types::{GridConfig, RaycastHit};

/// Row-major boolean occupancy grid.
#[derive(Clone, Debug)]
pub struct GridMap {
    cfg: GridConfig,
    solids: Vec<bool>,
}

impl GridMap {
    /// Map with every cell empty.
    pub fn empty(cfg: GridConfig) -> Result<Self> {
        cfg.validate()?;
        let solids = vec![false; cfg.cell_count()];
        Ok(Self { cfg, solids })
    }

    /// Map from a row-major buffer; any non-zero byte is solid.
    pub fn new(cfg: GridConfig, solids: &[u8]) -> Result<Self> {
        cfg.validate()?;
        let expected = cfg.cell_count();
        if solids.len() != expected {
            return Err(CollisionError::SolidsLengthMismatch {
                width: cfg.width,
                height: cfg.height,
                expected,
                actual: solids.len(),
            });
        }
        let solids = solids.iter().map(|&s| s != 0).collect();
        Ok(Self { cfg, solids })
    }

    pub fn config(&self) -> &GridConfig {
        &self.cfg
    }

    pub fn width(&self) -> i32 {
        self.cfg.width
    }

    pub fn height(&self) -> i32 {
        self.cfg.height
    }

    fn index(&self, col: i32, row: i32) -> Option<usize> {
        if col < 0 || row < 0 || col >= self.cfg.width || row >= self.cfg.height {
            return None;
        }
        Some((row * self.cfg.width + col) as usize)
    }

    /// Mark a cell solid or empty. Out-of-range cells are ignored.
    pub fn set_solid(&mut self, col: i32, row: i32, solid: bool) {
        if let Some(i) = self.index(col, row) {
            self.solids[i] = solid;
        }
    }

    pub fn fill(&mut self, solid: bool) {
        self.solids.fill(solid);
    }

    /// World-space rect of a cell.
    pub fn cell_rect(&self, cell: IVec2) -> Rect {
        tile_rect(cell, self.cfg.cell_size)
    }
}

impl StaticGrid for GridMap {
    fn cell_size(&self) -> f32 {
        self.cfg.cell_size
    }

    fn cell_bounds(&self) -> IntRect {
        IntRect::new(0, 0, self.cfg.width, self.cfg.height)
    }

    fn has_static_collision(&self, col: i32, row: i32) -> bool {
        self.index(col, row).is_some_and(|i| self.solids[i])
    }
}

pub(crate) fn tile_rect(cell: IVec2, cell_size: f32) -> Rect {
    Rect::from_xywh(cell.x as f32 * cell_size, cell.y as f32 * cell_size, cell_size, cell_size)
}

fn world_to_cell(p: Vec2, cell_size: f32) -> IVec2 {
    (p / cell_size).floor().as_ivec2()
}

/// Cells whose interior the rect can overlap: floor the min, ceil the max,
/// at least one cell on each axis.
fn covered_cells(r: &Rect, cell_size: f32) -> IntRect {
    let min = (r.min / cell_size).floor().as_ivec2();
    let max = (r.max / cell_size).ceil().as_ivec2();
    IntRect::new(min.x, min.y, (max.x - min.x).max(1), (max.y - min.y).max(1))
}

/// True if any shape of `collider` at `position` overlaps a statically solid tile.
pub fn collides_at_tile<M: StaticGrid>(map: &M, collider: &Collider, position: Vec2) -> bool {
    collider.shapes.iter().any(|s| shape_collides_at_tile(map, s, position))
}

/// Single-shape tile test.
///
/// Points, boxes, circles and lazy shapes answer from their covered cell
/// range alone. Lines and polygons use that range as a prefilter and then
/// confirm against each solid tile with the exact predicate.
pub fn shape_collides_at_tile<M: StaticGrid>(map: &M, shape: &Shape, position: Vec2) -> bool {
    let cs = map.cell_size();
    let placed = shape.at(position);
    match &placed {
        PlacedShape::Point(p) => {
            let cell = world_to_cell(*p, cs);
            map.has_static_collision_at(cell.x, cell.y, 1, 1).is_some()
        }
        PlacedShape::Box(_) | PlacedShape::Circle(_) | PlacedShape::Lazy(_) => {
            let r = covered_cells(&placed.bounds(), cs);
            map.has_static_collision_at(r.x, r.y, r.width, r.height).is_some()
        }
        PlacedShape::Line(line) => {
            // Inclusive on the far edge so boundary-touching tiles are seen.
            let b = line.bounds();
            let min = (b.min / cs).floor().as_ivec2();
            let max = (b.max / cs).ceil().as_ivec2();
            let range = IntRect::new(min.x, min.y, max.x - min.x + 1, max.y - min.y + 1);
            if map.has_static_collision_at(range.x, range.y, range.width, range.height).is_none() {
                return false;
            }
            map.static_collisions(range).any(|cell| {
                let tile = tile_rect(cell, cs);
                tile.contains(line.a)
                    || tile.contains(line.b)
                    || Narrowphase::segment_rect_toi(line.a, line.b, &tile).is_some()
            })
        }
        PlacedShape::Polygon(polygon) => {
            let b = polygon.bounds();
            let min = (b.min / cs).floor().as_ivec2();
            let range = IntRect::new(
                min.x,
                min.y,
                (b.width() / cs).ceil() as i32 + 2,
                (b.height() / cs).ceil() as i32 + 2,
            );
            map.static_collisions(range)
                .any(|cell| polygon.intersects_rect(&tile_rect(cell, cs)))
        }
    }
}

/// Walk the cells crossed by the segment `from -> to` and report the first
/// solid one.
///
/// The segment is clipped to the map's [`StaticGrid::cell_bounds`] first, so
/// the walk never visits more cells than the grid spans however far apart
/// the endpoints are.
pub fn raycast_tiles<M: StaticGrid>(map: &M, from: Vec2, to: Vec2) -> RaycastHit {
    let cs = map.cell_size().max(1e-5);
    let bounds = map.cell_bounds();
    if bounds.width <= 0 || bounds.height <= 0 {
        return RaycastHit::Miss;
    }
    let area = Rect::from_xywh(
        bounds.x as f32 * cs,
        bounds.y as f32 * cs,
        bounds.width as f32 * cs,
        bounds.height as f32 * cs,
    );
    let Some(t_enter) = Narrowphase::segment_rect_toi(from, to, &area) else {
        return RaycastHit::Miss;
    };

    let dir = to - from;
    let start = from + dir * t_enter;
    // The entry point may sit on the far grid line; pull it into the last cell.
    let last = IVec2::new(bounds.right() - 1, bounds.bottom() - 1);
    let mut cell = world_to_cell(start, cs).clamp(IVec2::new(bounds.x, bounds.y), last);
    let end = world_to_cell(to, cs);

    let step_x = if dir.x > 0.0 { 1 } else if dir.x < 0.0 { -1 } else { 0 };
    let step_y = if dir.y > 0.0 { 1 } else if dir.y < 0.0 { -1 } else { 0 };
    let next_boundary = |c: i32, step: i32| -> f32 {
        if step > 0 { (c as f32 + 1.0) * cs } else { c as f32 * cs }
    };
    let mut t_max_x = if step_x != 0 {
        (next_boundary(cell.x, step_x) - start.x) / dir.x
    } else {
        f32::INFINITY
    };
    let mut t_max_y = if step_y != 0 {
        (next_boundary(cell.y, step_y) - start.y) / dir.y
    } else {
        f32::INFINITY
    };
    let t_delta_x = if step_x != 0 { cs / dir.x.abs() } else { f32::INFINITY };
    let t_delta_y = if step_y != 0 { cs / dir.y.abs() } else { f32::INFINITY };

    // One cell per step; a straight walk crosses at most width + height cells.
    let span = i64::from(bounds.width) + i64::from(bounds.height);
    let manhattan = (i64::from(end.x) - i64::from(cell.x)).abs() + (i64::from(end.y) - i64::from(cell.y)).abs();
    let max_steps = manhattan.min(span);
    for _ in 0..=max_steps {
        if cell.x < bounds.x || cell.y < bounds.y || cell.x > last.x || cell.y > last.y {
            // Left the grid; a straight segment cannot come back.
            break;
        }
        if map.has_static_collision(cell.x, cell.y) {
            tracing::debug!(col = cell.x, row = cell.y, "raycast hit tile");
            return RaycastHit::Tile(cell);
        }
        if cell == end {
            break;
        }
        if t_max_x < t_max_y {
            cell.x += step_x;
            t_max_x += t_delta_x;
        } else {
            cell.y += step_y;
            t_max_y += t_delta_y;
        }
    }
    RaycastHit::Miss
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    /// 8x8 map of 16px cells with a single solid cell at (3, 3).
    fn map_with_block() -> GridMap {
        let mut m = GridMap::empty(GridConfig { cell_size: 16.0, width: 8, height: 8 }).unwrap();
        m.set_solid(3, 3, true);
        m
    }

    fn single(shape: Shape) -> Collider {
        Collider::solid(vec![shape])
    }

    #[test]
    fn test_map_construction_checks_buffer() {
        let cfg = GridConfig { cell_size: 16.0, width: 4, height: 2 };
        assert!(GridMap::new(cfg.clone(), &[0u8; 8]).is_ok());
        assert!(matches!(
            GridMap::new(cfg, &[0u8; 7]),
            Err(CollisionError::SolidsLengthMismatch { expected: 8, actual: 7, .. })
        ));
    }

    #[test]
    fn test_out_of_bounds_is_empty() {
        let m = map_with_block();
        assert!(m.has_static_collision(3, 3));
        assert!(!m.has_static_collision(-1, 3));
        assert!(!m.has_static_collision(8, 3));
        assert_eq!(m.has_static_collision_at(0, 0, 8, 8), Some(IVec2::new(3, 3)));
        assert_eq!(m.static_collisions(IntRect::new(0, 0, 8, 8)).count(), 1);
        // restartable
        assert_eq!(m.static_collisions(IntRect::new(0, 0, 8, 8)).count(), 1);
    }

    #[test]
    fn test_point_tile() {
        let m = map_with_block();
        let c = single(Shape::point(Vec2::ZERO));
        assert!(collides_at_tile(&m, &c, v(50.0, 50.0)));
        assert!(!collides_at_tile(&m, &c, v(47.9, 50.0)));
        assert!(!collides_at_tile(&m, &c, v(64.0, 50.0)));
    }

    #[test]
    fn test_box_tile_edges() {
        let m = map_with_block();
        let c = single(Shape::new_box(Vec2::ZERO, v(16.0, 16.0)).unwrap());
        // overlaps the block by one pixel
        assert!(collides_at_tile(&m, &c, v(33.0, 48.0)));
        // flush against its left edge
        assert!(!collides_at_tile(&m, &c, v(32.0, 48.0)));
        assert!(collides_at_tile(&m, &c, v(48.0, 48.0)));
    }

    #[test]
    fn test_circle_and_lazy_tile() {
        let m = map_with_block();
        let circle = single(Shape::circle(Vec2::ZERO, 4.0).unwrap());
        assert!(collides_at_tile(&m, &circle, v(46.0, 56.0)));
        assert!(!collides_at_tile(&m, &circle, v(40.0, 56.0)));
        let lazy = single(Shape::lazy(Vec2::ZERO, 4.0).unwrap());
        assert!(collides_at_tile(&m, &lazy, v(46.0, 56.0)));
        assert!(!collides_at_tile(&m, &lazy, v(40.0, 56.0)));
    }

    #[test]
    fn test_line_tile_prefilter_is_refined() {
        let m = map_with_block();
        // Diagonal whose padded cell range reaches the block but which passes well clear of it.
        let miss = single(Shape::line(v(0.0, 40.0), v(40.0, 0.0)));
        assert!(!collides_at_tile(&m, &miss, Vec2::ZERO));
        let through = single(Shape::line(v(0.0, 0.0), v(100.0, 100.0)));
        assert!(collides_at_tile(&m, &through, Vec2::ZERO));
        // Entirely inside the block.
        let inside = single(Shape::line(v(50.0, 50.0), v(52.0, 52.0)));
        assert!(collides_at_tile(&m, &inside, Vec2::ZERO));
        // Ends exactly on the block's left edge.
        let touching = single(Shape::line(v(20.0, 56.0), v(48.0, 56.0)));
        assert!(collides_at_tile(&m, &touching, Vec2::ZERO));
    }

    #[test]
    fn test_polygon_tile_exact() {
        let m = map_with_block();
        // Right triangle whose hypotenuse stays clear of the block's corner (48, 48).
        let tri = single(Shape::polygon(vec![v(0.0, 0.0), v(90.0, 0.0), v(0.0, 90.0)]).unwrap());
        assert!(!collides_at_tile(&m, &tri, v(0.0, 0.0)));
        assert!(collides_at_tile(&m, &tri, v(10.0, 10.0)));
    }

    #[test]
    fn test_any_shape_in_collider_hits() {
        let m = map_with_block();
        let c = Collider::solid(vec![Shape::point(Vec2::ZERO), Shape::point(v(50.0, 50.0))]);
        assert!(collides_at_tile(&m, &c, Vec2::ZERO));
    }

    #[test]
    fn test_raycast_tiles() {
        let m = map_with_block();
        let hit = raycast_tiles(&m, v(8.0, 56.0), v(120.0, 56.0));
        assert_eq!(hit, RaycastHit::Tile(IVec2::new(3, 3)));
        let miss = raycast_tiles(&m, v(8.0, 8.0), v(120.0, 8.0));
        assert_eq!(miss, RaycastHit::Miss);
        // stops at the end cell
        let short = raycast_tiles(&m, v(8.0, 56.0), v(40.0, 56.0));
        assert_eq!(short, RaycastHit::Miss);
        // diagonal
        let diag = raycast_tiles(&m, v(1.0, 1.0), v(127.0, 127.0));
        assert_eq!(diag, RaycastHit::Tile(IVec2::new(3, 3)));
    }

    #[test]
    fn test_raycast_tiles_from_outside_the_grid() {
        let m = map_with_block();
        // enters through the left edge in row 3
        assert_eq!(raycast_tiles(&m, v(-100.0, 56.0), v(200.0, 56.0)), RaycastHit::Tile(IVec2::new(3, 3)));
        // enters through the top edge in column 3
        assert_eq!(raycast_tiles(&m, v(56.0, -40.0), v(56.0, 300.0)), RaycastHit::Tile(IVec2::new(3, 3)));
        // never touches the grid
        assert_eq!(raycast_tiles(&m, v(-100.0, -10.0), v(300.0, -10.0)), RaycastHit::Miss);
    }

    #[test]
    fn test_raycast_tiles_far_endpoints() {
        let m = map_with_block();
        let hit = raycast_tiles(&m, v(-1e12, 56.0), v(1e12, 56.0));
        assert_eq!(hit, RaycastHit::Tile(IVec2::new(3, 3)));

        let open = GridMap::empty(GridConfig::default()).unwrap();
        assert_eq!(raycast_tiles(&open, v(-1e12, 0.0), v(1e12, 0.0)), RaycastHit::Miss);
        assert_eq!(raycast_tiles(&open, v(-1e12, -1e12), v(1e12, 1e12)), RaycastHit::Miss);
        assert_eq!(raycast_tiles(&open, v(f32::MAX, 5.0), v(-f32::MAX, 5.0)), RaycastHit::Miss);
    }
}
