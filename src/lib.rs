//! tilebonk: 2D narrow-phase collision queries over tile grids and entity snapshots (detection only, no resolution)

pub mod types;
pub mod api;
pub mod error;
pub mod geom;
pub mod shape;
pub mod narrowphase;
pub mod tiles;
pub mod world;
pub mod placement;

pub use crate::types::*;
pub use crate::api::*;
pub use crate::error::CollisionError;
pub use crate::geom::{Circle, IntRect, Polygon, Rect, Segment};
pub use crate::shape::{Collider, PlacedShape, Shape, ShapeKind};
pub use crate::narrowphase::Narrowphase;
pub use crate::tiles::{GridMap, collides_at_tile, raycast_tiles, shape_collides_at_tile};
pub use crate::world::{
    CollisionSnapshot, SnapshotEntry, all_collisions_at, colliders_overlap, collides_at, contains_point,
    entities_collide, obstruction_at, raycast,
};
pub use crate::placement::{GridNeighbours, find_available_position, find_next_available_position};
