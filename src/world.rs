//! Per-query collision snapshots and the queries that run over them.
//!
//! A [`CollisionSnapshot`] is rebuilt for every query from whatever entity
//! collection the caller owns; it borrows colliders and never outlives the
//! call that made it.

use std::any::TypeId;
use std::collections::HashSet;

use glam::Vec2;

use crate::api::{CollisionEntity, NarrowphaseApi, StaticGrid};
use crate::narrowphase::Narrowphase;
use crate::shape::{Collider, Shape};
use crate::tiles::{collides_at_tile, raycast_tiles, tile_rect};
use crate::types::{EntityId, Obstruction, RaycastHit};

/// One `(id, collider, position)` tuple.
#[derive(Copy, Clone, Debug)]
pub struct SnapshotEntry<'a> {
    pub id: EntityId,
    pub collider: &'a Collider,
    /// Global position.
    pub position: Vec2,
}

/// Ordered, id-unique list of collidable entities. Order follows the source
/// iteration and carries no meaning.
#[derive(Clone, Debug, Default)]
pub struct CollisionSnapshot<'a> {
    entries: Vec<SnapshotEntry<'a>>,
}

impl<'a> CollisionSnapshot<'a> {
    /// Every entity with a collider and position; with `solid_only`, only
    /// solid colliders on entities without the not-solid override.
    pub fn build<E, I>(entities: I, solid_only: bool) -> Self
    where
        E: CollisionEntity + 'a,
        I: IntoIterator<Item = &'a E>,
    {
        Self::collect(entities, |e, c| passes_solid_filter(e, c, solid_only))
    }

    /// Like [`CollisionSnapshot::build`], additionally requiring every
    /// component type in `required`.
    pub fn build_with_components<E, I>(entities: I, solid_only: bool, required: &[TypeId]) -> Self
    where
        E: CollisionEntity + 'a,
        I: IntoIterator<Item = &'a E>,
    {
        Self::collect(entities, |e, c| {
            passes_solid_filter(e, c, solid_only) && required.iter().all(|t| e.has_component(*t))
        })
    }

    /// Entities with a collider and position for which `filter` holds.
    pub fn build_matching<E, I, F>(entities: I, mut filter: F) -> Self
    where
        E: CollisionEntity + 'a,
        I: IntoIterator<Item = &'a E>,
        F: FnMut(&E) -> bool,
    {
        Self::collect(entities, |e, _| filter(e))
    }

    /// Snapshot from prepared entries. Later duplicates of an id are dropped.
    pub fn from_entries(entries: impl IntoIterator<Item = SnapshotEntry<'a>>) -> Self {
        let mut seen = HashSet::new();
        let entries = entries
            .into_iter()
            .filter(|entry| keep_first(&mut seen, entry.id))
            .collect();
        Self { entries }
    }

    fn collect<E, I>(entities: I, mut keep: impl FnMut(&E, &Collider) -> bool) -> Self
    where
        E: CollisionEntity + 'a,
        I: IntoIterator<Item = &'a E>,
    {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for e in entities {
            let (Some(collider), Some(position)) = (e.collider(), e.global_position()) else {
                tracing::trace!(id = e.id().0, "entity without collider or position skipped");
                continue;
            };
            if !keep(e, collider) {
                continue;
            }
            if !keep_first(&mut seen, e.id()) {
                continue;
            }
            entries.push(SnapshotEntry { id: e.id(), collider, position });
        }
        tracing::debug!(entries = entries.len(), "collision snapshot built");
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SnapshotEntry<'a>> {
        self.entries.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entries.iter().map(|e| e.id)
    }

    pub fn get(&self, id: EntityId) -> Option<&SnapshotEntry<'a>> {
        self.entries.iter().find(|e| e.id == id)
    }
}

fn passes_solid_filter<E: CollisionEntity>(e: &E, collider: &Collider, solid_only: bool) -> bool {
    !solid_only || (collider.solid && !e.is_not_solid())
}

fn keep_first(seen: &mut HashSet<EntityId>, id: EntityId) -> bool {
    if seen.insert(id) {
        true
    } else {
        tracing::warn!(id = id.0, "duplicate entity id in collision snapshot, keeping the first");
        false
    }
}

/// Any shape of `a` at `position_a` against any shape of `b` at `position_b`.
pub fn colliders_overlap(a: &Collider, position_a: Vec2, b: &Collider, position_b: Vec2) -> bool {
    a.shapes.iter().any(|sa| {
        b.shapes
            .iter()
            .any(|sb| Narrowphase::collides_with(sa, position_a, sb, position_b))
    })
}

/// What blocks `collider` at `position`: a solid tile first, otherwise the
/// first snapshot entity (other than `ignore`) it overlaps.
pub fn obstruction_at<M: StaticGrid>(
    map: &M,
    ignore: Option<EntityId>,
    collider: &Collider,
    position: Vec2,
    snapshot: &CollisionSnapshot<'_>,
) -> Option<Obstruction> {
    if collides_at_tile(map, collider, position) {
        return Some(Obstruction::Tile);
    }

    snapshot
        .iter()
        .filter(|other| Some(other.id) != ignore)
        .find(|other| colliders_overlap(collider, position, other.collider, other.position))
        .map(|other| Obstruction::Entity(other.id))
}

/// Whether `collider` at `position` hits the map or any snapshot entity but `ignore`.
pub fn collides_at<M: StaticGrid>(
    map: &M,
    ignore: Option<EntityId>,
    collider: &Collider,
    position: Vec2,
    snapshot: &CollisionSnapshot<'_>,
) -> bool {
    obstruction_at(map, ignore, collider, position, snapshot).is_some()
}

/// Every snapshot entity (other than `ignore`) that `collider` at `position`
/// overlaps, each reported once, in snapshot order.
pub fn all_collisions_at<'s>(
    position: Vec2,
    collider: &'s Collider,
    ignore: Option<EntityId>,
    snapshot: &'s CollisionSnapshot<'_>,
) -> impl Iterator<Item = EntityId> + 's {
    snapshot
        .iter()
        .filter(move |other| Some(other.id) != ignore)
        .filter(move |other| colliders_overlap(collider, position, other.collider, other.position))
        .map(|other| other.id)
}

/// Whether two entities' colliders overlap at their global positions.
/// False if either lacks a collider or position.
pub fn entities_collide<A: CollisionEntity, B: CollisionEntity>(a: &A, b: &B) -> bool {
    match (a.collider(), a.global_position(), b.collider(), b.global_position()) {
        (Some(ca), Some(pa), Some(cb), Some(pb)) => colliders_overlap(ca, pa, cb, pb),
        _ => false,
    }
}

/// Whether any shape of `collider` at `position` contains `point`.
pub fn contains_point(collider: &Collider, position: Vec2, point: Vec2) -> bool {
    let probe = Shape::point(point);
    collider
        .shapes
        .iter()
        .any(|s| Narrowphase::collides_with(s, position, &probe, Vec2::ZERO))
}

/// Segment cast against tiles and snapshot entities; the nearer hit wins,
/// tiles on ties.
pub fn raycast<M: StaticGrid>(
    map: &M,
    from: Vec2,
    to: Vec2,
    ignore: Option<EntityId>,
    snapshot: &CollisionSnapshot<'_>,
) -> RaycastHit {
    let tile_hit = raycast_tiles(map, from, to);
    let tile_toi = tile_hit
        .tile()
        .map(|cell| Narrowphase::segment_rect_toi(from, to, &tile_rect(cell, map.cell_size())).unwrap_or(0.0));

    let ray = Shape::line(from, to);
    let mut best: Option<(f32, EntityId)> = None;
    for other in snapshot.iter().filter(|o| Some(o.id) != ignore) {
        let hit = other
            .collider
            .shapes
            .iter()
            .any(|s| Narrowphase::collides_with(&ray, Vec2::ZERO, s, other.position));
        if !hit {
            continue;
        }
        let bounds = other.collider.bounding_box(other.position).to_rect();
        let toi = Narrowphase::segment_rect_toi(from, to, &bounds).unwrap_or(0.0);
        match best {
            Some((t, _)) if toi >= t => {}
            _ => best = Some((toi, other.id)),
        }
    }

    match (tile_toi, best) {
        (Some(tt), Some((et, id))) if et < tt => RaycastHit::Entity(id),
        (Some(_), _) => tile_hit,
        (None, Some((_, id))) => RaycastHit::Entity(id),
        (None, None) => RaycastHit::Miss,
    }
}
