//! Nearest free grid position for displacing an entity out of occupied space.

use std::collections::HashSet;
use std::ops::ControlFlow;

use glam::{IVec2, Vec2};

use crate::api::{CollisionEntity, NeighbourSource, StaticGrid};
use crate::shape::Collider;
use crate::types::{EntityId, GridConfig, Neighbourhood};
use crate::world::{CollisionSnapshot, collides_at};

/// Neighbour offsets in enumeration order: W, E, N, S, then NW, NE, SW, SE.
const OFFSETS: [IVec2; 8] = [
    IVec2::new(-1, 0),
    IVec2::new(1, 0),
    IVec2::new(0, -1),
    IVec2::new(0, 1),
    IVec2::new(-1, -1),
    IVec2::new(1, -1),
    IVec2::new(-1, 1),
    IVec2::new(1, 1),
];

/// One-cell steps around a position, clipped to the grid's world bounds.
#[derive(Clone, Debug, Default)]
pub struct GridNeighbours {
    pub grid: GridConfig,
    pub neighbourhood: Neighbourhood,
}

impl GridNeighbours {
    pub fn new(grid: GridConfig, neighbourhood: Neighbourhood) -> Self {
        Self { grid, neighbourhood }
    }
}

impl NeighbourSource for GridNeighbours {
    fn neighbours(&self, position: Vec2) -> Vec<Vec2> {
        let count = match self.neighbourhood {
            Neighbourhood::Four => 4,
            Neighbourhood::Eight => 8,
        };
        let (w, h) = (self.grid.width_px(), self.grid.height_px());
        OFFSETS[..count]
            .iter()
            .map(|o| position + o.as_vec2() * self.grid.cell_size)
            .filter(|p| p.x >= 0.0 && p.y >= 0.0 && p.x < w && p.y < h)
            .collect()
    }
}

/// Visited-set key; positions are compared at whole-unit precision.
fn key(p: Vec2) -> IVec2 {
    p.round().as_ivec2()
}

/// [`find_available_position`] for an entity's own collider, ignoring the
/// entity itself. An entity without a collider can go anywhere.
pub fn find_next_available_position<E, M, N>(
    entity: &E,
    target: Vec2,
    map: &M,
    snapshot: &CollisionSnapshot<'_>,
    neighbours: &N,
) -> Option<Vec2>
where
    E: CollisionEntity,
    M: StaticGrid,
    N: NeighbourSource,
{
    match entity.collider() {
        Some(collider) => find_available_position(map, Some(entity.id()), collider, target, snapshot, neighbours),
        None => Some(target),
    }
}

/// Closest free position to `target` for `collider`, searching outwards over
/// grid neighbours. `None` means everything reachable is occupied.
///
/// `target` itself is tried first. After that, every visited position first
/// tries each of its neighbours directly and only then expands into them,
/// in the order `neighbours` returns them. The visited set lives only for
/// this call. Worst case is proportional to the reachable grid area.
pub fn find_available_position<M, N>(
    map: &M,
    ignore: Option<EntityId>,
    collider: &Collider,
    target: Vec2,
    snapshot: &CollisionSnapshot<'_>,
    neighbours: &N,
) -> Option<Vec2>
where
    M: StaticGrid,
    N: NeighbourSource,
{
    let is_free = |p: Vec2| !collides_at(map, ignore, collider, p, snapshot);

    if is_free(target) {
        return Some(target);
    }

    let mut visited: HashSet<IVec2> = HashSet::new();
    // Each frame holds the neighbours of an expanded position still to be expanded.
    let mut stack: Vec<std::vec::IntoIter<Vec2>> = Vec::new();

    // Breaks with the first directly free neighbour, otherwise continues
    // with the neighbour list to expand later.
    let expand = |position: Vec2, visited: &mut HashSet<IVec2>| -> ControlFlow<Vec2, Vec<Vec2>> {
        visited.insert(key(position));
        let around = neighbours.neighbours(position);
        let free = around.iter().copied().find(|n| !visited.contains(&key(*n)) && is_free(*n));
        match free {
            Some(found) => ControlFlow::Break(found),
            None => ControlFlow::Continue(around),
        }
    };

    match expand(target, &mut visited) {
        ControlFlow::Break(found) => return finish(target, Some(found), &visited),
        ControlFlow::Continue(around) => stack.push(around.into_iter()),
    }

    while let Some(frame) = stack.last_mut() {
        let Some(next) = frame.next() else {
            stack.pop();
            continue;
        };
        if visited.contains(&key(next)) {
            continue;
        }
        match expand(next, &mut visited) {
            ControlFlow::Break(found) => return finish(target, Some(found), &visited),
            ControlFlow::Continue(around) => stack.push(around.into_iter()),
        }
    }

    finish(target, None, &visited)
}

fn finish(target: Vec2, found: Option<Vec2>, visited: &HashSet<IVec2>) -> Option<Vec2> {
    match found {
        Some(p) => tracing::debug!(?target, found = ?p, visited = visited.len(), "placement found"),
        None => tracing::debug!(?target, visited = visited.len(), "no free placement"),
    }
    found
}
