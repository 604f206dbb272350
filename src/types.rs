use glam::IVec2;

use crate::error::{CollisionError, Result};

/// Stable entity identifier carried through snapshots and hit results.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub u32);

/// What blocked a collider in [`crate::world::obstruction_at`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Obstruction {
    /// A statically solid map tile (tile hits carry no entity).
    Tile,
    /// Another entity in the snapshot.
    Entity(EntityId),
}

/// Raycast outcome: exactly one of tile or entity, or nothing.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum RaycastHit {
    /// First solid grid cell crossed (cell coordinates).
    Tile(IVec2),
    /// Closest entity whose collider crosses the ray.
    Entity(EntityId),
    #[default]
    Miss,
}

impl RaycastHit {
    pub fn is_hit(&self) -> bool {
        !matches!(self, RaycastHit::Miss)
    }

    pub fn tile(&self) -> Option<IVec2> {
        match self {
            RaycastHit::Tile(p) => Some(*p),
            _ => None,
        }
    }

    pub fn entity(&self) -> Option<EntityId> {
        match self {
            RaycastHit::Entity(id) => Some(*id),
            _ => None,
        }
    }
}

/// Grid-snapping threshold for [`crate::shape::Collider::carve_bounding_box`],
/// as a fraction of the cell size.
pub const CARVE_THRESHOLD: f32 = 0.8;

/// Grid adjacency used when enumerating placement neighbours.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Neighbourhood {
    /// W, E, N, S.
    Four,
    /// W, E, N, S, NW, NE, SW, SE.
    #[default]
    Eight,
}

/// Static grid layout shared by the map and the neighbour enumerator.
#[derive(Clone, Debug, PartialEq)]
pub struct GridConfig {
    /// Cell size in world units.
    pub cell_size: f32,
    /// Width in cells.
    pub width: i32,
    /// Height in cells.
    pub height: i32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { cell_size: 16.0, width: 64, height: 64 }
    }
}

impl GridConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(CollisionError::InvalidCellSize { cell_size: self.cell_size });
        }
        if self.width <= 0 || self.height <= 0 {
            return Err(CollisionError::InvalidGridDimensions { width: self.width, height: self.height });
        }
        Ok(())
    }

    /// Width in world units.
    pub fn width_px(&self) -> f32 {
        self.width as f32 * self.cell_size
    }

    /// Height in world units.
    pub fn height_px(&self) -> f32 {
        self.height as f32 * self.cell_size
    }

    pub fn cell_count(&self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize)
    }
}
