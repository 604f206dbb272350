/// Errors produced while constructing shapes, maps and grid configuration.
///
/// Collision queries themselves are infallible: missing entity data is
/// skipped and an exhausted placement search is `None`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CollisionError {
    /// A polygon needs at least three vertices.
    #[error("polygon needs at least 3 vertices, got {count}")]
    DegeneratePolygon { count: usize },

    /// A vertex or offset contained NaN or infinity.
    #[error("non-finite coordinate ({x}, {y})")]
    NonFiniteCoordinate { x: f32, y: f32 },

    /// Circle or lazy radius was negative or not finite.
    #[error("invalid radius {radius} (must be finite and >= 0)")]
    InvalidRadius { radius: f32 },

    /// Box width/height was negative or not finite.
    #[error("invalid box size {width}x{height} (must be finite and >= 0)")]
    InvalidBoxSize { width: f32, height: f32 },

    /// Grid cell size was zero, negative or not finite.
    #[error("invalid cell size {cell_size} (must be finite and > 0)")]
    InvalidCellSize { cell_size: f32 },

    /// Grid width/height must both be positive.
    #[error("invalid grid dimensions {width}x{height}")]
    InvalidGridDimensions { width: i32, height: i32 },

    /// Solids buffer does not cover the grid exactly.
    #[error("solids buffer has {actual} cells, grid {width}x{height} needs {expected}")]
    SolidsLengthMismatch {
        width: i32,
        height: i32,
        expected: usize,
        actual: usize,
    },
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, CollisionError>;

pub(crate) fn check_finite(v: glam::Vec2) -> Result<()> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(CollisionError::NonFiniteCoordinate { x: v.x, y: v.y })
    }
}
