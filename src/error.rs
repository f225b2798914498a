use thiserror::Error;

/// Failures at the load/config boundary. The per-frame simulation is infallible.
#[derive(Debug, Error)]
pub enum Error {
    #[error("tile layers must hold {expected} tiles, got visual={visual} collision={collision}")]
    LayerSizeMismatch {
        expected: usize,
        visual: usize,
        collision: usize,
    },
    #[error("tile ({x}, {y}) is outside the map")]
    TileOutOfBounds { x: i32, y: i32 },
    #[error("tile size must be positive, got {0}")]
    InvalidTileSize(f32),
    #[error("invalid physics config: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
