use crate::util::*;
use thiserror::Error;

/// Rejected before any iteration starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("grid must have at least 4 x 4 cells, got nx = {nx}, ny = {ny}")]
    GridTooSmall { nx: i32, ny: i32 },

    #[error(
        "obstacle {obstacle} must lie within {allowed} to leave \
         wall-adjacent fluid on every exposed face"
    )]
    ObstacleOutOfBounds { obstacle: AABB<2>, allowed: AABB<2> },

    #[error(
        "obstacle height and length must be non-negative, \
         got height = {height}, length = {length}"
    )]
    DegenerateObstacle { height: i32, length: i32 },

    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("Reynolds number must be positive and finite, got {0}")]
    InvalidReynolds(f64),

    #[error("no target Reynolds numbers given")]
    NoReynolds,

    #[error("chunk_size must be at least 1")]
    ZeroChunkSize,

    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: std::path::PathBuf,
        source: serde_json::Error,
    },
}

/// Collaborator level failures, they never invalidate a computed solution.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("i/o error writing {path:?}: {source}")]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("vtk export to {path:?} failed: {message}")]
    Vtk {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("image export failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("json export failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl ExportError {
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        ExportError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
