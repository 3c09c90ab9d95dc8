use thiserror::Error;

use crate::geometry::Vec3;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("half-extents must be finite and non-negative, got {0:?}")]
    InvalidHalfExtents(Vec3),

    #[error("volume center must be finite, got {0:?}")]
    InvalidCenter(Vec3),

    #[error("volume at {center:?} with half-extents {half_extents:?} overflows f32")]
    Unrepresentable { center: Vec3, half_extents: Vec3 },

    #[error("subdivision needs at least one cell per axis")]
    EmptySubdivision,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameSetError {
    #[error("name set must contain at least one label")]
    Empty,

    #[error("duplicate label in name set: {0}")]
    DuplicateLabel(String),

    #[error("name set pool must contain at least one set")]
    EmptyPool,
}

/// Failure to persist a trial record. Never fatal to the sequencer.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("format error: {0}")]
    Format(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}
