use reach_core::{GeometryError, NameSetError, SequencerPhase};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("placed {placed} of {requested} targets after {attempts} attempts")]
    InsufficientSpace {
        requested: usize,
        placed: usize,
        attempts: usize,
    },

    #[error("minimum separation must be finite and non-negative, got {0}")]
    InvalidSeparation(f32),
}

/// Problems with experiment setup, reported before any trial runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    NameSet(#[from] NameSetError),

    #[error("no spawn definition for label {0:?}")]
    MissingSpawnDefinition(String),

    #[error("label {0:?} has more than one spawn definition")]
    DuplicateSpawnDefinition(String),

    #[error("{points} locations for {labels} labels")]
    TargetCountMismatch { points: usize, labels: usize },

    #[error("name set {index} requested but the pool only has {available}")]
    UnknownNameSet { index: usize, available: usize },

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequencerError {
    #[error("invalid targets: {0}")]
    InvalidTargets(String),

    #[error("cannot {action} while {phase:?}")]
    InvalidTransition {
        action: &'static str,
        phase: SequencerPhase,
    },
}
