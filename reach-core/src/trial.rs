use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::geometry::Vec3;

/// A generated spawn location. Immutable once placed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetPoint {
    position: Vec3,
}

impl TargetPoint {
    pub fn new(position: Vec3) -> Self {
        Self { position }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }
}

/// Label from the active name set bound to a spawn location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub label: String,
    pub point: TargetPoint,
}

impl Target {
    pub fn new(label: impl Into<String>, point: TargetPoint) -> Self {
        Self {
            label: label.into(),
            point,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.point.position()
    }
}

/// Maps a label to the asset that is spawned for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnDefinition {
    pub label: String,
    pub prefab: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SceneId {
    pub build_index: usize,
    pub name: String,
}

impl SceneId {
    pub fn new(build_index: usize, name: impl Into<String>) -> Self {
        Self {
            build_index,
            name: name.into(),
        }
    }
}

/// Recorded result per trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub cycle: usize,
    pub trial_index: usize,
    pub scene: SceneId,
    /// Wall clock, for labeling rows only.
    pub timestamp: DateTime<Local>,
    pub elapsed_secs: f64,
    pub controller_position: Vec3,
    pub target_label: String,
    pub target_position: Vec3,
    pub start_object_position: Option<Vec3>,
    pub first_touch_position: Option<Vec3>,
    pub subregion: Option<usize>,
}
