use std::path::Path;

use reach_core::{BoundingVolume, NameSetPool, SpawnDefinition, Subdivision, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::names::NameSource;
use crate::spawn::SpawnCatalog;

/// How the placement box is positioned in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BoxCenterMode {
    /// Use `box_center` as configured.
    #[default]
    Manual,
    /// Offset from the start object, so the layout follows it.
    RelativeToStartObject { offset: Vec3 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub box_center: Vec3,
    pub box_size: Vec3,
    pub box_center_mode: BoxCenterMode,
    pub min_distance: f32,
    pub max_attempts: usize,
    pub max_layout_retries: usize,
    pub max_cycles: usize,
    pub start_object_position: Option<Vec3>,
    pub name_sets: NameSetPool,
    pub name_source: NameSource,
    pub spawnables: Vec<SpawnDefinition>,
    pub subdivision: Option<Subdivision>,
    pub seed: Option<u64>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            box_center: Vec3::new(0.0, 1.0, 0.0),
            box_size: Vec3::new(0.91, 0.91, 0.46),
            box_center_mode: BoxCenterMode::Manual,
            min_distance: 0.05,
            max_attempts: 10_000,
            max_layout_retries: 16,
            max_cycles: 1,
            start_object_position: Some(Vec3::ZERO),
            name_sets: NameSetPool::default(),
            name_source: NameSource::Random,
            spawnables: Vec::new(),
            subdivision: None,
            seed: None,
        }
    }
}

impl ExperimentConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_cycles == 0 {
            return Err(ConfigError::invalid("max_cycles", "must be at least 1"));
        }
        if !self.min_distance.is_finite() || self.min_distance < 0.0 {
            return Err(ConfigError::invalid(
                "min_distance",
                format!("{} is not a non-negative distance", self.min_distance),
            ));
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::invalid("max_attempts", "must be at least 1"));
        }
        if let Some(sub) = self.subdivision {
            Subdivision::new(sub.x, sub.y, sub.z)?;
        }
        if let NameSource::Fixed(index) = self.name_source {
            if index >= self.name_sets.len() {
                return Err(ConfigError::UnknownNameSet {
                    index,
                    available: self.name_sets.len(),
                });
            }
        }
        self.bounding_volume()?;
        self.spawn_catalog()?.validate_pool(&self.name_sets)
    }

    pub fn bounding_volume(&self) -> Result<BoundingVolume, ConfigError> {
        let center = match (self.box_center_mode, self.start_object_position) {
            (BoxCenterMode::Manual, _) => self.box_center,
            (BoxCenterMode::RelativeToStartObject { offset }, Some(start)) => start + offset,
            (BoxCenterMode::RelativeToStartObject { .. }, None) => {
                return Err(ConfigError::invalid(
                    "box_center_mode",
                    "relative centering needs a start_object_position",
                ));
            }
        };
        Ok(BoundingVolume::from_size(center, self.box_size)?)
    }

    pub fn spawn_catalog(&self) -> Result<SpawnCatalog, ConfigError> {
        SpawnCatalog::new(self.spawnables.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn defaults_are_valid() {
        let config = ExperimentConfig::default();
        config.validate().unwrap();
        let volume = config.bounding_volume().unwrap();
        assert_relative_eq!(volume.half_extents().x, 0.455);
        assert_eq!(volume.center(), Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = ExperimentConfig::from_json(r#"{ "max_cycles": 3, "seed": 7 }"#).unwrap();
        assert_eq!(config.max_cycles, 3);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.max_attempts, 10_000);
        assert_eq!(config.name_sets.len(), 3);
    }

    #[test]
    fn relative_center_follows_start_object() {
        let json = r#"{
            "start_object_position": { "x": 1.0, "y": 0.5, "z": 0.0 },
            "box_center_mode": { "mode": "relative_to_start_object",
                                 "offset": { "x": 0.0, "y": 0.5, "z": 0.4 } }
        }"#;
        let config = ExperimentConfig::from_json(json).unwrap();
        let volume = config.bounding_volume().unwrap();
        assert_eq!(volume.center(), Vec3::new(1.0, 1.0, 0.4));
    }

    #[test]
    fn zero_cycles_rejected() {
        let err = ExperimentConfig::from_json(r#"{ "max_cycles": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "max_cycles", .. }));
    }

    #[test]
    fn unmapped_label_is_reported_at_load() {
        let json = r#"{
            "name_sets": [["Ant", "Bee"]],
            "spawnables": [{ "label": "Ant", "prefab": "AntPrefab" }]
        }"#;
        let err = ExperimentConfig::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSpawnDefinition(l) if l == "Bee"));
    }

    #[test]
    fn duplicate_labels_fail_to_parse() {
        let err = ExperimentConfig::from_json(r#"{ "name_sets": [["Ant", "Ant"]] }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn negative_box_size_rejected() {
        let json = r#"{ "box_size": { "x": -1.0, "y": 1.0, "z": 1.0 } }"#;
        let err = ExperimentConfig::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::Geometry(_)));
    }
}
