use std::collections::HashMap;

use reach_core::{NameSet, NameSetPool, SpawnDefinition, Target, TargetPoint};

use crate::error::ConfigError;

/// Label to prefab lookup. An empty catalog accepts any label.
#[derive(Debug, Clone, Default)]
pub struct SpawnCatalog {
    by_label: HashMap<String, SpawnDefinition>,
}

impl SpawnCatalog {
    pub fn new(definitions: impl IntoIterator<Item = SpawnDefinition>) -> Result<Self, ConfigError> {
        let mut by_label = HashMap::new();
        for def in definitions {
            if by_label.contains_key(&def.label) {
                return Err(ConfigError::DuplicateSpawnDefinition(def.label));
            }
            by_label.insert(def.label.clone(), def);
        }
        Ok(Self { by_label })
    }

    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty()
    }

    pub fn get(&self, label: &str) -> Option<&SpawnDefinition> {
        self.by_label.get(label)
    }

    fn check(&self, label: &str) -> Result<(), ConfigError> {
        if self.is_empty() || self.by_label.contains_key(label) {
            Ok(())
        } else {
            Err(ConfigError::MissingSpawnDefinition(label.to_string()))
        }
    }

    pub fn validate_pool(&self, pool: &NameSetPool) -> Result<(), ConfigError> {
        pool.all_labels().into_iter().try_for_each(|l| self.check(l))
    }

    /// Pairs `names[i]` with `points[i]`.
    pub fn assign_targets(
        &self,
        points: &[TargetPoint],
        names: &NameSet,
    ) -> Result<Vec<Target>, ConfigError> {
        if points.len() != names.len() {
            return Err(ConfigError::TargetCountMismatch {
                points: points.len(),
                labels: names.len(),
            });
        }
        names
            .iter()
            .zip(points)
            .map(|(label, point)| {
                self.check(label)?;
                Ok(Target::new(label, *point))
            })
            .collect()
    }
}
