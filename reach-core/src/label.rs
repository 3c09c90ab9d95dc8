use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::NameSetError;

/// Ordered set of unique target labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct NameSet {
    labels: Vec<String>,
}

impl NameSet {
    pub fn new<I, S>(labels: I) -> Result<Self, NameSetError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(NameSetError::Empty);
        }
        let mut seen = HashSet::with_capacity(labels.len());
        for label in &labels {
            if !seen.insert(label.as_str()) {
                return Err(NameSetError::DuplicateLabel(label.clone()));
            }
        }
        Ok(Self { labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false, kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// The only way to reorder a set, so labels stay unique.
    pub fn swap(&mut self, a: usize, b: usize) {
        self.labels.swap(a, b);
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

impl TryFrom<Vec<String>> for NameSet {
    type Error = NameSetError;

    fn try_from(labels: Vec<String>) -> Result<Self, Self::Error> {
        NameSet::new(labels)
    }
}

impl From<NameSet> for Vec<String> {
    fn from(set: NameSet) -> Self {
        set.labels
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<NameSet>", into = "Vec<NameSet>")]
pub struct NameSetPool {
    sets: Vec<NameSet>,
}

impl NameSetPool {
    pub fn new(sets: Vec<NameSet>) -> Result<Self, NameSetError> {
        if sets.is_empty() {
            return Err(NameSetError::EmptyPool);
        }
        Ok(Self { sets })
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&NameSet> {
        self.sets.get(index)
    }

    pub fn sets(&self) -> &[NameSet] {
        &self.sets
    }

    /// Every label across all sets, first occurrence order.
    pub fn all_labels(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.sets
            .iter()
            .flat_map(NameSet::iter)
            .filter(|label| seen.insert(*label))
            .collect()
    }
}

impl Default for NameSetPool {
    fn default() -> Self {
        let sets = [
            ["Ant", "Bee", "Cat", "Dog"],
            ["Axe", "Nail", "Rake", "Saw"],
            ["Cup", "Fork", "Pan", "Wok"],
        ]
        .into_iter()
        .map(|labels| NameSet {
            labels: labels.iter().map(|l| l.to_string()).collect(),
        })
        .collect();
        Self { sets }
    }
}

impl TryFrom<Vec<NameSet>> for NameSetPool {
    type Error = NameSetError;

    fn try_from(sets: Vec<NameSet>) -> Result<Self, Self::Error> {
        NameSetPool::new(sets)
    }
}

impl From<NameSetPool> for Vec<NameSet> {
    fn from(pool: NameSetPool) -> Self {
        pool.sets
    }
}
