use reach_core::{NameSet, NameSetPool};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::random::RandomSource;

/// Fisher–Yates, walking down from the last index.
pub fn shuffle<T, R: RandomSource + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.index(i + 1);
        items.swap(i, j);
    }
}

pub fn shuffle_name_set<R: RandomSource + ?Sized>(set: &mut NameSet, rng: &mut R) {
    for i in (1..set.len()).rev() {
        let j = rng.index(i + 1);
        set.swap(i, j);
    }
}

/// Picks a set uniformly from the pool and returns it shuffled.
pub fn select_name_set<R: RandomSource + ?Sized>(pool: &NameSetPool, rng: &mut R) -> NameSet {
    let mut set = pool.sets()[rng.index(pool.len())].clone();
    shuffle_name_set(&mut set, rng);
    set
}

/// Where a run's labels come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameSource {
    #[default]
    Random,
    /// Set chosen by the host, e.g. counterbalanced across participants.
    Fixed(usize),
}

impl NameSource {
    pub fn resolve<R: RandomSource + ?Sized>(
        &self,
        pool: &NameSetPool,
        rng: &mut R,
    ) -> Result<NameSet, ConfigError> {
        match *self {
            NameSource::Random => Ok(select_name_set(pool, rng)),
            NameSource::Fixed(index) => {
                let mut set = pool
                    .get(index)
                    .cloned()
                    .ok_or(ConfigError::UnknownNameSet {
                        index,
                        available: pool.len(),
                    })?;
                shuffle_name_set(&mut set, rng);
                Ok(set)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SeededRandom;

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = SeededRandom::new(5);
        let mut items: Vec<u32> = (0..16).collect();
        for _ in 0..20 {
            shuffle(&mut items, &mut rng);
            let mut sorted = items.clone();
            sorted.sort();
            assert_eq!(sorted, (0..16).collect::<Vec<_>>());
        }
    }

    #[test]
    fn shuffle_handles_tiny_inputs() {
        let mut rng = SeededRandom::new(5);
        let mut empty: [u8; 0] = [];
        shuffle(&mut empty, &mut rng);
        let mut one = [9];
        shuffle(&mut one, &mut rng);
        assert_eq!(one, [9]);
    }

    #[test]
    fn selected_set_comes_from_pool() {
        let pool = NameSetPool::default();
        let mut rng = SeededRandom::new(99);
        for _ in 0..10 {
            let set = select_name_set(&pool, &mut rng);
            let origin = pool
                .sets()
                .iter()
                .find(|s| s.contains(set.get(0).unwrap()))
                .unwrap();
            let mut a: Vec<_> = set.labels().to_vec();
            let mut b: Vec<_> = origin.labels().to_vec();
            a.sort();
            b.sort();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn fixed_source_checks_bounds() {
        let pool = NameSetPool::default();
        let mut rng = SeededRandom::new(1);
        let set = NameSource::Fixed(2).resolve(&pool, &mut rng).unwrap();
        assert!(set.contains("Wok"));
        let err = NameSource::Fixed(3).resolve(&pool, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownNameSet {
                index: 3,
                available: 3
            }
        ));
    }
}
