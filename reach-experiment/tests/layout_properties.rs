use reach_core::{BoundingVolume, Vec3};
use reach_experiment::{LayoutError, SeededRandom, generate};

fn study_volume() -> BoundingVolume {
    BoundingVolume::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.455, 0.455, 0.23)).unwrap()
}

#[test]
fn points_are_separated_and_contained() {
    let volume = study_volume();
    for seed in 0..200 {
        let mut rng = SeededRandom::new(seed);
        let points = generate(8, &volume, 0.15, 10_000, &mut rng).unwrap();
        assert_eq!(points.len(), 8);
        for (i, a) in points.iter().enumerate() {
            assert!(volume.contains(a.position()), "seed {seed}: {a:?} outside");
            for b in &points[i + 1..] {
                assert!(a.position().distance(b.position()) >= 0.15);
            }
        }
    }
}

#[test]
fn same_seed_same_layout() {
    let volume = study_volume();
    for seed in [0, 1, 42, u64::MAX] {
        let a = generate(4, &volume, 0.05, 10_000, &mut SeededRandom::new(seed)).unwrap();
        let b = generate(4, &volume, 0.05, 10_000, &mut SeededRandom::new(seed)).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn different_seeds_differ() {
    let volume = study_volume();
    let a = generate(4, &volume, 0.05, 10_000, &mut SeededRandom::new(1)).unwrap();
    let b = generate(4, &volume, 0.05, 10_000, &mut SeededRandom::new(2)).unwrap();
    assert_ne!(a, b);
}

#[test]
fn study_parameters_always_fit() {
    let volume = study_volume();
    let mut rng = SeededRandom::new(20240305);
    let points = generate(4, &volume, 0.05, 10_000, &mut rng).unwrap();
    assert_eq!(points.len(), 4);
}

#[test]
fn oversized_separation_fails_within_budget() {
    let volume = BoundingVolume::from_size(Vec3::ZERO, Vec3::new(1.0, 1.0, 1.0)).unwrap();
    let mut rng = SeededRandom::new(9);
    let err = generate(4, &volume, 10.0, 10_000, &mut rng).unwrap_err();
    assert_eq!(
        err,
        LayoutError::InsufficientSpace {
            requested: 4,
            placed: 1,
            attempts: 10_000,
        }
    );
}

#[test]
fn zero_budget_places_nothing() {
    let mut rng = SeededRandom::new(9);
    let err = generate(1, &study_volume(), 0.05, 0, &mut rng).unwrap_err();
    assert!(matches!(err, LayoutError::InsufficientSpace { placed: 0, .. }));
}

#[test]
fn huge_volume_samples_without_overflow() {
    let volume = BoundingVolume::new(Vec3::ZERO, Vec3::new(1.7e38, 1.0, 1.0)).unwrap();
    let mut rng = SeededRandom::new(1);
    let points = generate(3, &volume, 0.0, 10, &mut rng).unwrap();
    assert_eq!(points.len(), 3);
    assert!(points.iter().all(|p| volume.contains(p.position())));
    assert!(BoundingVolume::new(Vec3::ZERO, Vec3::new(3e38, 1.0, 1.0)).is_err());
}
