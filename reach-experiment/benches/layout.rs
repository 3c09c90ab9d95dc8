use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use reach_core::{BoundingVolume, Vec3};
use reach_experiment::{SeededRandom, generate, shuffle};

fn study_volume() -> BoundingVolume {
    BoundingVolume::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.455, 0.455, 0.23)).unwrap()
}

pub fn bench_generate(c: &mut Criterion) {
    let mut g = c.benchmark_group("layout");
    g.sample_size(60);
    let volume = study_volume();

    for (count, sep) in [(4, 0.05), (16, 0.1), (32, 0.12)] {
        g.bench_function(format!("generate_{count}_sep_{sep}"), |b| {
            b.iter_batched(
                || SeededRandom::new(7),
                |mut rng| generate(black_box(count), &volume, sep, 10_000, &mut rng),
                BatchSize::SmallInput,
            )
        });
    }

    // budget exhaustion is the slow path
    g.bench_function("generate_exhausted", |b| {
        b.iter_batched(
            || SeededRandom::new(7),
            |mut rng| generate(4, &volume, 10.0, black_box(10_000), &mut rng),
            BatchSize::SmallInput,
        )
    });
    g.finish();
}

pub fn bench_shuffle(c: &mut Criterion) {
    let mut rng = SeededRandom::new(1);
    let mut labels = ["Ant", "Bee", "Cat", "Dog"];
    c.bench_function("shuffle_4", |b| {
        b.iter(|| shuffle(black_box(&mut labels), &mut rng))
    });
}

criterion_group!(benches, bench_generate, bench_shuffle);
criterion_main!(benches);
