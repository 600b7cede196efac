criterion::criterion_main!(benches);
criterion::criterion_group! {
    name = benches;
    config = criterion::Criterion::default()
        .without_plots()
        .noise_threshold(3.0)
        .significance_level(0.01)
        .sample_size(10)
        .measurement_time(std::time::Duration::from_secs(1));
    targets =
        sampling_seven_evaluation,
        sampling_seven_lookup,
        exhausting_five_combinations,
        building_synthetic_table,
}

use handtable::cards::*;
use handtable::lookup::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// 24 cards, Two through Seven
const SYNTHETIC: usize = 24;

fn synthetic() -> Config {
    Config::default()
        .with_deck(SYNTHETIC)
        .with_path(std::env::temp_dir().join("handtable-bench.bin"))
        .with_checkpoint(false)
}

fn sampling_seven_evaluation(c: &mut criterion::Criterion) {
    let ref mut rng = SmallRng::seed_from_u64(0);
    c.bench_function("evaluate a 7-card Hand bitwise", |b| {
        b.iter(|| Strength::from(Deck::new().deal(7, rng)))
    });
}

fn sampling_seven_lookup(c: &mut criterion::Criterion) {
    let ref mut rng = SmallRng::seed_from_u64(0);
    let oracle = Oracle::new(synthetic().with_rebuild(true), &Holdem, &()).expect("synthetic table");
    c.bench_function("evaluate a 7-card Hand by table", |b| {
        b.iter(|| oracle.rank(Deck::truncated(SYNTHETIC).deal(7, rng)))
    });
}

fn exhausting_five_combinations(c: &mut criterion::Criterion) {
    c.bench_function("exhaust all 5-card Hands", |b| {
        b.iter(|| HandIterator::within(5, 52).count())
    });
}

fn building_synthetic_table(c: &mut criterion::Criterion) {
    let config = synthetic().with_largest(6);
    c.bench_function("build a 24-card 6-card table", |b| {
        b.iter(|| Builder::new(&config, &Holdem, &()).and_then(|b| b.build()))
    });
}
