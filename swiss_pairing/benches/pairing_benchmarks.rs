use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use swiss_pairing::{
    engine::{normalizer, trf},
    pairing::{FallbackPairer, Player, TournamentPlayerState},
};

/// Roster of `n` players with spread out ratings
fn roster(n: usize) -> Vec<Player> {
    (0..n)
        .map(|i| {
            Player::new(
                format!("player{i}@club.org"),
                "Given",
                &format!("Family{i}"),
                1200 + ((i * 37) % 1400) as u32,
            )
        })
        .collect()
}

/// Engine style output pairing seat i with seat i + n/2
fn engine_output(n: usize) -> String {
    let half = n / 2;
    let mut out = format!("{}\n", n.div_ceil(2));
    for i in 1..=half {
        out.push_str(&format!("{} {}\n", i, i + half));
    }
    if n % 2 == 1 {
        out.push_str(&format!("{} 0\n", n));
    }
    out
}

/// Benchmark the rating-seeded pairer across roster sizes
fn bench_fallback_pair(c: &mut Criterion) {
    let mut group = c.benchmark_group("fallback_pair");

    for n_players in [8, 64, 501].iter() {
        let players = roster(*n_players);
        let states: Vec<TournamentPlayerState> = players
            .iter()
            .map(|p| TournamentPlayerState::new(p.email.clone()))
            .collect();
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_players", n_players)),
            n_players,
            |b, _| {
                b.iter(|| FallbackPairer::new().pair(black_box(&players), black_box(&states)));
            },
        );
    }

    group.finish();
}

/// Benchmark rendering the roster record written for the engine
fn bench_serialize_roster(c: &mut Criterion) {
    let players = roster(200);
    let refs: Vec<&Player> = players.iter().collect();

    c.bench_function("serialize_roster_200", |b| {
        b.iter(|| trf::serialize_roster(Some("Club Open"), black_box(5), black_box(&refs)));
    });
}

/// Benchmark parsing and validating engine output
fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    for n_players in [8, 201].iter() {
        let players = roster(*n_players);
        let refs: Vec<&Player> = players.iter().collect();
        let output = engine_output(*n_players);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_players", n_players)),
            n_players,
            |b, _| {
                b.iter(|| normalizer::normalize(black_box(&output), black_box(&refs)));
            },
        );
    }

    group.finish();
}

criterion_group!(pairing, bench_fallback_pair, bench_normalize);
criterion_group!(engine_io, bench_serialize_roster);
criterion_main!(pairing, engine_io);
