use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use track_transform::core::{Action, PlaybackTiming, TrackSnapshot, extend_run, simplify};
use track_transform::script::build_setup_payload;

fn noisy_track(len: i32) -> Vec<Action> {
    (0..len)
        .map(|i| {
            let wave = (f64::from(i) * 0.07).sin() * 45.0 + 50.0;
            let jitter = f64::from((i * 7919) % 11) - 5.0;
            Action::new(i * 16, (wave + jitter).round() as i32)
        })
        .collect()
}

fn bench_simplify_10k(c: &mut Criterion) {
    let track = noisy_track(10_000);

    c.bench_function("simplify_10k_eps_5", |b| {
        b.iter(|| {
            let _ = simplify(black_box(&track), black_box(5.0));
        })
    });
}

fn bench_range_extend_10k(c: &mut Criterion) {
    let track = noisy_track(10_000);

    c.bench_function("range_extend_10k", |b| {
        b.iter(|| {
            let _ = extend_run(black_box(&track), black_box(40));
        })
    });
}

fn bench_setup_payload_10k(c: &mut Criterion) {
    let actions = noisy_track(10_000);
    let snapshot = TrackSnapshot {
        selection: actions.iter().copied().step_by(3).collect(),
        actions,
    };
    let clipboard: Vec<Action> = Vec::new();
    let timing = PlaybackTiming {
        current_position_ms: 12_345.0,
        frame_time_ms: 16.0,
    };

    c.bench_function("setup_payload_10k", |b| {
        b.iter(|| {
            let _ = build_setup_payload(black_box(&snapshot), black_box(&clipboard), timing);
        })
    });
}

criterion_group!(
    benches,
    bench_simplify_10k,
    bench_range_extend_10k,
    bench_setup_payload_10k
);
criterion_main!(benches);
