use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rfplayer::controls::RecordingControl;
use rfplayer::sim::SimConfig;
use rfplayer::{progress, Categories, ControlAdapter, PlayerConfig};
use std::time::Duration;

/// Bench: classify a sweep of ratios
fn bench_classify(c: &mut Criterion) {
    c.bench_function("classify_ratio_sweep", |b| {
        b.iter(|| {
            for i in 0..=1000 {
                black_box(progress::classify_ratio(black_box(i as f64 / 1000.0)));
            }
        })
    });
}

/// Bench: a full simulated session, load to finish, with a handful of adapters
fn bench_session(c: &mut Criterion) {
    c.bench_function("session_load_to_finish", |b| {
        b.iter(|| {
            let config = PlayerConfig {
                autoplay: true,
                skip_after_secs: Some(5.0),
                ..Default::default()
            };
            let sim = SimConfig {
                duration: Some(Duration::from_secs(120)),
                ..SimConfig::default()
            };
            let (mut controller, remote, _clock) =
                rfplayer::new_player(config, sim).expect("valid config");
            for categories in [Categories::PLAYING, Categories::PAUSE, Categories::all()] {
                let control = RecordingControl::new(categories)
                    .with_time_display()
                    .with_scrub()
                    .with_skip();
                controller.register(ControlAdapter::new("bench", control));
            }
            controller
                .set_source("https://media.example/bench.mp4")
                .expect("source accepted");
            controller.pump();
            while remote.tick() {
                controller.pump();
            }
            controller.pump();
            black_box(controller.status())
        })
    });
}

criterion_group!(benches, bench_classify, bench_session);
criterion_main!(benches);
