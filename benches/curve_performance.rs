use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use fastlap::curves::{build_speed_curve, build_summary_statistics, build_track_curve, speed_series};
use fastlap::render::TrackMapRenderer;
use fastlap::telemetry::{TelemetrySample, integrate_distance};

// A lap sampled at ~4Hz around an elliptic circuit
fn create_sample_lap(samples: usize) -> Vec<TelemetrySample> {
    (0..samples)
        .map(|i| {
            let angle = i as f32 / samples as f32 * std::f32::consts::TAU;
            TelemetrySample {
                time_s: Some(i as f64 * 0.25),
                speed_kph: Some(180.0 + 120.0 * (angle * 3.0).sin()),
                x: Some(4200.0 * angle.cos()),
                y: Some(2300.0 * angle.sin()),
                distance_m: None,
            }
        })
        .collect()
}

fn bench_curve_builders(c: &mut Criterion) {
    let mut group = c.benchmark_group("curve_builders");

    for samples in [360, 720, 2880] {
        let lap = create_sample_lap(samples);

        group.bench_with_input(BenchmarkId::new("speed_curve", samples), &lap, |b, lap| {
            b.iter(|| black_box(build_speed_curve(lap).unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("track_curve", samples), &lap, |b, lap| {
            b.iter(|| black_box(build_track_curve(lap).unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("summary", samples), &lap, |b, lap| {
            b.iter(|| {
                let speeds = speed_series(lap).unwrap();
                black_box(build_summary_statistics(&speeds).unwrap())
            });
        });

        group.bench_with_input(BenchmarkId::new("distance", samples), &lap, |b, lap| {
            b.iter(|| black_box(integrate_distance(lap).unwrap()));
        });
    }

    group.finish();
}

fn bench_track_map_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("track_map");
    let renderer = TrackMapRenderer::new();

    for samples in [720, 2880] {
        let curve = build_track_curve(&create_sample_lap(samples)).unwrap();
        group.bench_with_input(BenchmarkId::new("render_svg", samples), &curve, |b, curve| {
            b.iter(|| black_box(renderer.render(curve, "Bench Grand Prix").unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_curve_builders, bench_track_map_rendering);
criterion_main!(benches);
