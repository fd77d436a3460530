//! Benchmarks for the per-frame stabilization pipeline

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pose_stabilization::config::Config;
use pose_stabilization::correction::CorrectionEngine;
use pose_stabilization::filters::{NoFilter, PoseFilter, TemporalSmoother};
use pose_stabilization::history::PoseHistory;
use pose_stabilization::pose::{LandmarkId, Pose, RawKeypoint, RawPose};
use pose_stabilization::quality::QualityScorer;
use pose_stabilization::session::TrackingSession;
use pose_stabilization::validation::PoseValidator;

const LAYOUT: [(LandmarkId, f64, f64); 17] = [
    (LandmarkId::Nose, 200.0, 100.0),
    (LandmarkId::LeftEye, 210.0, 90.0),
    (LandmarkId::RightEye, 190.0, 90.0),
    (LandmarkId::LeftEar, 220.0, 95.0),
    (LandmarkId::RightEar, 180.0, 95.0),
    (LandmarkId::LeftShoulder, 250.0, 150.0),
    (LandmarkId::RightShoulder, 150.0, 150.0),
    (LandmarkId::LeftElbow, 260.0, 220.0),
    (LandmarkId::RightElbow, 140.0, 220.0),
    (LandmarkId::LeftWrist, 265.0, 290.0),
    (LandmarkId::RightWrist, 135.0, 290.0),
    (LandmarkId::LeftHip, 240.0, 300.0),
    (LandmarkId::RightHip, 160.0, 300.0),
    (LandmarkId::LeftKnee, 240.0, 400.0),
    (LandmarkId::RightKnee, 160.0, 400.0),
    (LandmarkId::LeftAnkle, 240.0, 475.0),
    (LandmarkId::RightAnkle, 160.0, 475.0),
];

/// Swaying figure with deterministic per-landmark jitter
fn noisy_raw(frame: usize) -> RawPose {
    let t = frame as f64 * 0.1;
    RawPose {
        keypoints: LAYOUT
            .iter()
            .enumerate()
            .map(|(i, &(id, x, y))| {
                let jitter = (t * 7.0 + i as f64).sin() * 3.0;
                RawKeypoint {
                    id,
                    x: x + 20.0 * t.sin() + jitter,
                    y: y + 5.0 * t.cos() - jitter,
                    z: None,
                    confidence: 0.8 + 0.15 * (t + i as f64).cos(),
                }
            })
            .collect(),
        score: Some(0.85),
    }
}

fn test_sequence(len: usize) -> Vec<Pose> {
    (0..len).map(|i| noisy_raw(i).into_pose(i as u64 * 33)).collect()
}

fn benchmark_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("filters");
    let data = test_sequence(100);

    let filter_configs = vec![
        ("no_filter", Box::new(NoFilter) as Box<dyn PoseFilter>),
        ("temporal_default", Box::new(TemporalSmoother::from_config(&Config::default()))),
        (
            "temporal_window_1",
            Box::new(TemporalSmoother::from_config(&Config {
                temporal_window_size: 1,
                ..Config::default()
            })),
        ),
    ];

    for (name, mut filter) in filter_configs {
        group.bench_with_input(BenchmarkId::new("sequence_100", name), &data, |b, data| {
            b.iter(|| {
                filter.reset();
                for pose in data {
                    black_box(filter.apply(black_box(pose.clone())));
                }
            });
        });
    }

    group.finish();
}

fn benchmark_scoring(c: &mut Criterion) {
    let mut group = c.benchmark_group("scoring");
    let data = test_sequence(10);
    let mut history = PoseHistory::new(1000);
    for pose in &data[..9] {
        history.push(pose.clone());
    }
    let pose = &data[9];

    let scorer = QualityScorer::new();
    group.bench_function("quality_score", |b| {
        b.iter(|| black_box(scorer.score(black_box(pose), &history)));
    });

    let validator = PoseValidator::default();
    group.bench_function("validate", |b| {
        b.iter(|| black_box(validator.validate(black_box(pose), &history)));
    });

    let engine = CorrectionEngine::default();
    group.bench_function("correct_and_interpolate", |b| {
        b.iter(|| black_box(engine.correct_and_interpolate(black_box(pose), &history)));
    });

    group.finish();
}

fn benchmark_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");
    let frames: Vec<Option<RawPose>> = (0..100).map(|i| (i % 10 != 9).then(|| noisy_raw(i))).collect();

    group.bench_with_input(BenchmarkId::new("process_frame", "100_frames"), &frames, |b, frames| {
        b.iter(|| {
            let mut session = TrackingSession::default();
            for (i, detection) in frames.iter().enumerate() {
                black_box(session.process_frame(detection.clone(), 400, 600, i as u64 * 33));
            }
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_filters, benchmark_scoring, benchmark_session);
criterion_main!(benches);
