use criterion::{criterion_group, criterion_main, Criterion};

use dashsnap::data::Dashboard;
use dashsnap::dom::compose::document_for;
use dashsnap::rendering::{capture_region, layout::layout_document};
use dashsnap::{ContainerId, Viewport};

fn bench_layout(c: &mut Criterion) {
    let document = document_for(&Dashboard::analytics()).expect("compose");
    c.bench_function("layout_analytics", |b| {
        b.iter(|| layout_document(&document, Viewport::default()))
    });
}

fn bench_capture(c: &mut Criterion) {
    let root = ContainerId::dashboard_root();
    for name in Dashboard::BUILTIN_NAMES {
        let dashboard = Dashboard::builtin(name).expect("builtin");
        let document = document_for(&dashboard).expect("compose");
        c.bench_function(&format!("capture_{}", name), |b| {
            b.iter(|| capture_region(&document, &root, Viewport::default()).unwrap())
        });
    }
}

fn bench_encode(c: &mut Criterion) {
    let document = document_for(&Dashboard::analytics()).expect("compose");
    let capture =
        capture_region(&document, &ContainerId::dashboard_root(), Viewport::default()).expect("capture");
    c.bench_function("encode_png_analytics", |b| b.iter(|| capture.encode().unwrap()));
}

criterion_group!(benches, bench_layout, bench_capture, bench_encode);
criterion_main!(benches);
