use aruco_nano_core::GrayImage;
use aruco_nano_detector::{DetectorParams, MarkerDetector};
use aruco_nano_dict::builtins::ARUCO_MIP_36H12;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn scene(ids: &[u32], cell: usize) -> GrayImage {
    let side = 8 * cell;
    let gap = 2 * cell;
    let w = ids.len() * (side + gap) + gap;
    let h = side + 2 * gap;
    let mut img = GrayImage::filled(w, h, 255);
    for (k, &id) in ids.iter().enumerate() {
        let code = ARUCO_MIP_36H12.codes[id as usize];
        let (x0, y0) = (gap + k * (side + gap), gap);
        for r in 0..8 {
            for c in 0..8 {
                let inner = (1..7).contains(&r) && (1..7).contains(&c);
                let white = inner && (code >> (35 - (6 * (r - 1) + (c - 1)))) & 1 == 1;
                for y in y0 + r * cell..y0 + (r + 1) * cell {
                    for x in x0 + c * cell..x0 + (c + 1) * cell {
                        img.data[y * w + x] = if white { 255 } else { 0 };
                    }
                }
            }
        }
    }
    img
}

fn bench_detect(c: &mut Criterion) {
    let img = scene(&[1, 50, 100, 150, 200], 24);
    let detector = MarkerDetector::default();
    c.bench_function("detect_5_markers", |b| {
        b.iter(|| detector.detect(black_box(&img.view())))
    });

    let unrefined = MarkerDetector::new(DetectorParams {
        refine_corners: false,
        ..DetectorParams::default()
    });
    c.bench_function("detect_5_markers_no_subpix", |b| {
        b.iter(|| unrefined.detect(black_box(&img.view())))
    });
}

criterion_group!(benches, bench_detect);
criterion_main!(benches);
