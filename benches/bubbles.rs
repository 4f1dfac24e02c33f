use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::Rgba;
use rust_omr::models::raster::filled;
use rust_omr::{AnswerSheetConfig, AnswerSheetLayout, BubbleDetector, RasterImage};

/// Binarized page with every third bubble of a 120-question layout filled
fn marked_page(layout: &AnswerSheetLayout) -> RasterImage {
    let mut page = filled(1600, 2000, [255, 255, 255, 255]);
    for (q, bubbles) in layout.generate_bubble_layout(1600, 2000).iter().enumerate() {
        let region = bubbles[q % bubbles.len()];
        for y in region.y..region.y + region.height {
            for x in region.x..region.x + region.width {
                page.put_pixel(x, y, Rgba([0, 0, 0, 255]));
            }
        }
    }
    page
}

fn bench_detect_filled(c: &mut Criterion) {
    let config = AnswerSheetConfig::default();
    let layout = AnswerSheetLayout::new(config.clone());
    let page = marked_page(&layout);
    let regions = layout.generate_bubble_layout(1600, 2000);
    let detector = BubbleDetector::new(config);

    c.bench_function("detect_filled_bubbles_120q", |b| {
        b.iter(|| detector.detect_filled_bubbles(black_box(&page), black_box(&regions)))
    });

    let bubbles = detector.detect_filled_bubbles(&page, &regions);
    c.bench_function("determine_answers_120q", |b| {
        b.iter(|| detector.determine_answers(black_box(&bubbles), black_box(120)))
    });
}

fn bench_blob_search(c: &mut Criterion) {
    let config = AnswerSheetConfig {
        bubble_radius: 9.0,
        ..AnswerSheetConfig::default()
    };
    let layout = AnswerSheetLayout::new(config.clone());
    let page = marked_page(&layout);
    let detector = BubbleDetector::new(config);

    c.bench_function("blobs_flood_fill_1600x2000", |b| {
        b.iter(|| detector.detect_bubbles_using_contours(black_box(&page), black_box(480)))
    });
    c.bench_function("blobs_components_1600x2000", |b| {
        b.iter(|| detector.detect_bubbles_using_components(black_box(&page), black_box(480)))
    });
}

criterion_group!(benches, bench_detect_filled, bench_blob_search);
criterion_main!(benches);
