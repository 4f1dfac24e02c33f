//! Synthetic answer sheets for integration tests
//!
//! Pages are 1600x2000 with 20 questions in 4 columns, which puts each
//! bubble at a 32 px box whose top-left corner is
//! `(48 + column * 400 + option * 64, 484 + row * 280)`.

#![allow(dead_code)]

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
use qrcode::{Color, QrCode};
use rust_omr::{AnswerSheetConfig, AnswerSheetLayout, Rect};
use std::io::Cursor;

pub const PAGE_WIDTH: u32 = 1600;
pub const PAGE_HEIGHT: u32 = 2000;
pub const QUESTIONS: usize = 20;
pub const COLUMNS: usize = 4;

const PAPER: Rgba<u8> = Rgba([245, 243, 238, 255]);
const OUTLINE: Rgba<u8> = Rgba([70, 70, 75, 255]);
const PENCIL: Rgba<u8> = Rgba([28, 28, 34, 255]);
const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Where the student QR code is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrPlacement {
    /// Student info box below the header
    InfoBox,
    /// Top-right fallback corner
    TopRight,
    /// No code on the page
    Missing,
}

/// One synthetic sheet: chosen option per question (`None` = left blank).
pub struct SheetSpec {
    pub marks: Vec<Option<usize>>,
    pub payload: String,
    pub placement: QrPlacement,
}

impl SheetSpec {
    pub fn new(payload: &str, placement: QrPlacement) -> Self {
        Self {
            marks: standard_marks(),
            payload: payload.to_string(),
            placement,
        }
    }

    /// Answers a reader in default mode should report.
    pub fn expected_answers(&self, labels: &[&str]) -> Vec<String> {
        self.marks
            .iter()
            .map(|mark| labels[mark.unwrap_or(0)].to_string())
            .collect()
    }
}

/// Spread of marks over all options; question 7 and 16 are left blank.
pub fn standard_marks() -> Vec<Option<usize>> {
    (0..QUESTIONS)
        .map(|q| if q == 6 || q == 15 { None } else { Some((q * 3 + 1) % 4) })
        .collect()
}

pub fn sheet_config() -> AnswerSheetConfig {
    AnswerSheetConfig {
        num_questions: QUESTIONS,
        columns_per_page: COLUMNS,
        ..AnswerSheetConfig::default()
    }
}

/// Paint the page described by `spec`.
pub fn render_sheet(spec: &SheetSpec) -> RgbaImage {
    let mut page = RgbaImage::from_pixel(PAGE_WIDTH, PAGE_HEIGHT, PAPER);
    let layout = AnswerSheetLayout::new(sheet_config());

    for (question, bubbles) in layout.generate_bubble_layout(PAGE_WIDTH, PAGE_HEIGHT).iter().enumerate() {
        for (option, region) in bubbles.iter().enumerate() {
            let (cx, cy) = (region.center_x as f64, region.center_y as f64);
            paint_ring(&mut page, cx, cy, 13.0, 15.0, OUTLINE);
            if spec.marks[question] == Some(option) {
                paint_ring(&mut page, cx, cy, 0.0, 14.0, PENCIL);
            }
        }
    }

    let regions = layout.qr_search_regions(PAGE_WIDTH, PAGE_HEIGHT);
    match spec.placement {
        QrPlacement::InfoBox => paint_qr_centered(&mut page, &spec.payload, regions[0]),
        QrPlacement::TopRight => paint_qr_centered(&mut page, &spec.payload, regions[2]),
        QrPlacement::Missing => {}
    }
    page
}

fn paint_ring(page: &mut RgbaImage, cx: f64, cy: f64, inner: f64, outer: f64, color: Rgba<u8>) {
    let x0 = (cx - outer).floor().max(0.0) as u32;
    let y0 = (cy - outer).floor().max(0.0) as u32;
    let x1 = ((cx + outer).ceil() as u32).min(page.width() - 1);
    let y1 = ((cy + outer).ceil() as u32).min(page.height() - 1);
    for y in y0..=y1 {
        for x in x0..=x1 {
            let (dx, dy) = (x as f64 - cx, y as f64 - cy);
            let d = (dx * dx + dy * dy).sqrt();
            if d >= inner && d <= outer {
                page.put_pixel(x, y, color);
            }
        }
    }
}

/// Paint `payload` as a QR code centered in `area`, with at least a
/// four-module quiet zone inside the area.
fn paint_qr_centered(page: &mut RgbaImage, payload: &str, area: Rect) {
    let code = QrCode::new(payload.as_bytes()).expect("payload fits in a QR code");
    let modules = code.width() as u32;
    let module = (area.width.min(area.height) / (modules + 8)).min(4);
    assert!(module >= 2, "QR code too dense for the search area");

    let size = modules * module;
    let left = area.x + (area.width - size) / 2;
    let top = area.y + (area.height - size) / 2;
    for (i, color) in code.to_colors().into_iter().enumerate() {
        if color != Color::Dark {
            continue;
        }
        let (mx, my) = (i as u32 % modules, i as u32 / modules);
        for dy in 0..module {
            for dx in 0..module {
                page.put_pixel(left + mx * module + dx, top + my * module + dy, INK);
            }
        }
    }
}

pub fn encode_png(page: &RgbaImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(page.clone())
        .write_to(&mut out, ImageOutputFormat::Png)
        .expect("png encode");
    out.into_inner()
}

pub fn data_uri(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}
