//! Expected bubble geometry of a printed answer sheet
//!
//! Questions fill the page column by column: question `q` (0-based) sits in
//! column `q / questions_per_column` at row `q % questions_per_column`. All
//! positions derive from the page size, so the layout is regenerated for
//! every image and nothing is cached across a config change.

use crate::config::{AnswerSheetConfig, ConfigOverrides, LayoutGeometry};
use crate::error::Result;
use crate::models::{BubbleRegion, Rect};

/// Grid cell of a question, both 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPosition {
    /// Column, left to right
    pub column: usize,
    /// Row within the column, top to bottom
    pub row: usize,
}

/// Maps questions and options to pixel regions on a page.
#[derive(Debug, Clone, Default)]
pub struct AnswerSheetLayout {
    config: AnswerSheetConfig,
    geometry: LayoutGeometry,
}

impl AnswerSheetLayout {
    /// Layout with the default page geometry.
    pub fn new(config: AnswerSheetConfig) -> Self {
        Self::with_geometry(config, LayoutGeometry::default())
    }

    /// Layout with a custom page geometry.
    pub fn with_geometry(config: AnswerSheetConfig, geometry: LayoutGeometry) -> Self {
        Self { config, geometry }
    }

    /// Current sheet config.
    pub fn config(&self) -> &AnswerSheetConfig {
        &self.config
    }

    /// Current page geometry.
    pub fn geometry(&self) -> &LayoutGeometry {
        &self.geometry
    }

    /// Merge overrides into the sheet config; the next layout call uses them.
    pub fn update_config(&mut self, overrides: &ConfigOverrides) -> Result<()> {
        self.config.apply(overrides)
    }

    /// Column and row of a 1-based question number.
    pub fn grid_position(&self, question_number: usize) -> GridPosition {
        let per_column = self.config.questions_per_column().max(1);
        let q = question_number.saturating_sub(1);
        GridPosition {
            column: q / per_column,
            row: q % per_column,
        }
    }

    /// Bubble diameter in pixels for a page, before truncation.
    fn bubble_size(&self, spacing: f64, row_height: f64) -> f64 {
        let g = &self.geometry;
        let cap = g.max_bubble_size.min(2.0 * self.config.bubble_radius + 2.0);
        (spacing * g.bubble_scale).min(row_height * g.bubble_scale).min(cap)
    }

    /// One `Vec<BubbleRegion>` per question, options in configured order.
    pub fn generate_bubble_layout(&self, page_width: u32, page_height: u32) -> Vec<Vec<BubbleRegion>> {
        let g = &self.geometry;
        let (page_w, page_h) = (page_width as f64, page_height as f64);
        let options = self.config.options_per_question;
        let per_column = self.config.questions_per_column().max(1);

        let column_width = page_w / self.config.columns_per_page.max(1) as f64;
        let top = page_h * g.top_margin;
        let available_height = page_h - top - page_h * g.bottom_margin;
        let row_height = available_height / per_column as f64;
        let left = column_width * g.left_margin;
        let right = column_width * g.right_margin;
        let spacing = (column_width - left - right) / (options + 1) as f64;
        let size = self.bubble_size(spacing, row_height).max(0.0);

        (1..=self.config.num_questions)
            .map(|question_number| {
                let cell = self.grid_position(question_number);
                let base_x = cell.column as f64 * column_width + left;
                let y = top + cell.row as f64 * row_height + row_height / 2.0 - size / 2.0;
                (0..options)
                    .map(|opt| {
                        let x = base_x + opt as f64 * spacing;
                        BubbleRegion::new(
                            x.max(0.0) as u32,
                            y.max(0.0) as u32,
                            size as u32,
                            size as u32,
                        )
                    })
                    .collect()
            })
            .collect()
    }

    /// Candidate QR areas in search order: info box, top-left, top-right.
    pub fn qr_search_regions(&self, page_width: u32, page_height: u32) -> Vec<Rect> {
        let g = &self.geometry;
        let (page_w, page_h) = (page_width as f64, page_height as f64);
        let qr_size = page_w.min(page_h) * g.qr_size;
        let corner = qr_size * g.qr_corner_scale;
        let inset = g.qr_corner_inset;

        vec![
            Rect::new(
                (page_w * g.qr_info_box_x) as u32,
                (page_h * g.qr_info_box_y) as u32,
                qr_size as u32,
                qr_size as u32,
            ),
            Rect::new(inset as u32, inset as u32, corner as u32, corner as u32),
            Rect::new(
                (page_w - corner - inset).max(0.0) as u32,
                inset as u32,
                corner as u32,
                corner as u32,
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(num_questions: usize, columns: usize) -> AnswerSheetConfig {
        AnswerSheetConfig {
            num_questions,
            columns_per_page: columns,
            ..AnswerSheetConfig::default()
        }
    }

    #[test]
    fn test_column_major_fill() {
        let layout = AnswerSheetLayout::new(sheet(120, 4));
        assert_eq!(layout.grid_position(1), GridPosition { column: 0, row: 0 });
        assert_eq!(layout.grid_position(30), GridPosition { column: 0, row: 29 });
        assert_eq!(layout.grid_position(31), GridPosition { column: 1, row: 0 });
        assert_eq!(layout.grid_position(120), GridPosition { column: 3, row: 29 });

        let regions = layout.generate_bubble_layout(1240, 1754);
        assert_eq!(regions.len(), 120);
        assert!(regions.iter().all(|q| q.len() == 4));
        // q31 starts the second column on the same row as q1
        assert_eq!(regions[0][0].y, regions[30][0].y);
        assert!(regions[30][0].x > regions[0][3].x);
    }

    #[test]
    fn test_bubble_geometry() {
        // 1600x2000, 20 questions in 4 columns: 5 rows of 280 px, 64 px spacing
        let layout = AnswerSheetLayout::new(sheet(20, 4));
        let regions = layout.generate_bubble_layout(1600, 2000);
        let first = regions[0][0];
        assert_eq!((first.x, first.y, first.width, first.height), (48, 484, 32, 32));
        assert_eq!((first.center_x, first.center_y), (64, 500));
        assert_eq!(regions[0][1].x, 112);
        assert_eq!(regions[6][2].x, 400 + 48 + 128);
        assert_eq!(regions[6][2].y, 484 + 280);
    }

    #[test]
    fn test_bubble_size_is_capped() {
        // Huge page: spacing and row height would allow far bigger bubbles
        let layout = AnswerSheetLayout::new(sheet(4, 1));
        let regions = layout.generate_bubble_layout(4000, 6000);
        assert_eq!(regions[0][0].width, 32);

        // A small advisory radius tightens the cap
        let small = AnswerSheetLayout::new(AnswerSheetConfig {
            bubble_radius: 5.0,
            ..sheet(4, 1)
        });
        assert_eq!(small.generate_bubble_layout(4000, 6000)[0][0].width, 12);
    }

    #[test]
    fn test_regions_stay_non_empty_on_tiny_pages() {
        let layout = AnswerSheetLayout::new(sheet(120, 4));
        for question in layout.generate_bubble_layout(10, 10) {
            for region in question {
                assert!(region.width > 0 && region.height > 0);
                assert!(region.contains(region.center_x, region.center_y));
            }
        }
    }

    #[test]
    fn test_qr_region_order() {
        let layout = AnswerSheetLayout::default();
        let regions = layout.qr_search_regions(1600, 2000);
        assert_eq!(regions.len(), 3);
        assert_eq!(regions[0], Rect::new(80, 240, 192, 192));
        assert_eq!(regions[1], Rect::new(15, 15, 153, 153));
        assert_eq!(regions[2], Rect::new(1431, 15, 153, 153));
    }

    #[test]
    fn test_update_regenerates_layout() {
        let mut layout = AnswerSheetLayout::default();
        assert_eq!(layout.generate_bubble_layout(1600, 2000).len(), 120);

        layout.update_config(&ConfigOverrides::questions(30)).unwrap();
        let regions = layout.generate_bubble_layout(1600, 2000);
        assert_eq!(regions.len(), 30);
        assert_eq!(layout.grid_position(9), GridPosition { column: 1, row: 0 });

        assert!(layout.update_config(&ConfigOverrides::questions(0)).is_err());
        assert_eq!(layout.config().num_questions, 30);
    }
}
