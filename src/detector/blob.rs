//! Seeded flood fill for locating bubbles without a known layout
//!
//! Seeds are taken on a coarse grid. Each fill is capped at a fixed number of
//! stack pops, so very large ink regions come back as partial blobs.

use crate::models::BitMatrix;

/// Distance between seed candidates, in pixels.
pub const SEED_STEP: usize = 5;

/// Stack pops allowed per fill, counting rejected and revisited pixels.
pub const MAX_FILL_STEPS: usize = 1000;

/// Bounds and pixel count of one filled blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blob {
    /// Pixel count
    pub area: usize,
    /// Leftmost column
    pub min_x: usize,
    /// Top row
    pub min_y: usize,
    /// Inclusive
    pub max_x: usize,
    /// Inclusive
    pub max_y: usize,
}

/// Flood fill state shared by all seeds of one scan.
pub struct BlobScanner<'a> {
    matrix: &'a BitMatrix,
    visited: Vec<bool>,
    stack: Vec<(usize, usize)>,
}

impl<'a> BlobScanner<'a> {
    /// Scanner over `matrix` with nothing visited yet.
    pub fn new(matrix: &'a BitMatrix) -> Self {
        Self {
            matrix,
            visited: vec![false; matrix.width() * matrix.height()],
            stack: Vec::new(),
        }
    }

    /// Scan seeds row by row and report blobs whose area lies in `[min_area, max_area]`.
    ///
    /// Stops as soon as `limit` blobs were accepted.
    pub fn scan(&mut self, min_area: f64, max_area: f64, limit: usize) -> Vec<Blob> {
        let (width, height) = (self.matrix.width(), self.matrix.height());
        let mut blobs = Vec::new();
        if limit == 0 {
            return blobs;
        }

        for y in (0..height).step_by(SEED_STEP) {
            for x in (0..width).step_by(SEED_STEP) {
                if self.visited[y * width + x] || !self.matrix.get(x, y) {
                    continue;
                }
                let blob = self.fill(x, y);
                let area = blob.area as f64;
                if area >= min_area && area <= max_area {
                    blobs.push(blob);
                    if blobs.len() >= limit {
                        return blobs;
                    }
                }
            }
        }
        blobs
    }

    /// 4-connected fill from a dark seed, bounded by [`MAX_FILL_STEPS`].
    fn fill(&mut self, start_x: usize, start_y: usize) -> Blob {
        let (width, height) = (self.matrix.width(), self.matrix.height());
        let mut blob = Blob {
            area: 0,
            min_x: start_x,
            min_y: start_y,
            max_x: start_x,
            max_y: start_y,
        };

        self.stack.clear();
        self.stack.push((start_x, start_y));
        let mut steps = 0;

        while steps < MAX_FILL_STEPS {
            let Some((x, y)) = self.stack.pop() else {
                break;
            };
            steps += 1;

            if x >= width || y >= height {
                continue;
            }
            let idx = y * width + x;
            if self.visited[idx] || !self.matrix.get(x, y) {
                continue;
            }
            self.visited[idx] = true;
            blob.area += 1;
            blob.min_x = blob.min_x.min(x);
            blob.min_y = blob.min_y.min(y);
            blob.max_x = blob.max_x.max(x);
            blob.max_y = blob.max_y.max(y);

            // usize::MAX stands in for -1 and is rejected by the bounds check
            self.stack.push((x + 1, y));
            self.stack.push((x.wrapping_sub(1), y));
            self.stack.push((x, y + 1));
            self.stack.push((x, y.wrapping_sub(1)));
        }

        blob
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disk(matrix: &mut BitMatrix, cx: usize, cy: usize, r: usize) {
        for y in cy - r..=cy + r {
            for x in cx - r..=cx + r {
                let (dx, dy) = (x as isize - cx as isize, y as isize - cy as isize);
                if dx * dx + dy * dy <= (r * r) as isize {
                    matrix.set(x, y, true);
                }
            }
        }
    }

    #[test]
    fn test_finds_disks_in_scan_order() {
        let mut matrix = BitMatrix::new(100, 60);
        disk(&mut matrix, 70, 20, 5);
        disk(&mut matrix, 20, 40, 5);

        let blobs = BlobScanner::new(&matrix).scan(20.0, 200.0, 10);
        assert_eq!(blobs.len(), 2);
        assert_eq!((blobs[0].min_x, blobs[0].max_x), (65, 75));
        assert_eq!((blobs[0].min_y, blobs[0].max_y), (15, 25));
        assert_eq!(blobs[0].area, 81);
        assert_eq!(blobs[1].min_x, 15);
    }

    #[test]
    fn test_area_bounds_filter() {
        let mut matrix = BitMatrix::new(100, 60);
        disk(&mut matrix, 20, 20, 2); // too small
        disk(&mut matrix, 60, 30, 5);
        let blobs = BlobScanner::new(&matrix).scan(40.0, 200.0, 10);
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].min_x, 55);
    }

    #[test]
    fn test_stops_at_limit() {
        let mut matrix = BitMatrix::new(120, 30);
        for cx in [15, 45, 75, 105] {
            disk(&mut matrix, cx, 15, 5);
        }
        assert_eq!(BlobScanner::new(&matrix).scan(20.0, 200.0, 2).len(), 2);
        assert!(BlobScanner::new(&matrix).scan(20.0, 200.0, 0).is_empty());
    }

    #[test]
    fn test_large_region_is_partial() {
        let mut matrix = BitMatrix::new(80, 80);
        for y in 0..80 {
            for x in 0..80 {
                matrix.set(x, y, true);
            }
        }
        let blob = BlobScanner::new(&matrix).fill(0, 0);
        assert!(blob.area > 0);
        assert!(blob.area < MAX_FILL_STEPS);
    }
}
