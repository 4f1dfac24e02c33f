use serde::{Deserialize, Serialize};

/// Axis-aligned pixel rectangle, used for QR search areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Rect {
    /// Rectangle with its top-left corner at `(x, y)`.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True when the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Intersection with a `width` x `height` image, or `None` if nothing is left.
    pub fn clip_to(&self, width: u32, height: u32) -> Option<Rect> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let clipped = Rect {
            x: self.x,
            y: self.y,
            width: self.width.min(width - self.x),
            height: self.height.min(height - self.y),
        };
        (!clipped.is_empty()).then_some(clipped)
    }
}

/// Expected pixel footprint of one bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BubbleRegion {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Sampling center, always inside the box
    pub center_x: u32,
    /// Sampling center, always inside the box
    pub center_y: u32,
}

impl BubbleRegion {
    /// Build a region; zero sizes are bumped to one pixel so the center stays inside.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            x,
            y,
            width,
            height,
            center_x: x + width / 2,
            center_y: y + height / 2,
        }
    }

    /// Region spanning the inclusive pixel extents of a blob.
    pub fn from_extents(min_x: u32, min_y: u32, max_x: u32, max_y: u32) -> Self {
        Self::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
    }

    /// True when `(x, y)` lies inside the box.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_inside_region() {
        let region = BubbleRegion::new(10, 20, 32, 31);
        assert_eq!((region.center_x, region.center_y), (26, 35));
        assert!(region.contains(region.center_x, region.center_y));

        let tiny = BubbleRegion::new(5, 5, 0, 0);
        assert_eq!((tiny.width, tiny.height), (1, 1));
        assert!(tiny.contains(tiny.center_x, tiny.center_y));
    }

    #[test]
    fn test_from_extents_is_inclusive() {
        let region = BubbleRegion::from_extents(2, 3, 2, 7);
        assert_eq!((region.width, region.height), (1, 5));
    }

    #[test]
    fn test_clip_rect() {
        let rect = Rect::new(90, 10, 50, 50);
        assert_eq!(rect.clip_to(100, 100), Some(Rect::new(90, 10, 10, 50)));
        assert_eq!(rect.clip_to(80, 100), None);
        assert_eq!(Rect::new(0, 0, 0, 5).clip_to(10, 10), None);
    }
}
