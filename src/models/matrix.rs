use super::RasterImage;

/// Intensity below which a binarized pixel counts as ink.
pub const DARK_CUTOFF: u8 = 128;

/// Compact bit matrix; `true` marks a dark pixel.
#[derive(Debug, Clone)]
pub struct BitMatrix {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl BitMatrix {
    /// Create an all-clear matrix with given dimensions
    pub fn new(width: usize, height: usize) -> Self {
        let bytes_needed = (width * height).div_ceil(8);
        Self {
            width,
            height,
            data: vec![0; bytes_needed],
        }
    }

    /// Mark every pixel whose red channel is below [`DARK_CUTOFF`].
    pub fn from_binary(image: &RasterImage) -> Self {
        let (width, height) = (image.width() as usize, image.height() as usize);
        let mut matrix = Self::new(width, height);
        for (i, px) in image.as_raw().chunks_exact(4).enumerate() {
            if px[0] < DARK_CUTOFF {
                matrix.data[i / 8] |= 1 << (i % 8);
            }
        }
        matrix
    }

    /// Width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Get bit at (x, y); out of bounds reads as clear.
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let index = y * self.width + x;
        (self.data[index / 8] >> (index % 8)) & 1 == 1
    }

    /// Set bit at (x, y); out of bounds writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = y * self.width + x;
        if value {
            self.data[index / 8] |= 1 << (index % 8);
        } else {
            self.data[index / 8] &= !(1 << (index % 8));
        }
    }

    /// Number of set bits.
    pub fn count_set(&self) -> usize {
        self.data.iter().map(|b| b.count_ones() as usize).sum()
    }
}

impl Default for BitMatrix {
    fn default() -> Self {
        Self::new(0, 0)
    }
}
