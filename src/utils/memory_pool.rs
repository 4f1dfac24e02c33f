//! Reusable scratch buffers for the preprocessing pipeline
//!
//! One pool replaces the shared drawing surface a grading call would
//! otherwise need. It is owned by a single processor and only handed out
//! through `&mut`, so two calls can never share it concurrently.

/// Scratch planes sized for one image
pub struct PoolBuffers<'a> {
    /// Grayscale plane
    pub gray: &'a mut [u8],
    /// Blurred plane
    pub blurred: &'a mut [u8],
    /// Horizontal blur pass
    pub scratch: &'a mut [f32],
    /// Summed-area table, `(width + 1) * (height + 1)`
    pub integral: &'a mut [u64],
    /// Binarized plane
    pub binary: &'a mut [u8],
}

/// Arena that keeps its buffers between calls and only grows
pub struct BufferPool {
    gray: Vec<u8>,
    blurred: Vec<u8>,
    scratch: Vec<f32>,
    integral: Vec<u64>,
    binary: Vec<u8>,
    stats: AllocationStats,
}

impl BufferPool {
    /// Create a new buffer pool sized for a 1600x2000 sheet scan
    pub fn new() -> Self {
        Self::with_capacity(1600 * 2000)
    }

    /// Create a pool with custom pixel capacity
    pub fn with_capacity(pixels: usize) -> Self {
        Self {
            gray: Vec::with_capacity(pixels),
            blurred: Vec::with_capacity(pixels),
            scratch: Vec::with_capacity(pixels),
            integral: Vec::new(),
            binary: Vec::with_capacity(pixels),
            stats: AllocationStats::default(),
        }
    }

    /// Get all buffers for a `width` x `height` image at once (split borrow)
    pub fn get_all_buffers(&mut self, width: usize, height: usize) -> PoolBuffers<'_> {
        let pixels = width * height;
        let integral_len = (width + 1) * (height + 1);

        if pixels <= self.gray.capacity() && integral_len <= self.integral.capacity() {
            self.stats.record_reuse(pixels);
        } else {
            self.stats.record_allocation();
        }

        self.gray.resize(pixels, 0);
        self.blurred.resize(pixels, 0);
        self.scratch.resize(pixels, 0.0);
        self.integral.resize(integral_len, 0);
        self.binary.resize(pixels, 0);

        PoolBuffers {
            gray: &mut self.gray[..pixels],
            blurred: &mut self.blurred[..pixels],
            scratch: &mut self.scratch[..pixels],
            integral: &mut self.integral[..integral_len],
            binary: &mut self.binary[..pixels],
        }
    }

    /// Current pixel capacity of the planes
    pub fn capacity(&self) -> usize {
        self.gray.capacity()
    }

    /// Allocation counters since the pool was created
    pub fn stats(&self) -> &AllocationStats {
        &self.stats
    }

    /// Clear all buffers (resets lengths but keeps capacity)
    pub fn clear(&mut self) {
        self.gray.clear();
        self.blurred.clear();
        self.scratch.clear();
        self.integral.clear();
        self.binary.clear();
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics for monitoring allocation patterns
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AllocationStats {
    /// Requests served from existing buffers
    pub reuses: usize,
    /// Requests that had to grow a buffer
    pub allocations: usize,
    /// Pixels served without allocating
    pub total_pixels_reused: usize,
}

impl AllocationStats {
    fn record_reuse(&mut self, pixels: usize) {
        self.reuses += 1;
        self.total_pixels_reused += pixels;
    }

    fn record_allocation(&mut self) {
        self.allocations += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffers_have_requested_size() {
        let mut pool = BufferPool::with_capacity(0);
        let buffers = pool.get_all_buffers(10, 4);
        assert_eq!(buffers.gray.len(), 40);
        assert_eq!(buffers.blurred.len(), 40);
        assert_eq!(buffers.scratch.len(), 40);
        assert_eq!(buffers.integral.len(), 11 * 5);
        assert_eq!(buffers.binary.len(), 40);
    }

    #[test]
    fn test_pool_reuses_capacity() {
        let mut pool = BufferPool::with_capacity(100);
        pool.get_all_buffers(20, 20); // grows
        pool.get_all_buffers(10, 10); // fits
        pool.get_all_buffers(20, 20); // fits again

        assert_eq!(pool.stats().allocations, 1);
        assert_eq!(pool.stats().reuses, 2);
        assert!(pool.capacity() >= 400);

        pool.clear();
        assert!(pool.capacity() >= 400);
    }
}
