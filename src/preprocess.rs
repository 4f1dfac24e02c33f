//! Page preprocessing: grayscale, blur, binarize, optional close
//!
//! Each stage takes a [`RasterImage`] and returns a fresh one of the same
//! dimensions. Internally the stages work on single-channel intensity planes
//! and only expand back to RGBA at the boundary.

use tracing::{debug, instrument};

use crate::config::{PreprocessConfig, ThresholdMethod};
use crate::models::raster::{from_intensity_plane, intensity_plane};
use crate::models::RasterImage;
use crate::utils::binarization::{
    adaptive_threshold, adaptive_threshold_with_buffer, otsu_binarize, threshold_binarize,
};
use crate::utils::blur::{gaussian_blur, gaussian_blur_with_buffer};
use crate::utils::grayscale::{rgba_to_grayscale, rgba_to_grayscale_with_buffer};
use crate::utils::memory_pool::BufferPool;
use crate::utils::morphology::close;

/// Stateless apart from its tuning parameters.
#[derive(Debug, Clone, Default)]
pub struct ImagePreprocessor {
    config: PreprocessConfig,
}

impl ImagePreprocessor {
    /// Preprocessor with the given stage parameters.
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    /// Stage parameters.
    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// BT.601 luminance written to R, G and B; alpha forced to 255.
    pub fn to_grayscale(&self, image: &RasterImage) -> RasterImage {
        let (width, height) = image.dimensions();
        let gray = rgba_to_grayscale(image.as_raw(), width as usize, height as usize);
        from_intensity_plane(width, height, &gray)
    }

    /// Gaussian blur of the red channel with a `2 * radius + 1` kernel.
    pub fn gaussian_blur(&self, image: &RasterImage, radius: u32) -> RasterImage {
        let (width, height) = image.dimensions();
        let plane = intensity_plane(image);
        let blurred = gaussian_blur(&plane, width as usize, height as usize, radius);
        from_intensity_plane(width, height, &blurred)
    }

    /// Local-mean threshold: 0 where a pixel is more than the configured bias
    /// below its `block_size` window mean, 255 elsewhere.
    pub fn adaptive_threshold(&self, image: &RasterImage, block_size: u32) -> RasterImage {
        let (width, height) = image.dimensions();
        let plane = intensity_plane(image);
        let binary = adaptive_threshold(
            &plane,
            width as usize,
            height as usize,
            block_size,
            self.config.threshold_bias,
        );
        from_intensity_plane(width, height, &binary)
    }

    /// Dilation then erosion with a square kernel.
    pub fn morphology_close(&self, image: &RasterImage, kernel_size: u32) -> RasterImage {
        let (width, height) = image.dimensions();
        let plane = intensity_plane(image);
        let closed = close(&plane, width as usize, height as usize, kernel_size);
        from_intensity_plane(width, height, &closed)
    }

    /// Binarize with the configured [`ThresholdMethod`].
    pub fn binarize(&self, image: &RasterImage) -> RasterImage {
        let (width, height) = image.dimensions();
        let plane = intensity_plane(image);
        let binary = self.binarize_plane(&plane, width as usize, height as usize);
        from_intensity_plane(width, height, &binary)
    }

    fn binarize_plane(&self, plane: &[u8], width: usize, height: usize) -> Vec<u8> {
        match self.config.threshold_method {
            ThresholdMethod::Adaptive => adaptive_threshold(
                plane,
                width,
                height,
                self.config.adaptive_threshold_block_size,
                self.config.threshold_bias,
            ),
            ThresholdMethod::Global(cut) => threshold_binarize(plane, cut),
            ThresholdMethod::Otsu => otsu_binarize(plane),
        }
    }

    /// Full chain: grayscale, blur, binarize, then close when enabled.
    #[instrument(level = "debug", skip_all, fields(width = image.width(), height = image.height()))]
    pub fn preprocess(&self, image: &RasterImage) -> RasterImage {
        let (width, height) = image.dimensions();
        let (w, h) = (width as usize, height as usize);

        let gray = rgba_to_grayscale(image.as_raw(), w, h);
        let blurred = gaussian_blur(&gray, w, h, self.config.gaussian_blur_radius);
        let binary = self.binarize_plane(&blurred, w, h);
        debug!(method = ?self.config.threshold_method, "binarized");

        self.finish(width, height, binary)
    }

    /// Same output as [`preprocess`](Self::preprocess), reusing the pool's planes.
    #[instrument(level = "debug", skip_all, fields(width = image.width(), height = image.height()))]
    pub fn preprocess_with_pool(&self, image: &RasterImage, pool: &mut BufferPool) -> RasterImage {
        let (width, height) = image.dimensions();
        let (w, h) = (width as usize, height as usize);
        let buffers = pool.get_all_buffers(w, h);

        rgba_to_grayscale_with_buffer(image.as_raw(), w, h, buffers.gray);
        gaussian_blur_with_buffer(
            buffers.gray,
            w,
            h,
            self.config.gaussian_blur_radius,
            buffers.scratch,
            buffers.blurred,
        );

        let binary = match self.config.threshold_method {
            ThresholdMethod::Adaptive => {
                adaptive_threshold_with_buffer(
                    buffers.blurred,
                    w,
                    h,
                    self.config.adaptive_threshold_block_size,
                    self.config.threshold_bias,
                    buffers.integral,
                    buffers.binary,
                );
                buffers.binary.to_vec()
            }
            ThresholdMethod::Global(cut) => threshold_binarize(buffers.blurred, cut),
            ThresholdMethod::Otsu => otsu_binarize(buffers.blurred),
        };
        debug!(method = ?self.config.threshold_method, "binarized");

        self.finish(width, height, binary)
    }

    fn finish(&self, width: u32, height: u32, binary: Vec<u8>) -> RasterImage {
        let binary = if self.config.apply_morphology {
            close(
                &binary,
                width as usize,
                height as usize,
                self.config.morphology_kernel_size,
            )
        } else {
            binary
        };
        from_intensity_plane(width, height, &binary)
    }
}
