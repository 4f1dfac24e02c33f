//! Utility functions for image processing
//!
//! This module provides the pixel-level building blocks of preprocessing:
//! - Grayscale conversion (RGBA to luminance)
//! - Gaussian blur (separable, border-normalized)
//! - Binarization (adaptive, global and Otsu)
//! - Morphology (square dilate/erode/close)
//! - Memory pools (buffer reuse for performance)

pub mod binarization;
pub mod blur;
pub mod grayscale;
pub mod memory_pool;
pub mod morphology;
