//! Detection on a sheet image
//!
//! This module contains the logic that reads marks and identity off a page:
//! - Bubble darkness measurement and answer resolution
//! - Layout-free blob search (bounded flood fill or connected components)
//! - Student QR lookup in known page regions

/// Seeded, step-bounded flood fill
pub mod blob;
/// Bubble measurement and answer resolution
pub mod bubble;
/// Union-find labeling of 8-connected ink regions
pub mod connected_components;
/// QR search over candidate regions
pub mod qr;

pub use bubble::BubbleDetector;
pub use qr::QrDetector;
