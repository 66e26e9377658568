//! Frequency-domain watermark embedding and extraction.
//!
//! # Components
//!
//! - **Patterns**: the grayscale watermark, resized once to the region size
//!   and normalized to [0, 1] when embedded.
//! - **Engine**: additive embedding into a DCT coefficient block and
//!   extraction by difference against the original image.

pub mod engine;
pub mod pattern;

pub use engine::*;
pub use pattern::*;
