//! Imgshift - batch image format converter.
//!
//! Decode, palette quantization, dithering, and GIF/PNG/JPEG/WebP output.
//! This library exposes modules for integration testing.

pub mod codec;
pub mod convert;
pub mod encode;
pub mod error;
pub mod models;
pub mod services;
