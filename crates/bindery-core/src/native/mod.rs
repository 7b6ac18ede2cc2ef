//! # Native Adapters
//!
//! Thin wrappers over Skia for the resources scripts can hold.
//!
//! ## Responsibilities
//! - **NativeImage**: decoding, tiling, text rendering, pixel access, saving.
//! - **NativeFont**: typeface lookup or file loading, measuring, drawing.
//! - **NativeCanvas**: raster target with z-ordered draw submission.
//! - **color**: `0xAARRGGBB` integers and hex strings.

pub mod canvas;
pub mod color;
pub mod font;
pub mod image;

pub use canvas::{DrawMode, DrawParams, NativeCanvas};
pub use font::{FontFlags, FontOptions, NativeFont};
pub use image::{ImageOptions, NativeImage, TextAlign, TextImageOptions};
