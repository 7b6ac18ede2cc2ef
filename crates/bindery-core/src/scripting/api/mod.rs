//! # API Module
//!
//! Aggregates all Rhai API sub-modules and provides a single registration point.
//!
//! ## Sub-modules
//! - **image**: the `Image` class and its loaders
//! - **font**: the `Font` class and text drawing
//! - **canvas**: `Canvas` drawing targets
//! - **color**: the static `color` module

pub mod canvas;
pub mod color;
pub mod font;
pub mod image;

use super::types::BindingContext;
use rhai::Engine;

/// Register all API functions with the Rhai engine.
pub fn register_all(engine: &mut Engine, ctx: &BindingContext) {
    image::register(engine, ctx.clone());
    font::register(engine, ctx.clone());
    canvas::register(engine, ctx.clone());
}
