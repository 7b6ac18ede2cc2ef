//! # Scripting Module
//!
//! Rhai bindings for native images and fonts.
//!
//! ## Responsibilities
//! - **Engine Setup**: Registers all types and functions with Rhai.
//! - **Classes**: `Image`, `Font` and `Canvas`, plus the `color` module.
//! - **Runtime**: [`ScriptRuntime`] owns an engine and its handle registry.
//!
//! ## Pattern
//! All bindings follow: `engine.register_fn("name", move |...| -> RhaiResult<T> { ... })`.
//! Native failures become catchable script errors carrying `#{ kind, message }`.
//!
//! ## Module Structure
//! - `types`: [`BindingContext`] and [`CanvasHandle`]
//! - `utils`: Argument and option-map parsing
//! - `api/`: Sub-modules for image, font, canvas and color

pub mod api;
mod runtime;
pub mod types;
pub mod utils;

pub use api::color::create_color_api;
pub use runtime::ScriptRuntime;
pub use types::{BindingContext, CanvasHandle};

use rhai::{Engine, EvalAltResult};

/// Return type of every fallible binding.
pub type RhaiResult<T> = Result<T, Box<EvalAltResult>>;

/// Registers the binding API into the provided Rhai `Engine`.
///
/// This exposes the `Image`, `Font` and `Canvas` types and the `color` module.
pub fn register_rhai_api(engine: &mut Engine, ctx: &BindingContext) {
    engine.register_static_module("color", create_color_api().into());
    if let Some(limit) = ctx.config.max_operations {
        engine.set_max_operations(limit);
    }
    if let Some(depth) = ctx.config.max_call_depth {
        engine.set_max_call_levels(depth);
    }

    api::register_all(engine, ctx);
}
