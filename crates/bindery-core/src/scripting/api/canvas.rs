//! # Canvas API
//!
//! Drawing targets for `Image#draw` and `Font#draw_text`.

use crate::native::color::color_from_dynamic;
use crate::native::NativeCanvas;
use crate::object::{script_type_name, ImageObject};
use crate::BindingError;
use rhai::{Dynamic, Engine};
use skia_safe::Color;

use super::super::types::{BindingContext, CanvasHandle};
use super::super::RhaiResult;

/// Register canvas-related Rhai functions.
pub fn register(engine: &mut Engine, ctx: BindingContext) {
    engine.register_type_with_name::<CanvasHandle>("Canvas");

    engine.register_fn("Canvas", |width: i64, height: i64| -> RhaiResult<CanvasHandle> {
        let mut canvas = NativeCanvas::new(width, height)?;
        canvas.clear(Color::TRANSPARENT);
        Ok(CanvasHandle::new(canvas))
    });

    engine.register_get("width", |c: &mut CanvasHandle| c.canvas.lock().width() as i64);
    engine.register_get("height", |c: &mut CanvasHandle| c.canvas.lock().height() as i64);
    engine.register_get("pending", |c: &mut CanvasHandle| c.canvas.lock().pending() as i64);

    engine.register_fn("clear", |c: &mut CanvasHandle| {
        c.canvas.lock().clear(Color::TRANSPARENT);
    });
    engine.register_fn("clear", |c: &mut CanvasHandle, color: Dynamic| -> RhaiResult<()> {
        let color = color_from_dynamic(&color).ok_or_else(|| BindingError::TypeMismatch {
            expected: "color",
            found: script_type_name(&color),
        })?;
        c.canvas.lock().clear(color);
        Ok(())
    });

    engine.register_fn("flush", |c: &mut CanvasHandle| c.canvas.lock().flush());

    engine.register_fn(
        "pixel",
        |c: &mut CanvasHandle, x: i64, y: i64| -> RhaiResult<i64> {
            Ok(c.canvas.lock().pixel(x, y)? as i64)
        },
    );

    // The snapshot is a regular Image binding.
    let registry = ctx.registry.clone();
    engine.register_fn(
        "snapshot",
        move |c: &mut CanvasHandle| -> RhaiResult<ImageObject> {
            let image = c.canvas.lock().snapshot();
            Ok(ImageObject::new_bound(&registry, image)?)
        },
    );

    engine.register_fn("save", |c: &mut CanvasHandle, path: &str| -> RhaiResult<()> {
        Ok(c.canvas.lock().save(path)?)
    });

    engine.register_fn("to_string", |c: &mut CanvasHandle| {
        let canvas = c.canvas.lock();
        format!("Canvas({}x{})", canvas.width(), canvas.height())
    });
}
