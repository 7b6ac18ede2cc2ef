//! # Font API
//!
//! Registers the `Font` class.
//!
//! ## Responsibilities
//! - **Construction**: `Font(height)`, `Font(height, #{ name, bold, italic, underline })`
//! - **Queries**: `name`, `height`, `bold`, `italic`, `underline`, `disposed`
//! - **Text**: `text_width`, `draw_text`, `draw_text_rel`
//! - **Lifetime**: `dispose`; otherwise released when the last reference drops

use crate::errors::{BindingError, Result};
use crate::native::{DrawParams, FontOptions, NativeFont};
use crate::object::FontObject;
use rhai::{Dynamic, Engine, Map};

use super::super::types::{BindingContext, CanvasHandle};
use super::super::utils::{number, parse_draw_params, parse_font_options};
use super::super::RhaiResult;

/// Extracts the native font behind any script value.
pub fn native_font(value: &Dynamic) -> Result<NativeFont> {
    FontObject::from_dynamic(value)
}

fn new_font(ctx: &BindingContext, height: i64, options: &FontOptions) -> Result<FontObject> {
    let font = NativeFont::load(
        height,
        options,
        ctx.loader.as_ref(),
        &ctx.config.default_font,
    )?;
    FontObject::new_bound(&ctx.registry, font)
}

#[allow(clippy::too_many_arguments)]
fn draw_text(
    font: &FontObject,
    canvas: &CanvasHandle,
    text: &str,
    x: &Dynamic,
    y: &Dynamic,
    rel: Option<(&Dynamic, &Dynamic)>,
    options: &Map,
) -> Result<()> {
    let native = font.get()?;
    let params: DrawParams = parse_draw_params(options)?;
    let (x, y) = (number(x)? as f32, number(y)? as f32);
    let mut target = canvas.canvas.lock();
    match rel {
        Some((rel_x, rel_y)) => native.draw_text_rel(
            &mut target,
            text,
            x,
            y,
            number(rel_x)? as f32,
            number(rel_y)? as f32,
            &params,
        ),
        None => native.draw_text(&mut target, text, x, y, &params),
    }
    Ok(())
}

/// Installs the `Font` class into `engine`.
pub fn register(engine: &mut Engine, ctx: BindingContext) {
    engine.register_type_with_name::<FontObject>("Font");

    let c = ctx.clone();
    engine.register_fn("Font", move |height: i64| -> RhaiResult<FontObject> {
        Ok(new_font(&c, height, &FontOptions::default())?)
    });

    let c = ctx.clone();
    engine.register_fn(
        "Font",
        move |height: i64, options: Map| -> RhaiResult<FontObject> {
            let options = parse_font_options(&options)?;
            Ok(new_font(&c, height, &options)?)
        },
    );

    engine.register_get("name", |font: &mut FontObject| -> RhaiResult<String> {
        Ok(font.with(|f| f.name().to_string())?)
    });
    engine.register_get("height", |font: &mut FontObject| -> RhaiResult<i64> {
        Ok(font.with(|f| f.height() as i64)?)
    });
    engine.register_get("bold", |font: &mut FontObject| -> RhaiResult<bool> {
        Ok(font.with(|f| f.flags().bold)?)
    });
    engine.register_get("italic", |font: &mut FontObject| -> RhaiResult<bool> {
        Ok(font.with(|f| f.flags().italic)?)
    });
    engine.register_get("underline", |font: &mut FontObject| -> RhaiResult<bool> {
        Ok(font.with(|f| f.flags().underline)?)
    });
    engine.register_get("disposed", |font: &mut FontObject| font.is_disposed());

    engine.register_fn(
        "text_width",
        |font: &mut FontObject, text: &str| -> RhaiResult<f64> {
            Ok(font.with(|f| f.text_width(text, 1.0) as f64)?)
        },
    );
    engine.register_fn(
        "text_width",
        |font: &mut FontObject, text: &str, scale_x: Dynamic| -> RhaiResult<f64> {
            let scale_x = number(&scale_x)? as f32;
            Ok(font.with(|f| f.text_width(text, scale_x) as f64)?)
        },
    );

    engine.register_fn(
        "draw_text",
        |font: &mut FontObject,
         canvas: CanvasHandle,
         text: &str,
         x: Dynamic,
         y: Dynamic|
         -> RhaiResult<()> {
            Ok(draw_text(font, &canvas, text, &x, &y, None, &Map::new())?)
        },
    );
    engine.register_fn(
        "draw_text",
        |font: &mut FontObject,
         canvas: CanvasHandle,
         text: &str,
         x: Dynamic,
         y: Dynamic,
         options: Map|
         -> RhaiResult<()> {
            Ok(draw_text(font, &canvas, text, &x, &y, None, &options)?)
        },
    );
    engine.register_fn(
        "draw_text_rel",
        |font: &mut FontObject,
         canvas: CanvasHandle,
         text: &str,
         x: Dynamic,
         y: Dynamic,
         rel_x: Dynamic,
         rel_y: Dynamic|
         -> RhaiResult<()> {
            let rel = Some((&rel_x, &rel_y));
            Ok(draw_text(font, &canvas, text, &x, &y, rel, &Map::new())?)
        },
    );
    engine.register_fn(
        "draw_text_rel",
        |font: &mut FontObject,
         canvas: CanvasHandle,
         text: &str,
         x: Dynamic,
         y: Dynamic,
         rel_x: Dynamic,
         rel_y: Dynamic,
         options: Map|
         -> RhaiResult<()> {
            let rel = Some((&rel_x, &rel_y));
            Ok(draw_text(font, &canvas, text, &x, &y, rel, &options)?)
        },
    );

    engine.register_fn("dispose", |font: &mut FontObject| font.dispose());

    engine.register_fn("to_string", |font: &mut FontObject| -> String {
        match font.get() {
            Ok(native) => format!("Font({}, {}px)", native.name(), native.height()),
            Err(BindingError::UseAfterFree { .. }) => "Font(disposed)".to_string(),
            Err(_) => "Font(?)".to_string(),
        }
    });
    engine.register_fn("to_debug", |font: &mut FontObject| format!("{font:?}"));
}
